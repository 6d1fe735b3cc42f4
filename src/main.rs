//! Turntable - a native orbit-camera glTF model viewer.
//!
//! Loads one static GLB asset, frames it in a lit scene, and lets the
//! user orbit around it. A side panel exposes the lighting rig for
//! live tuning; clicking the model retargets the camera's look-at
//! point with a short glide.

mod app;
mod assets;
mod render;
mod scene;
mod ui;

fn main() {
    app::run();
}
