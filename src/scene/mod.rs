//! Viewer-side scene state: the loaded model, camera framing, the
//! lighting rig and the transient look-at interpolation.
//!
//! Everything the setup, GUI and render-loop code touches lives in one
//! explicit [`ViewerState`] owned by the app, so there is no hidden
//! cross-callback coupling.

pub mod lighting;
pub mod look;

use crate::assets::ModelData;
use glam::Vec3;
use lighting::{LightRig, Settings};
use look::LookTransition;

/// Camera eye before a model is framed and after a failed load.
pub const DEFAULT_EYE: Vec3 = Vec3::new(2.0, 2.0, 4.0);
/// Orbit target before a model is framed and after a failed load.
pub const DEFAULT_TARGET: Vec3 = Vec3::ZERO;

/// Lower bound on the framed eye height, so flat models still get a
/// usable three-quarter view.
pub const MIN_EYE_HEIGHT: f32 = 1.0;

const EYE_HEIGHT_FACTOR: f32 = 0.6;
const EYE_DEPTH_FACTOR: f32 = 1.5;
const TARGET_HEIGHT_FACTOR: f32 = 0.3;

/// A camera pose the orbit controller can be reset to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub eye: Vec3,
    pub target: Vec3,
}

impl Framing {
    pub fn default_view() -> Self {
        Self {
            eye: DEFAULT_EYE,
            target: DEFAULT_TARGET,
        }
    }

    /// Center-and-fit framing for a recentered model of the given size.
    ///
    /// Works for any positive size regardless of the asset's units: the
    /// eye backs off proportionally to the model depth and the target
    /// sits a third of the way up the model.
    pub fn fit(size: Vec3) -> Self {
        Self {
            eye: Vec3::new(
                0.0,
                MIN_EYE_HEIGHT.max(size.y * EYE_HEIGHT_FACTOR),
                size.z * EYE_DEPTH_FACTOR,
            ),
            target: Vec3::new(0.0, size.y * TARGET_HEIGHT_FACTOR, 0.0),
        }
    }
}

/// Where the single asset load currently stands, for the status line.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Loading(f32),
    Ready,
    Failed(String),
}

/// All mutable viewer state outside the GPU and the window.
pub struct ViewerState {
    /// Flattened, recentered model geometry. Also the raycast source.
    pub model: Option<ModelData>,
    /// Load-time framing; the recenter shortcut restores it.
    pub framing: Framing,
    pub settings: Settings,
    pub rig: LightRig,
    pub look: LookTransition,
    pub load: LoadStatus,
}

impl ViewerState {
    pub fn new() -> Self {
        let settings = Settings::for_basis(Vec3::ONE);
        let rig = LightRig::new(Vec3::ONE, &settings);
        Self {
            model: None,
            framing: Framing::default_view(),
            settings,
            rig,
            look: LookTransition::Idle,
            load: LoadStatus::Loading(0.0),
        }
    }

    /// Install a freshly loaded (already recentered) model: derive the
    /// framing from its bounds and rebuild the area-light defaults and
    /// GUI ranges from its size.
    pub fn attach_model(&mut self, model: ModelData) {
        let size = model.size();
        self.framing = Framing::fit(size);
        self.settings = Settings::for_basis(size);
        self.rig = LightRig::new(size, &self.settings);
        self.load = LoadStatus::Ready;
        self.model = Some(model);
    }

    /// Load failed: keep running with the default framing, no model,
    /// and a non-degenerate unit range basis for the GUI.
    pub fn fail_load(&mut self, message: String) {
        self.model = None;
        self.framing = Framing::default_view();
        self.settings = Settings::for_basis(Vec3::ONE);
        self.rig = LightRig::new(Vec3::ONE, &self.settings);
        self.load = LoadStatus::Failed(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MaterialFactors, PrimitiveData};

    fn model_of_size(size: Vec3) -> ModelData {
        let half = size * 0.5;
        let mut model = ModelData {
            name: "box".to_string(),
            min: -half,
            max: half,
            primitives: vec![PrimitiveData {
                positions: vec![
                    [-half.x, -half.y, -half.z],
                    [half.x, half.y, half.z],
                    [half.x, -half.y, half.z],
                ],
                normals: vec![[0.0, 1.0, 0.0]; 3],
                indices: vec![0, 1, 2],
                material: MaterialFactors::default(),
            }],
        };
        model.recenter();
        model
    }

    #[test]
    fn fit_bounds_eye_height_and_tracks_depth() {
        let low = Framing::fit(Vec3::new(2.0, 0.4, 2.0));
        assert_eq!(low.eye.y, MIN_EYE_HEIGHT);

        let tall = Framing::fit(Vec3::new(2.0, 10.0, 2.0));
        assert!((tall.eye.y - 6.0).abs() < 1e-6);

        // Eye depth strictly increases with model depth.
        let near = Framing::fit(Vec3::new(1.0, 1.0, 2.0));
        let far = Framing::fit(Vec3::new(1.0, 1.0, 5.0));
        assert!(far.eye.z > near.eye.z);
    }

    #[test]
    fn fit_places_target_a_third_up() {
        let framing = Framing::fit(Vec3::new(1.0, 3.0, 1.0));
        assert!((framing.target.y - 0.9).abs() < 1e-6);
        assert_eq!(framing.target.x, 0.0);
        assert_eq!(framing.target.z, 0.0);
    }

    #[test]
    fn attach_model_frames_and_rescales_settings() {
        let mut state = ViewerState::new();
        state.attach_model(model_of_size(Vec3::new(4.0, 2.0, 6.0)));
        assert_eq!(state.load, LoadStatus::Ready);
        assert_eq!(state.framing, Framing::fit(Vec3::new(4.0, 2.0, 6.0)));
        assert_eq!(state.rig.basis(), Vec3::new(4.0, 2.0, 6.0));
    }

    #[test]
    fn fail_load_resets_to_defaults() {
        let mut state = ViewerState::new();
        state.attach_model(model_of_size(Vec3::new(4.0, 2.0, 6.0)));
        state.fail_load("fetch failed".to_string());
        assert!(state.model.is_none());
        assert_eq!(state.framing.eye, DEFAULT_EYE);
        assert_eq!(state.framing.target, DEFAULT_TARGET);
        assert_eq!(state.rig.basis(), Vec3::ONE);
        assert!(matches!(state.load, LoadStatus::Failed(_)));
    }
}
