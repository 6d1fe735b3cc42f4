//! The debug settings panel: every [`Settings`] field bound to a live
//! egui widget, with ranges derived from the model-size basis.

use crate::scene::{LoadStatus, ViewerState};

const AREA_LIGHT_LABELS: [&str; 3] = ["Left light", "Center light", "Right light"];

/// What the panel did this frame. `changed` means the apply step must
/// run before the draw.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanelResponse {
    pub changed: bool,
    pub recenter: bool,
}

pub fn draw_panel(ctx: &egui::Context, state: &mut ViewerState) -> PanelResponse {
    let mut response = PanelResponse::default();
    // Basis is unit-clamped on failed loads, so every range below is
    // non-degenerate.
    let basis = state.rig.basis();

    egui::SidePanel::right("lighting_panel")
        .resizable(false)
        .default_width(270.0)
        .show(ctx, |ui| {
            ui.heading("Lighting");
            ui.separator();

            let settings = &mut state.settings;
            let mut changed = false;

            egui::CollapsingHeader::new("Area lights")
                .default_open(true)
                .show(ui, |ui| {
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut settings.area_intensity, 0.0..=20.0)
                                .text("Intensity"),
                        )
                        .changed();
                    ui.horizontal(|ui| {
                        changed |= ui.color_edit_button_rgb(&mut settings.area_color).changed();
                        ui.label("Color");
                    });
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut settings.area_width, 0.1..=basis.x * 2.0)
                                .text("Width"),
                        )
                        .changed();
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut settings.area_height, 0.1..=basis.y * 2.0)
                                .text("Height"),
                        )
                        .changed();
                    changed |= ui
                        .add(
                            egui::Slider::new(
                                &mut settings.area_offset_x,
                                -basis.x * 2.0..=basis.x * 2.0,
                            )
                            .text("Left offset"),
                        )
                        .changed();

                    for (index, label) in AREA_LIGHT_LABELS.iter().enumerate() {
                        egui::CollapsingHeader::new(*label).show(ui, |ui| {
                            ui.horizontal(|ui| {
                                for (axis, name) in ["X", "Y", "Z"].iter().enumerate() {
                                    ui.label(*name);
                                    changed |= ui
                                        .add(
                                            egui::DragValue::new(
                                                &mut settings.area_rotation_deg[index][axis],
                                            )
                                            .speed(1.0)
                                            .suffix("°"),
                                        )
                                        .changed();
                                }
                            });
                        });
                    }
                });

            egui::CollapsingHeader::new("Directional light")
                .default_open(true)
                .show(ui, |ui| {
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut settings.dir_intensity, 0.0..=5.0)
                                .text("Intensity"),
                        )
                        .changed();
                    ui.horizontal(|ui| {
                        ui.label("Position");
                        for axis in 0..3 {
                            changed |= ui
                                .add(
                                    egui::DragValue::new(&mut settings.dir_position[axis])
                                        .speed(0.1),
                                )
                                .changed();
                        }
                    });
                });

            ui.separator();
            changed |= ui
                .checkbox(&mut settings.show_helpers, "Light helpers")
                .changed();
            changed |= ui.checkbox(&mut settings.show_floor, "Floor").changed();
            response.changed = changed;

            ui.separator();
            if ui.button("Recenter view  (F)").clicked() {
                response.recenter = true;
            }

            ui.separator();
            match &state.load {
                LoadStatus::Loading(fraction) => {
                    ui.label(format!("Loading model… {:.0}%", fraction * 100.0));
                }
                LoadStatus::Ready => {
                    if let Some(model) = &state.model {
                        ui.label(format!(
                            "{} — {} triangles",
                            model.name,
                            model.triangle_count()
                        ));
                    }
                }
                LoadStatus::Failed(message) => {
                    ui.colored_label(egui::Color32::LIGHT_RED, format!("Load failed: {message}"));
                }
            }
        });

    response
}
