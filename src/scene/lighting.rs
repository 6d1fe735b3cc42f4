//! The lighting rig: fixed hemisphere/directional/rim/ambient lights
//! plus three tunable rectangular area lights, and the [`Settings`]
//! object the debug panel edits.
//!
//! Area lights look at the origin exactly once, when their defaults are
//! derived; from then on rotation is only ever rebuilt from the
//! GUI-edited Euler angles, so the widgets and the live lights cannot
//! drift apart.

use glam::{EulerRot, Quat, Vec3};

pub const AREA_LIGHT_COUNT: usize = 3;

const AREA_FOOTPRINT_FACTOR: f32 = 0.25;
const AREA_WIDTH_FLOOR: f32 = 0.5;
const AREA_HEIGHT_FLOOR: f32 = 0.3;
const AREA_HEIGHT_LIFT: f32 = 1.0;
const AREA_DEPTH_FACTOR: f32 = 0.6;
const AREA_DEFAULT_INTENSITY: f32 = 3.0;

const HEMI_SKY: Vec3 = Vec3::new(1.0, 1.0, 1.0);
const HEMI_GROUND: Vec3 = Vec3::new(0.27, 0.27, 0.27);
const HEMI_INTENSITY: f32 = 0.45;

const DIR_COLOR: Vec3 = Vec3::new(1.0, 1.0, 1.0);
const DIR_DEFAULT_INTENSITY: f32 = 1.0;
const DIR_DEFAULT_POSITION: [f32; 3] = [5.0, 10.0, 5.0];

const RIM_COLOR: Vec3 = Vec3::new(0.55, 0.65, 1.0);
const RIM_INTENSITY: f32 = 0.4;
const RIM_POSITION: Vec3 = Vec3::new(-4.0, 3.0, -4.0);

const AMBIENT_COLOR: Vec3 = Vec3::new(1.0, 1.0, 1.0);
const AMBIENT_INTENSITY: f32 = 0.15;

/// Everything the debug panel edits, flat. The single source of truth:
/// [`LightRig::apply`] pushes every field onto the live rig, so widgets
/// and lights never diverge.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub area_intensity: f32,
    pub area_color: [f32; 3],
    pub area_width: f32,
    pub area_height: f32,
    /// Leftmost area light's x; the others are spaced by the basis width.
    pub area_offset_x: f32,
    /// Per-light Euler angles in degrees (x, y, z), YXZ order. Stored
    /// here, not on the lights, so the panel can edit them directly.
    pub area_rotation_deg: [[f32; 3]; AREA_LIGHT_COUNT],
    pub dir_intensity: f32,
    pub dir_position: [f32; 3],
    pub show_helpers: bool,
    pub show_floor: bool,
}

impl Settings {
    /// Defaults derived from a model-size basis (unit vector before a
    /// model is loaded or after a failed load). Each area light's
    /// initial rotation comes from a one-time look-at of the origin.
    pub fn for_basis(basis: Vec3) -> Self {
        let offset_x = -basis.x;
        let mut rotations = [[0.0; 3]; AREA_LIGHT_COUNT];
        for (index, rotation) in rotations.iter_mut().enumerate() {
            let position = area_position(basis, offset_x, index);
            *rotation = euler_deg_from_quat(look_at_origin(position));
        }
        Self {
            area_intensity: AREA_DEFAULT_INTENSITY,
            area_color: [1.0, 1.0, 1.0],
            area_width: (basis.x * AREA_FOOTPRINT_FACTOR).max(AREA_WIDTH_FLOOR),
            area_height: (basis.y * AREA_FOOTPRINT_FACTOR).max(AREA_HEIGHT_FLOOR),
            area_offset_x: offset_x,
            area_rotation_deg: rotations,
            dir_intensity: DIR_DEFAULT_INTENSITY,
            dir_position: DIR_DEFAULT_POSITION,
            show_helpers: true,
            show_floor: true,
        }
    }
}

/// A rectangular emitter. `rotation` orients the local axes: +X along
/// the width, +Y along the height, -Z is the emitting face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaLight {
    pub position: Vec3,
    pub width: f32,
    pub height: f32,
    pub color: Vec3,
    pub intensity: f32,
    pub rotation: Quat,
}

impl AreaLight {
    /// Width axis, height axis, emitting direction.
    pub fn axes(&self) -> (Vec3, Vec3, Vec3) {
        (
            self.rotation * Vec3::X,
            self.rotation * Vec3::Y,
            self.rotation * Vec3::NEG_Z,
        )
    }

    /// World-space corners, counter-clockwise seen from the front.
    pub fn corners(&self) -> [Vec3; 4] {
        let (u, v, _) = self.axes();
        let half_u = u * (self.width * 0.5);
        let half_v = v * (self.height * 0.5);
        [
            self.position - half_u - half_v,
            self.position + half_u - half_v,
            self.position + half_u + half_v,
            self.position - half_u + half_v,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky: Vec3,
    pub ground: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    /// The light shines from here toward the origin.
    pub position: Vec3,
    pub casts_shadows: bool,
}

impl DirectionalLight {
    pub fn direction(&self) -> Vec3 {
        (-self.position).normalize_or_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

/// The live lights the renderer reads each frame. Fixed lights are
/// built once at startup; the area lights are regenerated from the
/// model-size basis whenever a model arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub hemisphere: HemisphereLight,
    pub directional: DirectionalLight,
    pub rim: PointLight,
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub area: [AreaLight; AREA_LIGHT_COUNT],
    pub show_helpers: bool,
    pub show_floor: bool,
    basis: Vec3,
}

impl LightRig {
    pub fn new(basis: Vec3, settings: &Settings) -> Self {
        let mut rig = Self {
            hemisphere: HemisphereLight {
                sky: HEMI_SKY,
                ground: HEMI_GROUND,
                intensity: HEMI_INTENSITY,
            },
            directional: DirectionalLight {
                color: DIR_COLOR,
                intensity: settings.dir_intensity,
                position: Vec3::from_array(settings.dir_position),
                casts_shadows: true,
            },
            rim: PointLight {
                color: RIM_COLOR,
                intensity: RIM_INTENSITY,
                position: RIM_POSITION,
            },
            ambient_color: AMBIENT_COLOR,
            ambient_intensity: AMBIENT_INTENSITY,
            area: [AreaLight {
                position: Vec3::ZERO,
                width: AREA_WIDTH_FLOOR,
                height: AREA_HEIGHT_FLOOR,
                color: Vec3::ONE,
                intensity: AREA_DEFAULT_INTENSITY,
                rotation: Quat::IDENTITY,
            }; AREA_LIGHT_COUNT],
            show_helpers: settings.show_helpers,
            show_floor: settings.show_floor,
            basis,
        };
        rig.apply(settings);
        rig
    }

    /// The model-size basis the GUI derives its widget ranges from.
    pub fn basis(&self) -> Vec3 {
        self.basis
    }

    /// Push every settings field onto the live rig. Full overwrite, not
    /// a delta: a pure function of `(settings, basis)`, cheap at three
    /// lights, and immune to drift between widgets and lights.
    pub fn apply(&mut self, settings: &Settings) {
        self.directional.intensity = settings.dir_intensity;
        self.directional.position = Vec3::from_array(settings.dir_position);
        for (index, light) in self.area.iter_mut().enumerate() {
            light.position = area_position(self.basis, settings.area_offset_x, index);
            light.width = settings.area_width;
            light.height = settings.area_height;
            light.color = Vec3::from_array(settings.area_color);
            light.intensity = settings.area_intensity;
            light.rotation = quat_from_euler_deg(settings.area_rotation_deg[index]);
        }
        self.show_helpers = settings.show_helpers;
        self.show_floor = settings.show_floor;
    }
}

/// Area light placement per the rig layout: x spaced by the basis width
/// from the configurable left offset, y one unit above the model, z in
/// front at 0.6x the model depth.
fn area_position(basis: Vec3, offset_x: f32, index: usize) -> Vec3 {
    Vec3::new(
        offset_x + basis.x * index as f32,
        basis.y + AREA_HEIGHT_LIFT,
        basis.z * AREA_DEPTH_FACTOR,
    )
}

/// Orientation pointing the emitting face (-Z) at the world origin.
fn look_at_origin(position: Vec3) -> Quat {
    let toward = (-position).normalize_or_zero();
    if toward == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_rotation_arc(Vec3::NEG_Z, toward)
    }
}

fn euler_deg_from_quat(rotation: Quat) -> [f32; 3] {
    let (y, x, z) = rotation.to_euler(EulerRot::YXZ);
    [x.to_degrees(), y.to_degrees(), z.to_degrees()]
}

fn quat_from_euler_deg(degrees: [f32; 3]) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees[1].to_radians(),
        degrees[0].to_radians(),
        degrees[2].to_radians(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_honor_footprint_floors() {
        let tiny = Settings::for_basis(Vec3::new(0.4, 0.2, 0.4));
        assert_eq!(tiny.area_width, AREA_WIDTH_FLOOR);
        assert_eq!(tiny.area_height, AREA_HEIGHT_FLOOR);

        let big = Settings::for_basis(Vec3::new(8.0, 4.0, 8.0));
        assert!((big.area_width - 2.0).abs() < 1e-6);
        assert!((big.area_height - 1.0).abs() < 1e-6);
    }

    #[test]
    fn area_lights_sit_above_and_in_front() {
        let basis = Vec3::new(4.0, 2.0, 6.0);
        let settings = Settings::for_basis(basis);
        let rig = LightRig::new(basis, &settings);
        for (index, light) in rig.area.iter().enumerate() {
            assert!((light.position.y - 3.0).abs() < 1e-6);
            assert!((light.position.z - 3.6).abs() < 1e-6);
            let expected_x = settings.area_offset_x + basis.x * index as f32;
            assert!((light.position.x - expected_x).abs() < 1e-6);
        }
    }

    #[test]
    fn initial_rotation_faces_the_origin() {
        let basis = Vec3::new(4.0, 2.0, 6.0);
        let settings = Settings::for_basis(basis);
        let rig = LightRig::new(basis, &settings);
        for light in &rig.area {
            let (_, _, facing) = light.axes();
            let toward_origin = (-light.position).normalize();
            assert!(facing.dot(toward_origin) > 0.999);
        }
    }

    #[test]
    fn apply_is_pure() {
        let basis = Vec3::new(4.0, 2.0, 6.0);
        let mut settings = Settings::for_basis(basis);
        settings.area_rotation_deg[1] = [15.0, -40.0, 5.0];
        settings.area_intensity = 7.5;
        settings.dir_position = [1.0, 8.0, 2.0];

        let mut first = LightRig::new(basis, &settings);
        first.apply(&settings);
        let snapshot = first.clone();
        first.apply(&settings);
        assert_eq!(first, snapshot);
    }

    #[test]
    fn apply_overwrites_every_area_field() {
        let basis = Vec3::new(2.0, 2.0, 2.0);
        let mut settings = Settings::for_basis(basis);
        let mut rig = LightRig::new(basis, &settings);

        settings.area_width = 1.75;
        settings.area_height = 0.6;
        settings.area_color = [1.0, 0.5, 0.25];
        settings.area_offset_x = -3.0;
        settings.show_helpers = false;
        rig.apply(&settings);

        for light in &rig.area {
            assert_eq!(light.width, 1.75);
            assert_eq!(light.height, 0.6);
            assert_eq!(light.color, Vec3::new(1.0, 0.5, 0.25));
        }
        assert_eq!(rig.area[0].position.x, -3.0);
        assert!(!rig.show_helpers);
    }

    #[test]
    fn euler_round_trip_preserves_orientation() {
        let original = look_at_origin(Vec3::new(-4.0, 3.0, 3.6));
        let rebuilt = quat_from_euler_deg(euler_deg_from_quat(original));
        let facing_a = original * Vec3::NEG_Z;
        let facing_b = rebuilt * Vec3::NEG_Z;
        assert!(facing_a.dot(facing_b) > 0.9999);
    }

    #[test]
    fn corners_span_width_and_height() {
        let light = AreaLight {
            position: Vec3::new(1.0, 2.0, 3.0),
            width: 2.0,
            height: 1.0,
            color: Vec3::ONE,
            intensity: 1.0,
            rotation: Quat::IDENTITY,
        };
        let corners = light.corners();
        assert!(((corners[1] - corners[0]).length() - 2.0).abs() < 1e-6);
        assert!(((corners[3] - corners[0]).length() - 1.0).abs() < 1e-6);
    }
}
