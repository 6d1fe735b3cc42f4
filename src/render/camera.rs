//! Perspective camera and the damped orbit controller.

use crate::scene::Framing;
use glam::{Mat4, Vec2, Vec3};

const FOV_Y_DEG: f32 = 60.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 1000.0;

/// Perspective projection state. The aspect ratio is rewritten on every
/// viewport resize and the projection matrix is recomputed every query,
/// never cached.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub aspect: f32,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            aspect: 1.0,
            fov_y_deg: FOV_Y_DEG,
            near: NEAR_PLANE,
            far: FAR_PLANE,
        };
        camera.set_viewport(width, height);
        camera
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }
}

const ROTATE_SPEED: f32 = 0.005;
const PAN_SPEED: f32 = 0.0015;
const ZOOM_STEP: f32 = 0.95;
/// Exponential smoothing rate for pending input; higher is snappier.
const DAMPING_RATE: f32 = 12.0;
const MIN_DISTANCE: f32 = 0.05;
const MAX_DISTANCE: f32 = 500.0;
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Input-driven rig that rotates/pans/zooms the camera around a mutable
/// look-at target. Injected deltas are consumed gradually by
/// [`OrbitController::update`], which gives the damped glide.
#[derive(Debug, Clone, Copy)]
pub struct OrbitController {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    rotate_pending: Vec2,
    pan_pending: Vec2,
    zoom_pending: f32,
}

impl OrbitController {
    pub fn new(framing: &Framing) -> Self {
        let mut controller = Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            distance: 1.0,
            rotate_pending: Vec2::ZERO,
            pan_pending: Vec2::ZERO,
            zoom_pending: 0.0,
        };
        controller.frame(framing);
        controller
    }

    /// Snap to a framing: derive yaw/pitch/distance from the eye-target
    /// offset and drop any pending input.
    pub fn frame(&mut self, framing: &Framing) {
        let offset = framing.eye - framing.target;
        self.distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / self.distance).clamp(-1.0, 1.0).asin();
        self.target = framing.target;
        self.rotate_pending = Vec2::ZERO;
        self.pan_pending = Vec2::ZERO;
        self.zoom_pending = 0.0;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye()).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn inject_rotate(&mut self, delta_px: Vec2) {
        self.rotate_pending += delta_px * ROTATE_SPEED;
    }

    pub fn inject_pan(&mut self, delta_px: Vec2) {
        self.pan_pending += delta_px * PAN_SPEED * self.distance;
    }

    /// Positive steps zoom in.
    pub fn inject_zoom(&mut self, steps: f32) {
        self.zoom_pending += steps;
    }

    /// Advance the damped motion: consume an exponentially-smoothed
    /// fraction of each pending delta so motion eases out after the
    /// input stops.
    pub fn update(&mut self, dt: f32) {
        let k = 1.0 - (-dt.max(0.0) * DAMPING_RATE).exp();

        let rotate = self.rotate_pending * k;
        self.rotate_pending -= rotate;
        self.yaw -= rotate.x;
        self.pitch = (self.pitch + rotate.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let pan = self.pan_pending * k;
        self.pan_pending -= pan;
        if pan != Vec2::ZERO {
            let forward = self.forward();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward);
            self.target += right * -pan.x + up * pan.y;
        }

        let zoom = self.zoom_pending * k;
        self.zoom_pending -= zoom;
        if zoom != 0.0 {
            self.distance = (self.distance * ZOOM_STEP.powf(zoom)).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DEFAULT_EYE, DEFAULT_TARGET};

    fn default_controller() -> OrbitController {
        OrbitController::new(&Framing {
            eye: DEFAULT_EYE,
            target: DEFAULT_TARGET,
        })
    }

    #[test]
    fn aspect_follows_viewport_exactly() {
        let mut camera = Camera::new(1280, 720);
        assert!((camera.aspect - 1280.0 / 720.0).abs() < 1e-6);
        camera.set_viewport(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        // A degenerate minimized viewport must not divide by zero.
        camera.set_viewport(640, 0);
        assert!(camera.aspect.is_finite());
    }

    #[test]
    fn framing_round_trips_through_spherical_state() {
        let controller = default_controller();
        assert!((controller.eye() - DEFAULT_EYE).length() < 1e-5);
        assert_eq!(controller.target(), DEFAULT_TARGET);
    }

    #[test]
    fn rotation_orbits_without_changing_distance() {
        let mut controller = default_controller();
        let before = (controller.eye() - controller.target()).length();
        controller.inject_rotate(Vec2::new(120.0, 40.0));
        for _ in 0..120 {
            controller.update(1.0 / 60.0);
        }
        let after = (controller.eye() - controller.target()).length();
        assert!((before - after).abs() < 1e-4);
        assert!((controller.eye() - DEFAULT_EYE).length() > 0.01);
    }

    #[test]
    fn damped_input_converges_to_injected_amount() {
        let mut controller = default_controller();
        controller.inject_zoom(3.0);
        for _ in 0..240 {
            controller.update(1.0 / 60.0);
        }
        let expected = (DEFAULT_EYE.length()) * ZOOM_STEP.powf(3.0);
        let actual = (controller.eye() - controller.target()).length();
        assert!((actual - expected).abs() < 1e-3);
    }

    #[test]
    fn pitch_stays_clamped() {
        let mut controller = default_controller();
        controller.inject_rotate(Vec2::new(0.0, 1e5));
        for _ in 0..600 {
            controller.update(1.0 / 60.0);
        }
        assert!(controller.eye().is_finite());
        assert!(controller.pitch.abs() <= PITCH_LIMIT + 1e-6);
    }

    #[test]
    fn set_target_moves_the_look_at_point() {
        let mut controller = default_controller();
        let target = Vec3::new(1.0, 2.0, 3.0);
        controller.set_target(target);
        assert_eq!(controller.target(), target);
        // The eye keeps its offset shape relative to the new target.
        assert!((controller.eye() - target).length() > MIN_DISTANCE);
    }
}
