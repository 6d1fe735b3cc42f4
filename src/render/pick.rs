//! CPU ray picking against the loaded model.
//!
//! A click unprojects the pointer into a world-space ray; the nearest
//! triangle hit becomes the new orbit target. A miss falls back to a
//! point [`MISS_DISTANCE`] units ahead along the view direction.

use crate::assets::ModelData;
use glam::{Mat4, Vec2, Vec3};

/// Fallback distance along the camera forward vector when the ray hits
/// no geometry.
pub const MISS_DISTANCE: f32 = 10.0;

const T_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Build the ray from the camera eye through a normalized device
    /// coordinate (x right, y up, both in [-1, 1]).
    pub fn through_ndc(eye: Vec3, view_proj: Mat4, ndc: Vec2) -> Self {
        let inverse = view_proj.inverse();
        let on_ray = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Self {
            origin: eye,
            dir: (on_ray - eye).normalize_or_zero(),
        }
    }
}

/// Nearest intersection of the ray with the model's triangles, if any.
/// The model AABB is tested first so a miss costs no triangle loop.
pub fn intersect_model(model: &ModelData, ray: &Ray) -> Option<Vec3> {
    if !hits_aabb(model.min, model.max, ray) {
        return None;
    }
    let mut nearest: Option<f32> = None;
    for primitive in &model.primitives {
        for triangle in primitive.indices.chunks_exact(3) {
            let a = Vec3::from_array(primitive.positions[triangle[0] as usize]);
            let b = Vec3::from_array(primitive.positions[triangle[1] as usize]);
            let c = Vec3::from_array(primitive.positions[triangle[2] as usize]);
            if let Some(t) = intersect_triangle(ray, a, b, c) {
                if nearest.map_or(true, |best| t < best) {
                    nearest = Some(t);
                }
            }
        }
    }
    nearest.map(|t| ray.at(t))
}

/// Slab test, tolerant of rays parallel to an axis.
fn hits_aabb(min: Vec3, max: Vec3, ray: &Ray) -> bool {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.dir[axis];
        if dir.abs() < 1e-8 {
            if origin < min[axis] || origin > max[axis] {
                return false;
            }
            continue;
        }
        let t0 = (min[axis] - origin) / dir;
        let t1 = (max[axis] - origin) / dir;
        t_min = t_min.max(t0.min(t1));
        t_max = t_max.min(t0.max(t1));
    }
    t_max >= t_min.max(0.0)
}

/// Moller-Trumbore, double-sided.
fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.dir.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < 1e-8 {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t > T_EPSILON).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MaterialFactors, PrimitiveData};

    /// A unit quad in the XY plane at z = 0, facing +Z.
    fn quad_model() -> ModelData {
        ModelData {
            name: "quad".to_string(),
            min: Vec3::new(-0.5, -0.5, 0.0),
            max: Vec3::new(0.5, 0.5, 0.0),
            primitives: vec![PrimitiveData {
                positions: vec![
                    [-0.5, -0.5, 0.0],
                    [0.5, -0.5, 0.0],
                    [0.5, 0.5, 0.0],
                    [-0.5, 0.5, 0.0],
                ],
                normals: vec![[0.0, 0.0, 1.0]; 4],
                indices: vec![0, 1, 2, 0, 2, 3],
                material: MaterialFactors::default(),
            }],
        }
    }

    #[test]
    fn ray_hits_the_nearest_surface_point() {
        let model = quad_model();
        let ray = Ray {
            origin: Vec3::new(0.1, 0.1, 5.0),
            dir: Vec3::NEG_Z,
        };
        let hit = intersect_model(&model, &ray).unwrap();
        assert!((hit - Vec3::new(0.1, 0.1, 0.0)).length() < 1e-5);
    }

    #[test]
    fn ray_outside_the_quad_misses() {
        let model = quad_model();
        let ray = Ray {
            origin: Vec3::new(2.0, 2.0, 5.0),
            dir: Vec3::NEG_Z,
        };
        assert!(intersect_model(&model, &ray).is_none());
    }

    #[test]
    fn backside_hits_count_too() {
        let model = quad_model();
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, -5.0),
            dir: Vec3::Z,
        };
        assert!(intersect_model(&model, &ray).is_some());
    }

    #[test]
    fn geometry_behind_the_origin_is_ignored() {
        let model = quad_model();
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, -1.0),
            dir: Vec3::NEG_Z,
        };
        assert!(intersect_model(&model, &ray).is_none());
    }

    #[test]
    fn miss_fallback_is_ten_units_along_forward() {
        let ray = Ray {
            origin: Vec3::new(2.0, 2.0, 4.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        };
        let point = ray.at(MISS_DISTANCE);
        assert!((point - Vec3::new(2.0, 2.0, -6.0)).length() < 1e-6);
        assert!(((point - ray.origin).length() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn ndc_center_ray_matches_the_view_direction() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0);
        let ray = Ray::through_ndc(eye, proj * view, Vec2::ZERO);
        assert!((ray.dir - Vec3::NEG_Z).length() < 1e-4);

        // Off-center NDC x bends the ray toward +X in view space.
        let right = Ray::through_ndc(eye, proj * view, Vec2::new(0.5, 0.0));
        assert!(right.dir.x > 0.1);
    }
}
