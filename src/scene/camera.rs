// camera.rs - Perspective projection onto a 2D surface
//
// The camera sits on the +z axis looking at the origin with +y up, the
// same framing as a default WebGL perspective camera.

use glam::Vec3;

const NEAR: f32 = 0.1;

/// Screen-space result of projecting a world point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    /// Pixels per world unit at this depth.
    pub scale: f32,
    /// Distance in front of the camera. Larger is farther.
    pub depth: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub distance: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
}

impl Camera {
    pub fn new(distance: f32, fov_degrees: f32) -> Self {
        Self { distance, fov: fov_degrees.to_radians() }
    }

    /// Project `p` into a `w`x`h` viewport. `None` behind the near plane.
    pub fn project(&self, p: Vec3, w: f32, h: f32) -> Option<Projected> {
        let depth = self.distance - p.z;
        if depth < NEAR || h <= 0.0 {
            return None;
        }
        let focal = 1.0 / (self.fov * 0.5).tan();
        let half_h = h * 0.5;
        let scale = focal / depth * half_h;

        Some(Projected {
            x: w * 0.5 + p.x * scale,
            y: half_h - p.y * scale,
            scale,
            depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_lands_in_center() {
        let cam = Camera::new(8.0, 50.0);
        let p = cam.project(Vec3::ZERO, 800.0, 600.0).unwrap();
        assert_eq!((p.x, p.y), (400.0, 300.0));
        assert_eq!(p.depth, 8.0);
    }

    #[test]
    fn up_is_up_on_screen() {
        let cam = Camera::new(8.0, 50.0);
        let p = cam.project(Vec3::new(1.0, 1.0, 0.0), 800.0, 600.0).unwrap();
        assert!(p.x > 400.0);
        assert!(p.y < 300.0);
    }

    #[test]
    fn nearer_is_bigger() {
        let cam = Camera::new(8.0, 50.0);
        let near = cam.project(Vec3::new(0.0, 0.0, 3.0), 800.0, 600.0).unwrap();
        let far = cam.project(Vec3::new(0.0, 0.0, -3.0), 800.0, 600.0).unwrap();
        assert!(near.scale > far.scale);
        assert!(near.depth < far.depth);
    }

    #[test]
    fn frustum_edge_matches_fov() {
        // At depth d the half-height visible is d * tan(fov / 2)
        let cam = Camera::new(8.0, 50.0);
        let edge = 8.0 * (25.0f32).to_radians().tan();
        let p = cam.project(Vec3::new(0.0, edge, 0.0), 800.0, 600.0).unwrap();
        assert!(p.y.abs() < 1e-3);
    }

    #[test]
    fn behind_camera_is_culled() {
        let cam = Camera::new(8.0, 50.0);
        assert!(cam.project(Vec3::new(0.0, 0.0, 9.0), 800.0, 600.0).is_none());
    }
}
