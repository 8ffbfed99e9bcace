use cgmath::{Angle, Deg, InnerSpace, Matrix4, Vector2, Vector3};

use super::Ray;

/// Canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Pixel coordinates (origin top left) to normalized device coordinates.
    /// `None` for an empty viewport.
    pub fn to_ndc(&self, pointer: Vector2<f32>) -> Option<Vector2<f32>> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Vector2::new(
            (pointer.x / self.width) * 2.0 - 1.0,
            -(pointer.y / self.height) * 2.0 + 1.0,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y: Deg<f32>,
    pub aspect: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_y: Deg<f32>, aspect: f32) -> Self {
        Self { fov_y, aspect }
    }

    /// Ray from the camera position through `ndc` on the image plane.
    pub fn ray_through_ndc(&self, camera_world: &Matrix4<f32>, ndc: Vector2<f32>) -> Ray {
        let half_height = (self.fov_y / 2.0).tan();
        let view_direction = Vector3::new(
            ndc.x * half_height * self.aspect,
            ndc.y * half_height,
            -1.0,
        );
        let direction = (*camera_world * view_direction.extend(0.0)).truncate();
        Ray::new(camera_world.w.truncate(), direction.normalize())
    }
}
