use cgmath::{Matrix4, Vector2};
use engine::scene::{PerspectiveCamera, Ray, Viewport};

/// Click-not-drag detection for the desktop pointer.
#[derive(Clone, Debug, Default)]
pub struct MouseAdapter {
    down_at: Option<Vector2<f32>>,
    pointer: Option<Vector2<f32>>,
}

impl MouseAdapter {
    pub fn press(&mut self, position: Vector2<f32>) {
        self.down_at = Some(position);
        self.pointer = Some(position);
    }

    pub fn move_to(&mut self, position: Vector2<f32>) {
        self.pointer = Some(position);
    }

    /// True for a click: released exactly where it was pressed. Any pointer
    /// movement in between makes it a drag (camera look), not a teleport.
    pub fn release(&mut self, position: Vector2<f32>) -> bool {
        self.pointer = Some(position);
        self.down_at.take() == Some(position)
    }

    pub fn pointer(&self) -> Option<Vector2<f32>> {
        self.pointer
    }

    pub fn reset(&mut self) {
        self.down_at = None;
        self.pointer = None;
    }
}

/// Ray from the camera through a pointer position given in viewport pixels.
pub fn pointer_ray(
    camera: &PerspectiveCamera,
    viewport: &Viewport,
    camera_world: &Matrix4<f32>,
    pointer: Vector2<f32>,
) -> Option<Ray> {
    let ndc = viewport.to_ndc(pointer)?;
    Some(camera.ray_through_ndc(camera_world, ndc))
}
