use cgmath::Matrix4;
use engine::scene::Ray;

/// Reticle ("gaze cursor") input. The reticle raycaster reports its ray as it
/// moves; clicks are resolved from the ray current at click time.
#[derive(Clone, Debug, Default)]
pub struct GazeAdapter {
    reticle: Option<Ray>,
}

impl GazeAdapter {
    pub fn aim(&mut self, ray: Ray) {
        self.reticle = Some(ray);
    }

    pub fn ray(&self) -> Option<Ray> {
        self.reticle
    }

    /// Ray to resolve for a click. Without a reported ray the reticle sits at
    /// screen centre, i.e. straight ahead of the camera head.
    pub fn click_ray(&mut self, reported: Option<Ray>, head_world: &Matrix4<f32>) -> Ray {
        if let Some(ray) = reported {
            self.reticle = Some(ray);
        }
        self.reticle
            .unwrap_or_else(|| Ray::from_transform(head_world))
    }

    pub fn reset(&mut self) {
        self.reticle = None;
    }
}
