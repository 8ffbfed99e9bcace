use cgmath::{Matrix4, One, Quaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Local translation/rotation/scale of a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.translation,
            orientation: self.rotation,
        }
    }

    /// Overwrite translation and rotation, keeping scale.
    pub fn set_pose(&mut self, pose: Pose) {
        self.translation = pose.position;
        self.rotation = pose.orientation;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Position + orientation, the part of a transform the camera rig moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

impl Pose {
    pub fn new(position: Vector3<f32>, orientation: Quaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn at(position: Vector3<f32>) -> Self {
        Self::new(position, Quaternion::one())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3, Vector4};

    #[test]
    fn test_matrix_applies_scale_then_rotation_then_translation() {
        let transform = Transform::from_translation(Vector3::new(1.0, 2.0, 3.0))
            .with_rotation(Quaternion::from_angle_y(Deg(90.0)))
            .with_scale(Vector3::new(2.0, 2.0, 2.0));

        let moved = transform.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);

        // x axis scaled to 2, rotated onto -z, then translated
        assert!((moved.x - 1.0).abs() < 1e-5);
        assert!((moved.y - 2.0).abs() < 1e-5);
        assert!((moved.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_set_pose_keeps_scale() {
        let mut transform = Transform::identity().with_scale(Vector3::new(3.0, 3.0, 3.0));
        transform.set_pose(Pose::at(Vector3::new(0.0, 5.0, 0.0)));

        assert_eq!(transform.translation, Vector3::new(0.0, 5.0, 0.0));
        assert_eq!(transform.scale, Vector3::new(3.0, 3.0, 3.0));
    }
}
