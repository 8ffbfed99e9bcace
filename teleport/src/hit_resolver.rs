use cgmath::{Deg, InnerSpace, Matrix, Matrix3, Rad, SquareMatrix, Vector3};
use engine::scene::{Ray, RayHit, Raycaster, SceneGraph};

use crate::registry::{RaycastRegistry, SurfaceFlags};

/// A valid place to teleport to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landing {
    pub point: Vector3<f32>,
    /// Unit world space normal of the landing face.
    pub normal: Vector3<f32>,
}

/// `None` means "no landing": a miss, an occluded navmesh or a surface that is too steep.
pub type LandingResolution = Option<Landing>;

/// Decides whether a ray ends on something the rig may stand on.
#[derive(Clone, Debug)]
pub struct HitResolver {
    landing_normal: Vector3<f32>,
    max_angle: Rad<f32>,
}

impl HitResolver {
    pub fn new(landing_normal: Vector3<f32>, landing_max_angle: Deg<f32>) -> Self {
        Self {
            landing_normal: landing_normal.normalize(),
            max_angle: landing_max_angle.into(),
        }
    }

    /// Occlusion first, then validity: the nearest hit over every scene mesh
    /// must itself be a navmesh, otherwise something solid is in the way.
    pub fn resolve(
        &self,
        ray: &Ray,
        registry: &RaycastRegistry,
        scene: &SceneGraph,
    ) -> LandingResolution {
        let hits = Raycaster::new(scene)
            .intersect_nodes(registry.scene_meshes().iter().map(|s| s.node), ray);
        let nearest = hits.first()?;

        let surface = registry.surface(nearest.node)?;
        if !surface.flags.contains(SurfaceFlags::NAVMESH) {
            return None;
        }
        self.validate(ray, nearest, surface.flags, scene)
    }

    /// Only the collidable set is intersected, so nothing occludes. Angle and
    /// flag checks are the same as in [`resolve`](Self::resolve).
    pub fn resolve_collidable(
        &self,
        ray: &Ray,
        registry: &RaycastRegistry,
        scene: &SceneGraph,
    ) -> LandingResolution {
        let hits = Raycaster::new(scene)
            .intersect_nodes(registry.collidable().map(|s| s.node), ray);
        let nearest = hits.first()?;
        let surface = registry.surface(nearest.node)?;
        self.validate(ray, nearest, surface.flags, scene)
    }

    fn validate(
        &self,
        ray: &Ray,
        hit: &RayHit,
        flags: SurfaceFlags,
        scene: &SceneGraph,
    ) -> LandingResolution {
        if !flags.contains(SurfaceFlags::COLLIDABLE) {
            return None;
        }
        let normal = world_normal(scene, hit)?;
        // Hit from behind: the ray came up through the underside.
        if ray.direction.dot(normal) >= 0.0 {
            return None;
        }
        if self.angle_to_reference(normal) > self.max_angle {
            return None;
        }
        Some(Landing {
            point: hit.point,
            normal,
        })
    }

    fn angle_to_reference(&self, normal: Vector3<f32>) -> Rad<f32> {
        Rad(normal.dot(self.landing_normal).clamp(-1.0, 1.0).acos())
    }
}

/// Face normal carried into world space by the inverse transpose of the
/// node's world rotation/scale.
fn world_normal(scene: &SceneGraph, hit: &RayHit) -> Option<Vector3<f32>> {
    let world = scene.world_transform(hit.node)?;
    let linear = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
    let normal_matrix = linear.invert()?.transpose();
    let normal = normal_matrix * hit.face_normal;
    (normal.magnitude2() > f32::EPSILON).then(|| normal.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::registry::NAVMESH_ATTRIBUTE;
    use crate::selector::Selector;
    use cgmath::{Quaternion, Rotation3};
    use engine::scene::{Mesh, SceneNode, Transform};

    fn resolver() -> HitResolver {
        HitResolver::new(Vector3::new(0.0, 1.0, 0.0), Deg(45.0))
    }

    fn registry_for(scene: &SceneGraph) -> RaycastRegistry {
        let mut registry = RaycastRegistry::new(
            Selector::parse("[navmesh]").unwrap(),
            Selector::default(),
        );
        registry.rebuild(scene, Duration::ZERO);
        registry
    }

    fn floor(transform: Transform) -> SceneNode {
        SceneNode::new("a-plane")
            .with_attribute(NAVMESH_ATTRIBUTE, "")
            .with_mesh(Mesh::plane(10.0, 10.0))
            .with_transform(transform)
    }

    fn down(x: f32, z: f32) -> Ray {
        Ray::new(Vector3::new(x, 5.0, z), Vector3::new(0.0, -1.0, 0.0))
    }

    #[test]
    fn test_lands_on_flat_navmesh() {
        let mut scene = SceneGraph::new();
        scene.add(floor(Transform::identity()));
        let registry = registry_for(&scene);

        let landing = resolver().resolve(&down(1.0, -2.0), &registry, &scene).unwrap();
        assert!((landing.point - Vector3::new(1.0, 0.0, -2.0)).magnitude() < 1e-5);
        assert!((landing.normal - Vector3::new(0.0, 1.0, 0.0)).magnitude() < 1e-6);
    }

    #[test]
    fn test_normal_uses_inverse_transpose() {
        // Rotated floor under a non-uniformly scaled parent: the normal leans
        // less than the naive transform would make it.
        let mut scene = SceneGraph::new();
        let stretched = scene.add(
            SceneNode::new("a-entity")
                .with_transform(Transform::identity().with_scale(Vector3::new(2.0, 1.0, 1.0))),
        );
        scene
            .add_child(
                stretched,
                floor(Transform::identity().with_rotation(Quaternion::from_angle_z(Deg(20.0)))),
            )
            .unwrap();
        let registry = registry_for(&scene);

        let landing = resolver().resolve(&down(0.5, 0.5), &registry, &scene).unwrap();
        let (sin, cos) = Deg(20.0f32).0.to_radians().sin_cos();
        let expected = Vector3::new(-sin / 2.0, cos, 0.0).normalize();
        assert!((landing.normal - expected).magnitude() < 1e-5);
    }

    #[test]
    fn test_non_navmesh_geometry_gives_no_landing() {
        let mut scene = SceneGraph::new();
        scene.add(SceneNode::new("a-plane").with_mesh(Mesh::plane(10.0, 10.0)));
        let registry = registry_for(&scene);

        assert_eq!(resolver().resolve(&down(0.0, 0.0), &registry, &scene), None);
        assert_eq!(resolver().resolve_collidable(&down(0.0, 0.0), &registry, &scene), None);
    }

    #[test]
    fn test_miss_gives_no_landing() {
        let mut scene = SceneGraph::new();
        scene.add(floor(Transform::identity()));
        let registry = registry_for(&scene);

        assert_eq!(resolver().resolve(&down(20.0, 0.0), &registry, &scene), None);
    }

    #[test]
    fn test_steep_nearest_blocks_valid_floor_beyond() {
        let mut scene = SceneGraph::new();
        scene.add(floor(Transform::identity()));
        scene.add(floor(
            Transform::from_translation(Vector3::new(0.0, 2.0, 0.0))
                .with_rotation(Quaternion::from_angle_x(Deg(50.0))),
        ));
        let registry = registry_for(&scene);

        assert_eq!(resolver().resolve(&down(0.3, 0.2), &registry, &scene), None);
        assert_eq!(resolver().resolve_collidable(&down(0.3, 0.2), &registry, &scene), None);
    }

    #[test]
    fn test_occluder_blocks_only_the_primary_path() {
        let mut scene = SceneGraph::new();
        scene.add(floor(Transform::identity()));
        scene.add(
            SceneNode::new("a-box")
                .with_mesh(Mesh::cuboid(1.0, 1.0, 1.0))
                .with_transform(Transform::from_translation(Vector3::new(0.0, 2.0, 0.0))),
        );
        let registry = registry_for(&scene);

        assert_eq!(resolver().resolve(&down(0.1, 0.1), &registry, &scene), None);
        assert!(resolver()
            .resolve_collidable(&down(0.1, 0.1), &registry, &scene)
            .is_some());
    }

    #[test]
    fn test_stale_registry_entry_is_ignored() {
        let mut scene = SceneGraph::new();
        let stale = scene.add(floor(Transform::identity()));
        let registry = registry_for(&scene);
        scene.remove(stale);

        assert_eq!(resolver().resolve(&down(0.0, 0.0), &registry, &scene), None);
    }

    #[test]
    fn test_underside_of_navmesh_is_not_a_landing() {
        let mut scene = SceneGraph::new();
        scene.add(floor(Transform::from_translation(Vector3::new(0.0, 3.0, 0.0))));
        let registry = registry_for(&scene);
        let up = Ray::new(Vector3::new(0.0, 1.6, 0.0), Vector3::new(0.0, 1.0, 0.0));

        assert_eq!(resolver().resolve(&up, &registry, &scene), None);
        assert_eq!(resolver().resolve_collidable(&up, &registry, &scene), None);
        assert!(resolver().resolve(&down(0.0, 0.0), &registry, &scene).is_some());
    }

    #[test]
    fn test_mezzanine_underside_blocks_floor_above_it() {
        // Looking up at a walkable mezzanine must not land on it, and the
        // mezzanine still hides the floor of the level above.
        let mut scene = SceneGraph::new();
        scene.add(floor(Transform::from_translation(Vector3::new(0.0, 3.0, 0.0))));
        scene.add(floor(Transform::from_translation(Vector3::new(0.0, 6.0, 0.0))));
        let registry = registry_for(&scene);
        let up = Ray::new(Vector3::new(0.5, 1.6, 0.5), Vector3::new(0.0, 1.0, 0.0));

        assert_eq!(resolver().resolve(&up, &registry, &scene), None);
    }
}
