use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3};
use ordered_float::OrderedFloat;

use super::{NodeId, SceneGraph};
use crate::raycast_log;

const EPSILON: f32 = 1.0e-6;
// Slack on the barycentric bounds so rays through a shared edge still hit.
const EDGE_SLACK: f32 = 1.0e-5;

/// World space ray. `direction` is always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray along the local -Z axis of an object, the forward convention for
    /// cameras, reticles and tracked controllers.
    pub fn from_transform(world: &Matrix4<f32>) -> Self {
        let origin = world.w.truncate();
        let forward = (*world * Vector3::new(0.0, 0.0, -1.0).extend(0.0)).truncate();
        Self::new(origin, forward)
    }

    pub fn at(&self, distance: f32) -> Vector3<f32> {
        self.origin + self.direction * distance
    }
}

/// Intersection of a ray with one mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub node: NodeId,
    pub distance: f32,
    /// World space hit position.
    pub point: Vector3<f32>,
    /// Unit normal of the hit face in the node's object space.
    pub face_normal: Vector3<f32>,
    pub face_index: usize,
}

/// Möller–Trumbore ray/triangle test, both sides. Returns the ray parameter.
pub fn intersect_triangle(
    origin: Vector3<f32>,
    direction: Vector3<f32>,
    [a, b, c]: [Vector3<f32>; 3],
) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let h = direction.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(h) * inv_det;
    if !(-EDGE_SLACK..=1.0 + EDGE_SLACK).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < -EDGE_SLACK || u + v > 1.0 + EDGE_SLACK {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t > EPSILON).then_some(t)
}

/// Ray queries against mesh nodes of a scene, like the host raycaster.
pub struct Raycaster<'a> {
    scene: &'a SceneGraph,
    far: f32,
}

impl<'a> Raycaster<'a> {
    pub fn new(scene: &'a SceneGraph) -> Self {
        Self {
            scene,
            far: f32::INFINITY,
        }
    }

    pub fn with_far(mut self, far: f32) -> Self {
        self.far = far;
        self
    }

    /// Closest hit on `node`'s mesh. Nodes without a mesh, with a singular
    /// world matrix, or no longer in the scene never hit.
    pub fn intersect_node(&self, node: NodeId, ray: &Ray) -> Option<RayHit> {
        let mesh = self.scene.node(node)?.mesh.as_ref()?;
        let world = self.scene.world_transform(node)?;
        let Some(inverse) = world.invert() else {
            raycast_log!(DEBUG, "skipping {:?}: singular world transform", node);
            return None;
        };

        // Affine maps keep the ray parameter, so the local `t` is the world distance.
        let local_origin = (inverse * ray.origin.extend(1.0)).truncate();
        let local_direction = (inverse * ray.direction.extend(0.0)).truncate();

        let (face_index, distance, face) = mesh
            .faces()
            .enumerate()
            .filter_map(|(index, face)| {
                intersect_triangle(local_origin, local_direction, face).map(|t| (index, t, face))
            })
            .filter(|(_, t, _)| *t <= self.far)
            .min_by_key(|(_, t, _)| OrderedFloat(*t))?;

        let [a, b, c] = face;
        Some(RayHit {
            node,
            distance,
            point: ray.at(distance),
            face_normal: (b - a).cross(c - a).normalize(),
            face_index,
        })
    }

    /// Closest hit per node, nearest first.
    pub fn intersect_nodes(
        &self,
        nodes: impl IntoIterator<Item = NodeId>,
        ray: &Ray,
    ) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = nodes
            .into_iter()
            .filter_map(|node| self.intersect_node(node, ray))
            .collect();
        hits.sort_by_key(|hit| OrderedFloat(hit.distance));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Mesh, SceneNode, Transform};
    use cgmath::{Deg, Quaternion, Rotation3};

    fn down_from(height: f32) -> Ray {
        Ray::new(Vector3::new(0.0, height, 0.0), Vector3::new(0.0, -1.0, 0.0))
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let face = [
            Vector3::new(-1.0, 0.0, -1.0),
            Vector3::new(-1.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 1.0),
        ];
        let down = Vector3::new(0.0, -1.0, 0.0);

        let t = intersect_triangle(Vector3::new(-0.5, 2.0, 0.5), down, face).unwrap();
        assert!((t - 2.0).abs() < 1e-6);

        assert!(intersect_triangle(Vector3::new(0.9, 2.0, -0.9), down, face).is_none());
        // pointing away
        assert!(intersect_triangle(Vector3::new(-0.5, 2.0, 0.5), -down, face).is_none());
    }

    #[test]
    fn test_intersect_scaled_and_moved_node() {
        let mut scene = SceneGraph::new();
        let floor = scene.add(
            SceneNode::new("a-plane")
                .with_mesh(Mesh::plane(1.0, 1.0))
                .with_transform(
                    Transform::from_translation(Vector3::new(0.0, -1.0, 0.0))
                        .with_scale(Vector3::new(10.0, 1.0, 10.0)),
                ),
        );

        let ray = Ray::new(Vector3::new(3.0, 4.0, 3.0), Vector3::new(0.0, -1.0, 0.0));
        let hit = Raycaster::new(&scene).intersect_node(floor, &ray).unwrap();

        assert!((hit.distance - 5.0).abs() < 1e-5);
        assert!((hit.point - Vector3::new(3.0, -1.0, 3.0)).magnitude() < 1e-5);
        assert_eq!(hit.face_normal, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_far_limit() {
        let mut scene = SceneGraph::new();
        let floor = scene.add(SceneNode::new("a-plane").with_mesh(Mesh::plane(10.0, 10.0)));

        let raycaster = Raycaster::new(&scene).with_far(1.0);
        assert!(raycaster.intersect_node(floor, &down_from(2.0)).is_none());
    }

    #[test]
    fn test_hits_sorted_nearest_first() {
        let mut scene = SceneGraph::new();
        let floor = scene.add(SceneNode::new("a-plane").with_mesh(Mesh::plane(10.0, 10.0)));
        let crate_box = scene.add(
            SceneNode::new("a-box")
                .with_mesh(Mesh::cuboid(1.0, 1.0, 1.0))
                .with_transform(Transform::from_translation(Vector3::new(0.0, 1.0, 0.0))),
        );

        let hits = Raycaster::new(&scene).intersect_nodes([floor, crate_box], &down_from(5.0));
        let order: Vec<NodeId> = hits.iter().map(|hit| hit.node).collect();
        assert_eq!(order, vec![crate_box, floor]);
        assert!((hits[0].distance - 3.5).abs() < 1e-5);
    }

    #[test]
    fn test_from_transform_points_down_negative_z() {
        let world = Matrix4::from_translation(Vector3::new(0.0, 1.6, 0.0))
            * Matrix4::from(Quaternion::from_angle_x(Deg(-90.0)));
        let ray = Ray::from_transform(&world);

        assert!((ray.origin - Vector3::new(0.0, 1.6, 0.0)).magnitude() < 1e-6);
        assert!((ray.direction - Vector3::new(0.0, -1.0, 0.0)).magnitude() < 1e-5);
    }
}
