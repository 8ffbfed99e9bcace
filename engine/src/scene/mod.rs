//! Minimal scene runtime: an entity tree with transforms and triangle
//! meshes, plus the ray queries and camera math navigation is built on.
pub mod camera;
pub use camera::{PerspectiveCamera, Viewport};

pub mod description;
pub use description::{MeshDescription, NodeDescription, SceneDescription};

pub mod graph;
pub use graph::{Descendants, NodeId, SceneGraph, SceneNode};

pub mod mesh;
pub use mesh::Mesh;

pub mod raycast;
pub use raycast::{intersect_triangle, Ray, RayHit, Raycaster};

pub mod transform;
pub use transform::{Pose, Transform};
