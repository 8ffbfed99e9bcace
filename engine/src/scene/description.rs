use std::collections::BTreeMap;
use std::path::Path;

use cgmath::{Deg, Quaternion, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use super::{Mesh, NodeId, SceneGraph, SceneNode, Transform};
use crate::error::SceneError;
use crate::scene_log;

/// JSON form of a scene tree, the markup the host would otherwise parse.
///
/// ```json
/// { "nodes": [
///   { "element": "a-plane", "attributes": { "navmesh": "" },
///     "mesh": { "type": "plane", "width": 10, "depth": 10 } }
/// ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescription {
    #[serde(default = "default_element")]
    pub element: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees, applied X then Y then Z.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub mesh: Option<MeshDescription>,
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeshDescription {
    Plane { width: f32, depth: f32 },
    Box { width: f32, height: f32, depth: f32 },
    Triangle { vertices: [[f32; 3]; 3] },
}

fn default_element() -> String {
    "a-entity".to_string()
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_visible() -> bool {
    true
}

impl MeshDescription {
    pub fn to_mesh(&self) -> Mesh {
        match self {
            MeshDescription::Plane { width, depth } => Mesh::plane(*width, *depth),
            MeshDescription::Box {
                width,
                height,
                depth,
            } => Mesh::cuboid(*width, *height, *depth),
            MeshDescription::Triangle { vertices: [a, b, c] } => {
                Mesh::triangle(Vector3::from(*a), Vector3::from(*b), Vector3::from(*c))
            }
        }
    }
}

impl NodeDescription {
    fn to_node(&self) -> SceneNode {
        let [rx, ry, rz] = self.rotation;
        let rotation = Quaternion::from_angle_x(Deg(rx))
            * Quaternion::from_angle_y(Deg(ry))
            * Quaternion::from_angle_z(Deg(rz));

        let mut node = SceneNode::new(self.element.clone()).with_transform(
            Transform::from_translation(Vector3::from(self.position))
                .with_rotation(rotation)
                .with_scale(Vector3::from(self.scale)),
        );
        node.id = self.id.clone();
        node.classes = self.classes.clone();
        node.attributes = self.attributes.clone();
        node.visible = self.visible;
        node.mesh = self.mesh.as_ref().map(MeshDescription::to_mesh);
        node
    }
}

impl SceneDescription {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn build(&self) -> SceneGraph {
        let mut scene = SceneGraph::new();
        for description in &self.nodes {
            let root = scene.add(description.to_node());
            add_children(&mut scene, root, &description.children);
        }
        scene_log!(DEBUG, "built scene with {} nodes", scene.len());
        scene
    }
}

fn add_children(scene: &mut SceneGraph, parent: NodeId, children: &[NodeDescription]) {
    for description in children {
        if let Ok(child) = scene.add_child(parent, description.to_node()) {
            add_children(scene, child, &description.children);
        }
    }
}
