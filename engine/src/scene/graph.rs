use std::collections::BTreeMap;

use cgmath::Matrix4;

use super::{Mesh, Pose, Transform};
use crate::error::SceneError;

/// Stable handle to a node. Handles are never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An entity in the scene tree: markup-like identity (element name, id,
/// classes, attributes) plus a local transform and an optional mesh.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub element: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub transform: Transform,
    pub visible: bool,
    pub mesh: Option<Mesh>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            transform: Transform::identity(),
            visible: true,
            mesh: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Flag attribute (`navmesh`, `raycast-exclude`) when `value` is empty.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena backed scene tree.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Option<SceneNode>>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top level node.
    pub fn add(&mut self, mut node: SceneNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        let id = self.push(node);
        self.roots.push(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::MissingNode(parent));
        }
        node.parent = Some(parent);
        node.children.clear();
        let id = self.push(node);
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }
        Ok(id)
    }

    fn push(&mut self, node: SceneNode) -> NodeId {
        self.nodes.push(Some(node));
        NodeId(self.nodes.len() - 1)
    }

    /// Remove `id` and its whole subtree. Returns false if it was already gone.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).map(SceneNode::parent) else {
            return false;
        };

        match parent {
            Some(parent) => {
                if let Some(parent_node) = self.node_mut(parent) {
                    parent_node.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }

        let doomed: Vec<NodeId> = self.descendants(id).map(|(node_id, _)| node_id).collect();
        for node_id in doomed {
            self.nodes[node_id.0] = None;
        }
        true
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Object-to-world matrix, composed down from the root.
    pub fn world_transform(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let node = self.node(id)?;
        let local = node.transform.to_matrix();
        match node.parent {
            Some(parent) => Some(self.world_transform(parent)? * local),
            None => Some(local),
        }
    }

    pub fn pose(&self, id: NodeId) -> Option<Pose> {
        self.node(id).map(|node| node.transform.pose())
    }

    pub fn set_pose(&mut self, id: NodeId, pose: Pose) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.transform.set_pose(pose);
                true
            }
            None => false,
        }
    }

    /// Pre-order walk of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            scene: self,
            stack: vec![id],
        }
    }

    /// Pre-order walk of the whole scene.
    pub fn walk(&self) -> Descendants<'_> {
        Descendants {
            scene: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    pub fn find(&self, mut predicate: impl FnMut(&SceneNode) -> bool) -> Option<NodeId> {
        self.walk()
            .find(|(_, node)| predicate(node))
            .map(|(id, _)| id)
    }

    pub fn find_by_id(&self, dom_id: &str) -> Option<NodeId> {
        self.find(|node| node.id.as_deref() == Some(dom_id))
    }
}

pub struct Descendants<'a> {
    scene: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (NodeId, &'a SceneNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.scene.node(id) {
                self.stack.extend(node.children.iter().rev().copied());
                return Some((id, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Vector4};

    fn names(scene: &SceneGraph, ids: impl Iterator<Item = NodeId>) -> Vec<String> {
        ids.map(|id| scene.node(id).unwrap().element.clone()).collect()
    }

    #[test]
    fn test_walk_is_pre_order() {
        let mut scene = SceneGraph::new();
        let a = scene.add(SceneNode::new("a"));
        let b = scene.add_child(a, SceneNode::new("b")).unwrap();
        scene.add_child(b, SceneNode::new("c")).unwrap();
        scene.add_child(a, SceneNode::new("d")).unwrap();
        scene.add(SceneNode::new("e"));

        let order = names(&scene, scene.walk().map(|(id, _)| id));
        assert_eq!(order, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut scene = SceneGraph::new();
        let a = scene.add(SceneNode::new("a"));
        let b = scene.add_child(a, SceneNode::new("b")).unwrap();
        let c = scene.add_child(b, SceneNode::new("c")).unwrap();

        assert!(scene.remove(b));
        assert!(!scene.contains(c));
        assert!(scene.node(a).unwrap().children().is_empty());
        assert_eq!(scene.len(), 1);
        assert!(!scene.remove(b));
    }

    #[test]
    fn test_add_child_to_missing_parent() {
        let mut scene = SceneGraph::new();
        let a = scene.add(SceneNode::new("a"));
        scene.remove(a);
        assert!(matches!(
            scene.add_child(a, SceneNode::new("b")),
            Err(SceneError::MissingNode(_))
        ));
    }

    #[test]
    fn test_world_transform_composes_parents() {
        let mut scene = SceneGraph::new();
        let rig = scene.add(
            SceneNode::new("a-entity")
                .with_transform(Transform::from_translation(Vector3::new(1.0, 0.0, 0.0))),
        );
        let head = scene
            .add_child(
                rig,
                SceneNode::new("a-camera")
                    .with_transform(Transform::from_translation(Vector3::new(0.0, 1.6, 0.0))),
            )
            .unwrap();

        let origin = scene.world_transform(head).unwrap() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin, Vector4::new(1.0, 1.6, 0.0, 1.0));
    }

    #[test]
    fn test_find_by_id() {
        let mut scene = SceneGraph::new();
        let rig = scene.add(SceneNode::new("a-entity").with_id("rig"));
        assert_eq!(scene.find_by_id("rig"), Some(rig));
        assert_eq!(scene.find_by_id("nope"), None);
    }
}
