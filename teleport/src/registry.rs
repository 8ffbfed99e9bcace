use std::collections::{HashMap, HashSet};
use std::time::Duration;

use bitflags::bitflags;
use engine::scene::{NodeId, SceneGraph};

use crate::selector::Selector;

/// Attribute marking an entity as a landing surface.
pub const NAVMESH_ATTRIBUTE: &str = "navmesh";
/// Attribute marking an entity as see-through for teleport rays.
pub const RAYCAST_EXCLUDE_ATTRIBUTE: &str = "raycast-exclude";

bitflags! {
    pub struct SurfaceFlags: u8 {
        const NAVMESH = 0b001;
        const COLLIDABLE = 0b010;
        const RAYCAST_EXCLUDE = 0b100;
    }
}

/// A mesh node the teleport ray may hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceHandle {
    pub node: NodeId,
    pub flags: SurfaceFlags,
}

impl SurfaceHandle {
    pub fn is_landing_surface(&self) -> bool {
        self.flags
            .contains(SurfaceFlags::NAVMESH | SurfaceFlags::COLLIDABLE)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebuildReport {
    pub collidable: usize,
    pub scene_meshes: usize,
    /// Navigation was possible before this rebuild and no longer is.
    pub exhausted: bool,
}

/// Snapshot of which scene meshes block rays and which can be landed on.
///
/// The snapshot is only as fresh as the last [`rebuild`](Self::rebuild);
/// same-frame scene edits are not seen until the next one.
#[derive(Debug)]
pub struct RaycastRegistry {
    collision_selector: Selector,
    ignore_selector: Selector,
    surfaces: Vec<SurfaceHandle>,
    index: HashMap<NodeId, usize>,
    last_rebuild: Option<Duration>,
}

impl RaycastRegistry {
    pub fn new(collision_selector: Selector, ignore_selector: Selector) -> Self {
        Self {
            collision_selector,
            ignore_selector,
            surfaces: Vec::new(),
            index: HashMap::new(),
            last_rebuild: None,
        }
    }

    /// Re-walk the scene at host time `now`. The time starts the next
    /// [`refresh_if_due`](Self::refresh_if_due) interval.
    pub fn rebuild(&mut self, scene: &SceneGraph, now: Duration) -> RebuildReport {
        self.last_rebuild = Some(now);
        let previous_collidable = self.collidable().count();

        // Subtrees that never block: explicitly excluded or matched by the ignore selector.
        let mut passthrough = HashSet::new();
        let mut hidden = HashSet::new();
        for (id, node) in scene.walk() {
            if node.has_attribute(RAYCAST_EXCLUDE_ATTRIBUTE) || self.ignore_selector.matches(node) {
                passthrough.extend(scene.descendants(id).map(|(id, _)| id));
            }
            if !node.visible {
                hidden.extend(scene.descendants(id).map(|(id, _)| id));
            }
        }

        let mut flags: HashMap<NodeId, SurfaceFlags> = HashMap::new();
        for (id, node) in scene.walk() {
            if !self.collision_selector.matches(node) || passthrough.contains(&id) {
                continue;
            }
            for (mesh_id, _) in scene
                .descendants(id)
                .filter(|(mesh_id, mesh_node)| mesh_node.mesh.is_some() && !passthrough.contains(mesh_id))
            {
                flags.insert(mesh_id, SurfaceFlags::NAVMESH | SurfaceFlags::COLLIDABLE);
            }
        }

        self.surfaces.clear();
        self.index.clear();
        for (id, node) in scene.walk() {
            if node.mesh.is_none() {
                continue;
            }
            let surface_flags = match flags.get(&id) {
                Some(flags) => *flags,
                None if passthrough.contains(&id) => SurfaceFlags::RAYCAST_EXCLUDE,
                None => SurfaceFlags::empty(),
            };
            // Navmeshes stay hittable when invisible; plain geometry only blocks when drawn.
            if surface_flags.contains(SurfaceFlags::RAYCAST_EXCLUDE)
                || (surface_flags.is_empty() && hidden.contains(&id))
            {
                continue;
            }
            self.index.insert(id, self.surfaces.len());
            self.surfaces.push(SurfaceHandle {
                node: id,
                flags: surface_flags,
            });
        }

        let collidable = self.collidable().count();
        let report = RebuildReport {
            collidable,
            scene_meshes: self.surfaces.len(),
            exhausted: previous_collidable > 0 && collidable == 0,
        };

        if report.exhausted {
            tracing::error!(
                selector = %self.collision_selector,
                "no collidable surfaces left after rebuild; teleporting is impossible until they return"
            );
        }
        engine::raycast_log!(
            DEBUG,
            "registry rebuilt: {} collidable, {} scene meshes",
            report.collidable,
            report.scene_meshes
        );
        report
    }

    /// Rebuild if `interval` has passed since the last one.
    pub fn refresh_if_due(
        &mut self,
        scene: &SceneGraph,
        now: Duration,
        interval: Duration,
    ) -> Option<RebuildReport> {
        let due = match self.last_rebuild {
            Some(last) => now.saturating_sub(last) >= interval,
            None => true,
        };
        if !due {
            return None;
        }
        Some(self.rebuild(scene, now))
    }

    /// Every mesh a teleport ray is tested against for occlusion.
    pub fn scene_meshes(&self) -> &[SurfaceHandle] {
        &self.surfaces
    }

    pub fn collidable(&self) -> impl Iterator<Item = &SurfaceHandle> + '_ {
        self.surfaces
            .iter()
            .filter(|surface| surface.flags.contains(SurfaceFlags::COLLIDABLE))
    }

    pub fn surface(&self, node: NodeId) -> Option<&SurfaceHandle> {
        self.index.get(&node).and_then(|&i| self.surfaces.get(i))
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
        self.index.clear();
        self.last_rebuild = None;
    }
}
