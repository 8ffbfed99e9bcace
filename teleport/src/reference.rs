//! Late-binding references to scene entities (camera head, camera rig).
//!
//! Entities may not exist yet when navigation starts. A lookup that fails
//! gets a bounded number of delayed retries and then settles in a terminal
//! `Unavailable` state for the rest of the session.
use std::time::Duration;

use engine::scene::{NodeId, SceneGraph};

use crate::selector::Selector;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn once_after(delay: Duration) -> Self {
        Self {
            max_retries: 1,
            delay,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceState {
    Unresolved,
    Pending { retries_used: u32, retry_at: Duration },
    Resolved(NodeId),
    Unavailable,
}

#[derive(Clone, Debug)]
pub struct ReferenceSlot {
    label: &'static str,
    selector: Selector,
    state: ReferenceState,
}

impl ReferenceSlot {
    pub fn new(label: &'static str, selector: Selector) -> Self {
        Self {
            label,
            selector,
            state: ReferenceState::Unresolved,
        }
    }

    /// First lookup. Schedules a retry on failure.
    pub fn resolve(
        &mut self,
        scene: &SceneGraph,
        now: Duration,
        policy: &RetryPolicy,
        debug: bool,
    ) -> Option<NodeId> {
        self.attempt(scene, now, policy, 0, debug)
    }

    /// Run a scheduled retry if it is due. Cheap when nothing is pending.
    pub fn poll(
        &mut self,
        scene: &SceneGraph,
        now: Duration,
        policy: &RetryPolicy,
        debug: bool,
    ) -> Option<NodeId> {
        match self.state {
            ReferenceState::Pending {
                retries_used,
                retry_at,
            } if now >= retry_at => self.attempt(scene, now, policy, retries_used + 1, debug),
            _ => self.node(),
        }
    }

    fn attempt(
        &mut self,
        scene: &SceneGraph,
        now: Duration,
        policy: &RetryPolicy,
        retries_used: u32,
        debug: bool,
    ) -> Option<NodeId> {
        if let Some(node) = self.lookup(scene) {
            self.state = ReferenceState::Resolved(node);
            return Some(node);
        }

        self.state = if retries_used < policy.max_retries {
            ReferenceState::Pending {
                retries_used,
                retry_at: now + policy.delay,
            }
        } else {
            verbose!(
                debug,
                "{} '{}' not found after {} retries; disabled for this session",
                self.label,
                self.selector,
                retries_used
            );
            ReferenceState::Unavailable
        };
        None
    }

    fn lookup(&self, scene: &SceneGraph) -> Option<NodeId> {
        scene
            .walk()
            .find(|(_, node)| self.selector.matches(node))
            .map(|(id, _)| id)
    }

    pub fn node(&self) -> Option<NodeId> {
        match self.state {
            ReferenceState::Resolved(node) => Some(node),
            _ => None,
        }
    }

    pub fn state(&self) -> ReferenceState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = ReferenceState::Unresolved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::scene::SceneNode;

    fn camera_slot() -> ReferenceSlot {
        ReferenceSlot::new("camera head", Selector::parse("[camera]").unwrap())
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::once_after(Duration::from_millis(250))
    }

    #[test]
    fn test_resolves_immediately() {
        let mut scene = SceneGraph::new();
        let camera = scene.add(SceneNode::new("a-entity").with_attribute("camera", ""));

        let mut slot = camera_slot();
        assert_eq!(slot.resolve(&scene, Duration::ZERO, &policy(), false), Some(camera));
        assert_eq!(slot.state(), ReferenceState::Resolved(camera));
    }

    #[test]
    fn test_late_entity_found_on_retry() {
        let mut scene = SceneGraph::new();
        let mut slot = camera_slot();
        assert_eq!(slot.resolve(&scene, Duration::ZERO, &policy(), false), None);

        let camera = scene.add(SceneNode::new("a-entity").with_attribute("camera", ""));
        // Not due yet.
        assert_eq!(slot.poll(&scene, Duration::from_millis(100), &policy(), false), None);
        assert_eq!(slot.poll(&scene, Duration::from_millis(250), &policy(), false), Some(camera));
    }

    #[test]
    fn test_gives_up_after_one_retry() {
        let mut scene = SceneGraph::new();
        let mut slot = camera_slot();
        slot.resolve(&scene, Duration::ZERO, &policy(), true);
        slot.poll(&scene, Duration::from_millis(300), &policy(), true);
        assert_eq!(slot.state(), ReferenceState::Unavailable);

        // Terminal: appearing later does not help.
        scene.add(SceneNode::new("a-entity").with_attribute("camera", ""));
        assert_eq!(slot.poll(&scene, Duration::from_secs(10), &policy(), true), None);
        assert_eq!(slot.state(), ReferenceState::Unavailable);
    }
}
