use std::time::Duration;

use cgmath::{InnerSpace, Quaternion, Vector3, VectorSpace};
use engine::scene::Pose;

/// Notifications for collaborators such as the tunnel effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NavigationEvent {
    Start { from: Pose, to: Pose },
    End { pose: Pose },
}

impl NavigationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NavigationEvent::Start { .. } => "navigation-start",
            NavigationEvent::End { .. } => "navigation-end",
        }
    }
}

/// Symmetric quadratic ease in/out on [0, 1].
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// End orientation for a landing. With surface alignment the rig's current up
/// is turned onto the landing normal, keeping its heading; otherwise the
/// orientation does not change.
pub fn landing_orientation(
    start: Quaternion<f32>,
    landing_normal: Vector3<f32>,
    reference_up: Vector3<f32>,
    align_to_surface: bool,
) -> Quaternion<f32> {
    if !align_to_surface {
        return start;
    }
    let rig_up = (start * reference_up).normalize();
    Quaternion::from_arc(rig_up, landing_normal.normalize(), None) * start
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveTransition {
    pub progress: f32,
    pub start: Pose,
    pub end: Pose,
}

impl ActiveTransition {
    fn pose_at(&self, rotation_smoothing: f32) -> Pose {
        let eased = ease_in_out_quad(self.progress);
        let rotation_progress = (eased * rotation_smoothing).min(1.0);
        Pose {
            position: self.start.position.lerp(self.end.position, eased),
            orientation: self
                .start
                .orientation
                .slerp(self.end.orientation, rotation_progress),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionState {
    Idle,
    Transitioning(ActiveTransition),
}

/// What a frame of the transition produced for the rig.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionStep {
    Idle,
    Moving(Pose),
    /// Exact end pose; the transition is over.
    Finished(Pose),
}

/// Time based rig interpolation. Progress grows by `delta_ms * speed` each
/// frame regardless of distance, so every teleport takes `1 / speed` ms.
#[derive(Clone, Debug)]
pub struct TransitionController {
    speed: f32,
    rotation_smoothing: f32,
    state: TransitionState,
}

impl TransitionController {
    pub fn new(speed: f32, rotation_smoothing: f32) -> Self {
        Self {
            speed,
            rotation_smoothing,
            state: TransitionState::Idle,
        }
    }

    /// Begin moving from `from` to `to`. An in-flight transition is replaced;
    /// callers pass the rig's current pose so there is no jump back.
    pub fn start(&mut self, from: Pose, to: Pose) -> NavigationEvent {
        self.state = TransitionState::Transitioning(ActiveTransition {
            progress: 0.0,
            start: from,
            end: to,
        });
        NavigationEvent::Start { from, to }
    }

    pub fn tick(&mut self, delta: Duration) -> TransitionStep {
        let TransitionState::Transitioning(active) = &mut self.state else {
            return TransitionStep::Idle;
        };

        let delta_ms = delta.as_secs_f32() * 1000.0;
        active.progress = (active.progress + delta_ms * self.speed).min(1.0);

        if active.progress >= 1.0 {
            let end = active.end;
            self.state = TransitionState::Idle;
            return TransitionStep::Finished(end);
        }
        TransitionStep::Moving(active.pose_at(self.rotation_smoothing))
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, TransitionState::Transitioning(_))
    }

    pub fn progress(&self) -> Option<f32> {
        match &self.state {
            TransitionState::Transitioning(active) => Some(active.progress),
            TransitionState::Idle => None,
        }
    }

    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    /// Drop any in-flight transition without snapping.
    pub fn reset(&mut self) {
        self.state = TransitionState::Idle;
    }
}
