use cgmath::Matrix4;
use engine::scene::{Pose, Ray};

use crate::config::TeleportButton;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn name(self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        }
    }
}

/// One tracked hand or controller for a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandInput {
    /// World pose of the controller; the pointing direction is local -Z.
    pub pose: Pose,
    pub trigger: f32,
    pub squeeze: f32,
    pub pinching: bool,
}

impl HandInput {
    pub fn at(pose: Pose) -> Self {
        Self {
            pose,
            trigger: 0.0,
            squeeze: 0.0,
            pinching: false,
        }
    }

    fn button_value(&self, button: TeleportButton) -> f32 {
        match button {
            TeleportButton::Trigger => self.trigger,
            TeleportButton::Squeeze => self.squeeze,
            TeleportButton::Pinch => {
                if self.pinching {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Both hands; a hand that lost tracking is `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandsInput {
    pub left: Option<HandInput>,
    pub right: Option<HandInput>,
}

impl HandsInput {
    pub fn get(&self, hand: Handedness) -> Option<&HandInput> {
        match hand {
            Handedness::Left => self.left.as_ref(),
            Handedness::Right => self.right.as_ref(),
        }
    }
}

/// Per-hand button tracking.
#[derive(Clone, Copy, Debug, Default)]
pub struct PinchHandState {
    pub is_active: bool,
    pub was_pressed: bool,
    pub ray: Option<Ray>,
}

/// Button transitions produced by `PinchAdapter::update`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PinchEdge {
    Started(Handedness, Ray),
    Released(Handedness, Ray),
    /// The hand lost tracking while held; nothing is committed.
    Cancelled(Handedness),
}

pub struct PinchAdapter {
    button: TeleportButton,
    threshold: f32,
    left: PinchHandState,
    right: PinchHandState,
}

impl PinchAdapter {
    pub fn new(button: TeleportButton, threshold: f32) -> Self {
        Self {
            button,
            threshold,
            left: PinchHandState::default(),
            right: PinchHandState::default(),
        }
    }

    pub fn update(&mut self, hands: &HandsInput) -> Vec<PinchEdge> {
        let mut edges = Vec::new();
        for hand in [Handedness::Left, Handedness::Right] {
            if let Some(edge) = self.update_hand(hand, hands.get(hand)) {
                edges.push(edge);
            }
        }
        edges
    }

    fn update_hand(&mut self, hand: Handedness, input: Option<&HandInput>) -> Option<PinchEdge> {
        let (button, threshold) = (self.button, self.threshold);
        let state = self.state_mut(hand);

        let Some(input) = input else {
            let was_active = state.is_active;
            *state = PinchHandState::default();
            return was_active.then_some(PinchEdge::Cancelled(hand));
        };

        let is_pressed = input.button_value(button) >= threshold;
        let just_pressed = is_pressed && !state.was_pressed;
        let just_released = !is_pressed && state.was_pressed;
        state.was_pressed = is_pressed;

        let ray = hand_ray(&input.pose);
        if is_pressed {
            state.ray = Some(ray);
        }

        if just_pressed {
            state.is_active = true;
            return Some(PinchEdge::Started(hand, ray));
        }

        if just_released && state.is_active {
            state.is_active = false;
            state.ray = None;
            return Some(PinchEdge::Released(hand, ray));
        }

        None
    }

    /// Hand currently holding the button, left first.
    pub fn active_hand(&self) -> Option<Handedness> {
        if self.left.is_active {
            Some(Handedness::Left)
        } else if self.right.is_active {
            Some(Handedness::Right)
        } else {
            None
        }
    }

    /// Latest pointing ray of a held hand.
    pub fn ray(&self, hand: Handedness) -> Option<Ray> {
        let state = self.state(hand);
        if state.is_active {
            state.ray
        } else {
            None
        }
    }

    pub fn state(&self, hand: Handedness) -> &PinchHandState {
        match hand {
            Handedness::Left => &self.left,
            Handedness::Right => &self.right,
        }
    }

    fn state_mut(&mut self, hand: Handedness) -> &mut PinchHandState {
        match hand {
            Handedness::Left => &mut self.left,
            Handedness::Right => &mut self.right,
        }
    }

    pub fn reset(&mut self) {
        self.left = PinchHandState::default();
        self.right = PinchHandState::default();
    }
}

/// Pointing ray of a controller pose.
pub fn hand_ray(pose: &Pose) -> Ray {
    let world = Matrix4::from_translation(pose.position) * Matrix4::from(pose.orientation);
    Ray::from_transform(&world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, InnerSpace, Quaternion, Rotation3, Vector3};

    fn hand(trigger: f32) -> HandInput {
        HandInput {
            trigger,
            ..HandInput::at(Pose::at(Vector3::new(0.2, 1.2, 0.0)))
        }
    }

    fn right(input: HandInput) -> HandsInput {
        HandsInput {
            left: None,
            right: Some(input),
        }
    }

    #[test]
    fn test_press_and_release_edges() {
        let mut adapter = PinchAdapter::new(TeleportButton::Trigger, 0.5);

        assert!(adapter.update(&right(hand(0.2))).is_empty());

        let edges = adapter.update(&right(hand(0.6)));
        assert!(matches!(edges.as_slice(), [PinchEdge::Started(Handedness::Right, _)]));
        assert_eq!(adapter.active_hand(), Some(Handedness::Right));

        // Held: no further edges.
        assert!(adapter.update(&right(hand(0.9))).is_empty());
        assert!(adapter.ray(Handedness::Right).is_some());

        let edges = adapter.update(&right(hand(0.1)));
        assert!(matches!(edges.as_slice(), [PinchEdge::Released(Handedness::Right, _)]));
        assert_eq!(adapter.active_hand(), None);
        assert_eq!(adapter.ray(Handedness::Right), None);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut adapter = PinchAdapter::new(TeleportButton::Trigger, 0.5);
        assert_eq!(adapter.update(&right(hand(0.5))).len(), 1);
    }

    #[test]
    fn test_configured_button_is_the_only_one_read() {
        let mut adapter = PinchAdapter::new(TeleportButton::Squeeze, 0.5);
        assert!(adapter.update(&right(hand(1.0))).is_empty());

        let squeezed = HandInput {
            squeeze: 0.8,
            ..hand(0.0)
        };
        assert_eq!(adapter.update(&right(squeezed)).len(), 1);

        let mut pinch = PinchAdapter::new(TeleportButton::Pinch, 0.5);
        let pinching = HandInput {
            pinching: true,
            ..hand(0.0)
        };
        assert!(matches!(
            pinch.update(&right(pinching)).as_slice(),
            [PinchEdge::Started(Handedness::Right, _)]
        ));
    }

    #[test]
    fn test_lost_tracking_cancels_held_hand() {
        let mut adapter = PinchAdapter::new(TeleportButton::Trigger, 0.5);
        adapter.update(&right(hand(1.0)));

        let edges = adapter.update(&HandsInput::default());
        assert_eq!(edges, vec![PinchEdge::Cancelled(Handedness::Right)]);
        assert_eq!(adapter.active_hand(), None);

        // Tracking returns with the button still down: a fresh start.
        let edges = adapter.update(&right(hand(1.0)));
        assert!(matches!(edges.as_slice(), [PinchEdge::Started(Handedness::Right, _)]));
    }

    #[test]
    fn test_hands_are_independent() {
        let mut adapter = PinchAdapter::new(TeleportButton::Trigger, 0.5);
        let both = HandsInput {
            left: Some(hand(1.0)),
            right: Some(hand(1.0)),
        };
        let edges = adapter.update(&both);
        assert_eq!(edges.len(), 2);
        assert_eq!(adapter.active_hand(), Some(Handedness::Left));

        let left_released = HandsInput {
            left: Some(hand(0.0)),
            right: Some(hand(1.0)),
        };
        let edges = adapter.update(&left_released);
        assert!(matches!(edges.as_slice(), [PinchEdge::Released(Handedness::Left, _)]));
        assert_eq!(adapter.active_hand(), Some(Handedness::Right));
    }

    #[test]
    fn test_hand_ray_points_along_rotated_forward() {
        let pose = Pose::new(Vector3::new(0.0, 1.0, 0.0), Quaternion::from_angle_x(Deg(-90.0)));
        let ray = hand_ray(&pose);

        assert_eq!(ray.origin, Vector3::new(0.0, 1.0, 0.0));
        assert!((ray.direction - Vector3::new(0.0, -1.0, 0.0)).magnitude() < 1e-5);
    }
}
