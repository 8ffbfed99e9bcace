use cgmath::{InnerSpace, One, Quaternion, Vector3};

use crate::config::{parse_color, TeleportConfig};
use crate::hit_resolver::Landing;
use crate::input::Handedness;
use crate::TeleportError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TeleportVisualStyle {
    pub cursor_color: Vector3<f32>,
    pub cursor_opacity: f32,
    pub ring_color: Vector3<f32>,
    /// Lift along the surface normal so the disc does not z-fight the floor.
    pub landing_height_offset: f32,
}

impl Default for TeleportVisualStyle {
    fn default() -> Self {
        Self {
            cursor_color: Vector3::new(77.0 / 255.0, 147.0 / 255.0, 253.0 / 255.0),
            cursor_opacity: 1.0,
            ring_color: Vector3::new(1.0, 1.0, 1.0),
            landing_height_offset: 0.02,
        }
    }
}

impl TeleportVisualStyle {
    pub fn from_config(config: &TeleportConfig) -> Result<Self, TeleportError> {
        Ok(Self {
            cursor_color: parse_color(&config.cursor_color)?,
            cursor_opacity: config.cursor_opacity,
            ..Self::default()
        })
    }
}

/// Disc drawn where a click would land.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandingIndicator {
    pub visible: bool,
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub color: Vector3<f32>,
    pub opacity: f32,
}

impl LandingIndicator {
    pub fn new(style: &TeleportVisualStyle) -> Self {
        Self {
            visible: false,
            position: Vector3::new(0.0, 0.0, 0.0),
            orientation: Quaternion::one(),
            color: style.cursor_color,
            opacity: style.cursor_opacity,
        }
    }

    /// Place the disc on `landing`, its up axis along the surface normal.
    pub fn show(&mut self, landing: &Landing, style: &TeleportVisualStyle) {
        self.visible = true;
        self.position = landing.point + landing.normal * style.landing_height_offset;
        self.orientation =
            Quaternion::from_arc(Vector3::new(0.0, 1.0, 0.0), landing.normal.normalize(), None);
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// Ring shown under a hand's aim while its teleport button is held.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingIndicator {
    pub visible: bool,
    pub position: Vector3<f32>,
    pub hand: Option<Handedness>,
    /// Whether the last release of a hold started a teleport.
    pub committed: bool,
}

impl Default for RingIndicator {
    fn default() -> Self {
        Self {
            visible: false,
            position: Vector3::new(0.0, 0.0, 0.0),
            hand: None,
            committed: false,
        }
    }
}

impl RingIndicator {
    pub fn hold(&mut self, hand: Handedness, landing: Option<&Landing>) {
        self.hand = Some(hand);
        self.committed = false;
        match landing {
            Some(landing) => {
                self.visible = true;
                self.position = landing.point;
            }
            None => self.visible = false,
        }
    }

    pub fn release(&mut self, committed: bool) {
        self.visible = false;
        self.committed = committed;
        self.hand = None;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.hand = None;
    }
}
