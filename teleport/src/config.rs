use std::path::Path;
use std::time::Duration;

use cgmath::{Deg, InnerSpace, Vector3};
use serde::{Deserialize, Serialize};

use crate::selector::Selector;
use crate::TeleportError;

/// Button that arms and confirms a controller teleport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeleportButton {
    Trigger,
    Squeeze,
    Pinch,
}

/// Options of one navigation component instance, read from TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleportConfig {
    /// Entity moved by teleports. Empty means the camera head moves itself.
    pub camera_rig: String,
    pub camera_head: String,
    pub collision_entities: String,
    pub ignore_entities: String,
    /// Degrees.
    pub landing_max_angle: f32,
    pub landing_normal: Vector3<f32>,
    /// Transition progress per millisecond.
    pub transition_speed: f32,
    pub cursor_color: String,
    pub cursor_opacity: f32,
    pub align_to_surface: bool,
    pub rotation_smoothing: f32,
    pub hover_interval_ms: u64,
    pub registry_refresh_ms: u64,
    pub reference_retry_ms: u64,
    pub button: TeleportButton,
    pub trigger_threshold: f32,
    /// Vertical field of view used for pointer rays, degrees.
    pub camera_fov: f32,
    pub debug: bool,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        TeleportConfig {
            camera_rig: String::new(),
            camera_head: "[camera]".to_string(),
            collision_entities: "[navmesh]".to_string(),
            ignore_entities: String::new(),
            landing_max_angle: 45.0,
            landing_normal: Vector3::new(0.0, 1.0, 0.0),
            transition_speed: 0.0006,
            cursor_color: "#4d93fd".to_string(),
            cursor_opacity: 1.0,
            align_to_surface: false,
            rotation_smoothing: 1.0,
            hover_interval_ms: 16,
            registry_refresh_ms: 5000,
            reference_retry_ms: 250,
            button: TeleportButton::Trigger,
            trigger_threshold: 0.5,
            camera_fov: 80.0,
            debug: false,
        }
    }
}

impl TeleportConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, TeleportError> {
        let config: TeleportConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, TeleportError> {
        let source = std::fs::read_to_string(path).map_err(|source| TeleportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Reject values the navigation code cannot run with.
    pub fn validate(&self) -> Result<(), TeleportError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(TeleportError::InvalidConfig {
                field,
                reason: reason.to_string(),
            })
        };

        if !(self.transition_speed.is_finite() && self.transition_speed > 0.0) {
            return invalid("transition_speed", "must be a positive number");
        }
        if !(0.0..=180.0).contains(&self.landing_max_angle) {
            return invalid("landing_max_angle", "must be between 0 and 180 degrees");
        }
        if !(self.landing_normal.magnitude2() > f32::EPSILON) {
            return invalid("landing_normal", "must not be the zero vector");
        }
        if !(0.0..=1.0).contains(&self.cursor_opacity) {
            return invalid("cursor_opacity", "must be between 0 and 1");
        }
        if !(self.rotation_smoothing.is_finite() && self.rotation_smoothing > 0.0) {
            return invalid("rotation_smoothing", "must be a positive number");
        }
        // A zero threshold would report a resting trigger as pressed.
        if !(self.trigger_threshold > 0.0 && self.trigger_threshold <= 1.0) {
            return invalid("trigger_threshold", "must be greater than 0 and at most 1");
        }
        if !(self.camera_fov > 0.0 && self.camera_fov < 180.0) {
            return invalid("camera_fov", "must be between 0 and 180 degrees");
        }

        parse_color(&self.cursor_color)?;
        for selector in [
            &self.camera_rig,
            &self.camera_head,
            &self.collision_entities,
            &self.ignore_entities,
        ] {
            Selector::parse(selector)?;
        }
        Ok(())
    }

    pub fn landing_max_angle(&self) -> Deg<f32> {
        Deg(self.landing_max_angle)
    }

    pub fn landing_normal(&self) -> Vector3<f32> {
        self.landing_normal.normalize()
    }

    pub fn hover_interval(&self) -> Duration {
        Duration::from_millis(self.hover_interval_ms)
    }

    pub fn registry_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.registry_refresh_ms)
    }

    pub fn reference_retry_delay(&self) -> Duration {
        Duration::from_millis(self.reference_retry_ms)
    }
}

/// `#rgb` / `#rrggbb` to linear 0..1 components.
pub fn parse_color(color: &str) -> Result<Vector3<f32>, TeleportError> {
    let invalid = || TeleportError::InvalidColor(color.to_string());
    let hex = color.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |digits: &str| u8::from_str_radix(digits, 16).map(|v| v as f32 / 255.0);
    let components = match hex.len() {
        3 => hex
            .chars()
            .map(|c| channel(&c.to_string().repeat(2)))
            .collect::<Result<Vec<_>, _>>(),
        6 => (0..3)
            .map(|i| channel(&hex[i * 2..i * 2 + 2]))
            .collect::<Result<Vec<_>, _>>(),
        _ => return Err(invalid()),
    }
    .map_err(|_| invalid())?;

    Ok(Vector3::new(components[0], components[1], components[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TeleportConfig::default();
        assert_eq!(config.landing_max_angle, 45.0);
        assert_eq!(config.collision_entities, "[navmesh]");
        assert_eq!(config.button, TeleportButton::Trigger);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TeleportConfig::from_toml_str(
            r##"
            camera_rig = "#rig"
            landing_max_angle = 30.0
            landing_normal = { x = 0.0, y = 2.0, z = 0.0 }
            button = "squeeze"
            "##,
        )
        .unwrap();

        assert_eq!(config.camera_rig, "#rig");
        assert_eq!(config.landing_max_angle, 30.0);
        assert_eq!(config.landing_normal(), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(config.button, TeleportButton::Squeeze);
        assert_eq!(config.transition_speed, 0.0006);
    }

    #[test]
    fn test_validation_failures() {
        let cases: Vec<(&str, TeleportConfig)> = vec![
            ("transition_speed", TeleportConfig { transition_speed: 0.0, ..Default::default() }),
            ("landing_max_angle", TeleportConfig { landing_max_angle: 200.0, ..Default::default() }),
            ("landing_normal", TeleportConfig { landing_normal: Vector3::new(0.0, 0.0, 0.0), ..Default::default() }),
            ("cursor_opacity", TeleportConfig { cursor_opacity: 1.5, ..Default::default() }),
            ("rotation_smoothing", TeleportConfig { rotation_smoothing: -1.0, ..Default::default() }),
            ("trigger_threshold", TeleportConfig { trigger_threshold: 0.0, ..Default::default() }),
            ("trigger_threshold", TeleportConfig { trigger_threshold: f32::NAN, ..Default::default() }),
        ];

        for (expected, config) in cases {
            match config.validate() {
                Err(TeleportError::InvalidConfig { field, .. }) => assert_eq!(field, expected),
                other => panic!("{expected}: unexpected {other:?}"),
            }
        }

        let bad_selector = TeleportConfig {
            ignore_entities: "a b".to_string(),
            ..Default::default()
        };
        assert!(matches!(bad_selector.validate(), Err(TeleportError::InvalidSelector { .. })));
    }

    #[test]
    fn test_unknown_key_types_are_rejected() {
        assert!(matches!(
            TeleportConfig::from_toml_str("landing_max_angle = \"steep\""),
            Err(TeleportError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ffffff").unwrap(), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(parse_color("#f00").unwrap(), Vector3::new(1.0, 0.0, 0.0));
        let blue = parse_color("#4d93fd").unwrap();
        assert!((blue.x - 77.0 / 255.0).abs() < 1e-6);
        assert!((blue.z - 253.0 / 255.0).abs() < 1e-6);

        for bad in ["4d93fd", "#12", "#gggggg", "#1234567"] {
            assert!(matches!(parse_color(bad), Err(TeleportError::InvalidColor(_))), "{bad}");
        }
    }
}
