use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use cgmath::{InnerSpace, Quaternion, Vector2, Vector3};
use cursor_teleport::{
    CursorTeleport, FrameTime, HandInput, HandsInput, HitResolver, NavigationEvent, PositionStore,
    RaycastRegistry, Selector, TeleportConfig,
};
use engine::scene::{Pose, Ray, SceneDescription, SceneGraph, Viewport};
use tracing::{info, warn};

use crate::InputKind;

pub struct SimulateOptions {
    pub input: InputKind,
    pub pointer: Option<Vector2<f32>>,
    pub origin: Option<Vector3<f32>>,
    pub direction: Vector3<f32>,
    pub viewport: Vector2<f32>,
    pub frame_ms: u64,
    pub max_frames: usize,
    pub store: PathBuf,
    pub restore: Option<String>,
    pub save: Option<String>,
    pub verbose: bool,
}

fn load_scene(path: &Path) -> Result<SceneGraph> {
    let description = SceneDescription::load(path)
        .with_context(|| format!("Failed to load scene {}", path.display()))?;
    let scene = description.build();
    info!("Loaded scene with {} nodes", scene.len());
    Ok(scene)
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<TeleportConfig> {
    let mut config = match path {
        Some(path) => TeleportConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TeleportConfig::default(),
    };
    config.debug |= verbose;
    config.validate().context("Invalid teleport config")?;
    Ok(config)
}

pub fn probe(
    scene_path: &Path,
    config_path: Option<&Path>,
    origin: Vector3<f32>,
    direction: Vector3<f32>,
    collidable_only: bool,
    verbose: bool,
) -> Result<()> {
    let scene = load_scene(scene_path)?;
    let config = load_config(config_path, verbose)?;

    let mut registry = RaycastRegistry::new(
        Selector::parse(&config.collision_entities)?,
        Selector::parse(&config.ignore_entities)?,
    );
    let report = registry.rebuild(&scene, Duration::ZERO);
    info!(
        "{} collidable surfaces, {} meshes tested for occlusion",
        report.collidable, report.scene_meshes
    );

    let resolver = HitResolver::new(config.landing_normal(), config.landing_max_angle());
    let ray = Ray::new(origin, ray_direction(direction)?);
    let landing = if collidable_only {
        resolver.resolve_collidable(&ray, &registry, &scene)
    } else {
        resolver.resolve(&ray, &registry, &scene)
    };

    match landing {
        Some(landing) => println!(
            "landing point={} normal={}",
            fmt_vec(landing.point),
            fmt_vec(landing.normal)
        ),
        None => println!("no landing"),
    }
    Ok(())
}

pub fn simulate(scene_path: &Path, config_path: Option<&Path>, options: &SimulateOptions) -> Result<()> {
    let mut scene = load_scene(scene_path)?;
    let config = load_config(config_path, options.verbose)?;
    let store = PositionStore::new(&options.store);

    let direction = ray_direction(options.direction)?;
    let viewport = Viewport::new(options.viewport.x, options.viewport.y);
    let mut teleport = CursorTeleport::new(config, viewport)?;
    let frame = Duration::from_millis(options.frame_ms.max(1));
    let mut now = Duration::ZERO;
    teleport.init(&scene, now);

    if let Some(key) = &options.restore {
        match store.load(key)? {
            Some(pose) => teleport
                .place_rig(&mut scene, pose)
                .with_context(|| format!("Failed to restore position '{key}'"))?,
            None => warn!("No saved position named '{}'", key),
        }
    }

    let started = match options.input {
        InputKind::Mouse => {
            let Some(pointer) = options.pointer else {
                bail!("--pointer is required for mouse input");
            };
            teleport.on_mouse_move(pointer);
            now += frame;
            teleport.tick(&mut scene, FrameTime::new(now, frame));
            teleport.on_mouse_down(&scene, pointer);
            teleport.on_mouse_up(&scene, pointer)
        }
        InputKind::Cursor => {
            let ray = options.origin.map(|origin| Ray::new(origin, direction));
            teleport.enter_vr();
            teleport.on_cursor_click(&scene, ray)
        }
        InputKind::Hand => {
            let Some(origin) = options.origin else {
                bail!("--origin is required for hand input");
            };
            teleport.enter_vr();
            let pose = Pose::new(origin, aim_along(direction));
            let pressed = HandInput {
                trigger: 1.0,
                squeeze: 1.0,
                pinching: true,
                ..HandInput::at(pose)
            };
            teleport.update_hands(&scene, &right_hand(pressed));
            now += frame;
            teleport.tick(&mut scene, FrameTime::new(now, frame));
            teleport.update_hands(&scene, &right_hand(HandInput::at(pose)))
        }
    };

    if !started {
        println!("no landing; rig stays put");
    }

    let mut frames = 0;
    while teleport.is_transitioning() {
        if frames >= options.max_frames {
            bail!("teleport did not finish within {} frames", options.max_frames);
        }
        now += frame;
        teleport.tick(&mut scene, FrameTime::new(now, frame));
        frames += 1;
    }

    for event in teleport.drain_events() {
        match event {
            NavigationEvent::Start { from, to } => println!(
                "{} from={} to={}",
                event.name(),
                fmt_vec(from.position),
                fmt_vec(to.position)
            ),
            NavigationEvent::End { pose } => {
                println!("{} at={}", event.name(), fmt_vec(pose.position))
            }
        }
    }

    let pose = teleport
        .rig_pose(&scene)
        .context("Camera rig not found in scene")?;
    println!(
        "rig position={} after {} frames ({} ms)",
        fmt_vec(pose.position),
        frames,
        now.as_millis()
    );

    if let Some(key) = &options.save {
        store
            .save(key, pose)
            .with_context(|| format!("Failed to save position to {}", store.path().display()))?;
        info!("Saved rig position as '{}'", key);
    }

    teleport.teardown();
    Ok(())
}

fn right_hand(input: HandInput) -> HandsInput {
    HandsInput {
        left: None,
        right: Some(input),
    }
}

/// Orientation whose forward (-Z) points along `direction`.
fn aim_along(direction: Vector3<f32>) -> Quaternion<f32> {
    Quaternion::from_arc(Vector3::new(0.0, 0.0, -1.0), direction.normalize(), None)
}

fn ray_direction(direction: Vector3<f32>) -> Result<Vector3<f32>> {
    if direction.magnitude2() < 1e-12 {
        bail!("ray direction must not be zero");
    }
    Ok(direction)
}

fn fmt_vec(v: Vector3<f32>) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Rotation;

    #[test]
    fn test_aim_along_points_forward_at_direction() {
        let rotation = aim_along(Vector3::new(0.0, -1.0, 0.0));
        let forward = rotation.rotate_vector(Vector3::new(0.0, 0.0, -1.0));
        assert!((forward - Vector3::new(0.0, -1.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_zero_direction_is_rejected() {
        assert!(ray_direction(Vector3::new(0.0, 0.0, 0.0)).is_err());
        assert!(ray_direction(Vector3::new(0.0, -2.0, 0.0)).is_ok());
    }
}
