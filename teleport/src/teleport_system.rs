use std::time::Duration;

use cgmath::{Deg, Matrix4, Vector2};
use engine::scene::{NodeId, PerspectiveCamera, Pose, Ray, SceneGraph, Viewport};
use engine::{input_log, navigation_log};

use crate::config::TeleportConfig;
use crate::hit_resolver::{HitResolver, Landing, LandingResolution};
use crate::hover_cache::{HoverCache, HoverSample, HoverSource};
use crate::input::{pointer_ray, GazeAdapter, HandsInput, InputMode, MouseAdapter, PinchAdapter, PinchEdge};
#[cfg(any(test, feature = "diagnostics"))]
use crate::reference::ReferenceState;
use crate::reference::{ReferenceSlot, RetryPolicy};
use crate::registry::{RaycastRegistry, RebuildReport};
use crate::selector::Selector;
use crate::teleport_ui::{LandingIndicator, RingIndicator, TeleportVisualStyle};
use crate::transition::{landing_orientation, NavigationEvent, TransitionController, TransitionStep};
use crate::tunnel::TunnelEffect;
use crate::TeleportError;

/// Host clock for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// Time since the session started.
    pub now: Duration,
    /// Time since the previous frame.
    pub delta: Duration,
}

impl FrameTime {
    pub fn new(now: Duration, delta: Duration) -> Self {
        Self { now, delta }
    }
}

/// Point-and-click navigation for one camera rig.
///
/// The host calls [`tick`](Self::tick) once per frame and forwards input
/// events to the `on_*` handlers in between. All state is single threaded and
/// owned here; the scene is borrowed per call.
pub struct CursorTeleport {
    config: TeleportConfig,
    registry: RaycastRegistry,
    resolver: HitResolver,
    transition: TransitionController,
    tunnel: TunnelEffect,
    hover: HoverCache,
    style: TeleportVisualStyle,
    indicator: LandingIndicator,
    ring: RingIndicator,
    mouse: MouseAdapter,
    gaze: GazeAdapter,
    pinch: PinchAdapter,
    camera_head: ReferenceSlot,
    camera_rig: Option<ReferenceSlot>,
    retry: RetryPolicy,
    camera: PerspectiveCamera,
    viewport: Viewport,
    mode: InputMode,
    now: Duration,
    events: Vec<NavigationEvent>,
}

impl CursorTeleport {
    pub fn new(config: TeleportConfig, viewport: Viewport) -> Result<Self, TeleportError> {
        config.validate()?;

        let registry = RaycastRegistry::new(
            Selector::parse(&config.collision_entities)?,
            Selector::parse(&config.ignore_entities)?,
        );
        let camera_head = ReferenceSlot::new("camera head", Selector::parse(&config.camera_head)?);
        let camera_rig = if config.camera_rig.trim().is_empty() {
            None
        } else {
            Some(ReferenceSlot::new("camera rig", Selector::parse(&config.camera_rig)?))
        };
        let style = TeleportVisualStyle::from_config(&config)?;

        Ok(Self {
            registry,
            resolver: HitResolver::new(config.landing_normal(), config.landing_max_angle()),
            transition: TransitionController::new(config.transition_speed, config.rotation_smoothing),
            tunnel: TunnelEffect::default(),
            hover: HoverCache::new(config.hover_interval()),
            indicator: LandingIndicator::new(&style),
            style,
            ring: RingIndicator::default(),
            mouse: MouseAdapter::default(),
            gaze: GazeAdapter::default(),
            pinch: PinchAdapter::new(config.button, config.trigger_threshold),
            camera_head,
            camera_rig,
            retry: RetryPolicy::once_after(config.reference_retry_delay()),
            camera: PerspectiveCamera::new(Deg(config.camera_fov), viewport.aspect()),
            viewport,
            mode: InputMode::Desktop,
            now: Duration::ZERO,
            events: Vec::new(),
            config,
        })
    }

    /// Look up the camera entities and take the first registry snapshot.
    pub fn init(&mut self, scene: &SceneGraph, now: Duration) -> RebuildReport {
        self.now = now;
        let debug = self.config.debug;
        self.camera_head.resolve(scene, now, &self.retry, debug);
        if let Some(rig) = self.camera_rig.as_mut() {
            rig.resolve(scene, now, &self.retry, debug);
        }
        let report = self.registry.rebuild(scene, now);
        navigation_log!(
            INFO,
            "teleport ready: {} collidable surfaces, rig {:?}",
            report.collidable,
            self.rig_node()
        );
        report
    }

    pub fn tick(&mut self, scene: &mut SceneGraph, frame: FrameTime) {
        self.now = frame.now;
        self.poll_references(scene);
        self.registry
            .refresh_if_due(scene, frame.now, self.config.registry_refresh_interval());

        match self.transition.tick(frame.delta) {
            TransitionStep::Idle => {}
            TransitionStep::Moving(pose) => self.write_rig_pose(scene, pose),
            TransitionStep::Finished(pose) => {
                self.write_rig_pose(scene, pose);
                let event = NavigationEvent::End { pose };
                self.tunnel.handle(&event);
                self.events.push(event);
                navigation_log!(INFO, "teleport finished at {:?}", pose.position);
            }
        }
        self.tunnel.tick(frame.delta);

        if self.transition.is_transitioning() {
            self.indicator.hide();
            return;
        }
        if self.hover.is_due(frame.now) {
            self.update_hover(scene);
        }
    }

    fn poll_references(&mut self, scene: &SceneGraph) {
        let debug = self.config.debug;
        self.camera_head.poll(scene, self.now, &self.retry, debug);
        if let Some(rig) = self.camera_rig.as_mut() {
            rig.poll(scene, self.now, &self.retry, debug);
        }
    }

    fn update_hover(&mut self, scene: &SceneGraph) {
        let Some((source, ray)) = self.hover_ray(scene) else {
            self.indicator.hide();
            return;
        };

        let landing = self.resolver.resolve(&ray, &self.registry, scene);
        self.hover.store(HoverSample {
            source,
            computed_at: self.now,
            landing,
        });

        match &landing {
            Some(landing) => self.indicator.show(landing, &self.style),
            None => self.indicator.hide(),
        }
        if let HoverSource::Hand(hand) = source {
            self.ring.hold(hand, landing.as_ref());
        }
        verbose!(self.config.debug, ?source, ?landing, "hover");
    }

    /// Hover ray for the current mode: the desktop pointer, or in a headset a
    /// held hand before the gaze reticle.
    fn hover_ray(&self, scene: &SceneGraph) -> Option<(HoverSource, Ray)> {
        match self.mode {
            InputMode::Desktop => {
                let pointer = self.mouse.pointer()?;
                let ray = self.pointer_ray(scene, pointer)?;
                Some((HoverSource::Pointer(pointer), ray))
            }
            InputMode::Headset => {
                if let Some(hand) = self.pinch.active_hand() {
                    let ray = self.pinch.ray(hand)?;
                    return Some((HoverSource::Hand(hand), ray));
                }
                Some((HoverSource::Reticle, self.gaze.ray()?))
            }
        }
    }

    fn pointer_ray(&self, scene: &SceneGraph, pointer: Vector2<f32>) -> Option<Ray> {
        let head_world = self.head_world(scene)?;
        pointer_ray(&self.camera, &self.viewport, &head_world, pointer)
    }

    fn head_world(&self, scene: &SceneGraph) -> Option<Matrix4<f32>> {
        scene.world_transform(self.camera_head.node()?)
    }

    /// Node moved by teleports: the rig if one is configured, else the head.
    fn rig_node(&self) -> Option<NodeId> {
        match &self.camera_rig {
            Some(rig) => rig.node(),
            None => self.camera_head.node(),
        }
    }

    fn write_rig_pose(&self, scene: &mut SceneGraph, pose: Pose) {
        let written = self
            .rig_node()
            .map(|rig| scene.set_pose(rig, pose))
            .unwrap_or(false);
        if !written {
            tracing::warn!("camera rig vanished during a teleport");
        }
    }

    pub fn on_mouse_down(&mut self, scene: &SceneGraph, position: Vector2<f32>) {
        if self.mode != InputMode::Desktop {
            return;
        }
        self.mouse.press(position);
        self.registry.rebuild(scene, self.now);
    }

    pub fn on_mouse_move(&mut self, position: Vector2<f32>) {
        if self.mode == InputMode::Desktop {
            self.mouse.move_to(position);
        }
    }

    /// Returns true if the release was a click that started a teleport.
    pub fn on_mouse_up(&mut self, scene: &SceneGraph, position: Vector2<f32>) -> bool {
        if self.mode != InputMode::Desktop {
            return false;
        }
        if !self.mouse.release(position) {
            input_log!(DEBUG, "pointer moved between press and release; treated as a drag");
            return false;
        }

        let landing = match self.hover.fresh(self.now, HoverSource::Pointer(position)) {
            Some(sample) => sample.landing,
            None => self
                .pointer_ray(scene, position)
                .and_then(|ray| self.resolver.resolve(&ray, &self.registry, scene)),
        };
        self.confirm(scene, landing)
    }

    /// The gaze reticle's ray moved.
    pub fn on_reticle_moved(&mut self, ray: Ray) {
        self.gaze.aim(ray);
    }

    /// A click from the gaze cursor. Always resolved fresh from the click's ray.
    pub fn on_cursor_click(&mut self, scene: &SceneGraph, ray: Option<Ray>) -> bool {
        let Some(head_world) = self.head_world(scene) else {
            return false;
        };
        let ray = self.gaze.click_ray(ray, &head_world);
        let landing = self.resolver.resolve(&ray, &self.registry, scene);
        self.confirm(scene, landing)
    }

    /// Feed this frame's tracked hands. Returns true if a release started a teleport.
    pub fn update_hands(&mut self, scene: &SceneGraph, hands: &HandsInput) -> bool {
        let mut started = false;
        for edge in self.pinch.update(hands) {
            match edge {
                PinchEdge::Started(hand, ray) => {
                    input_log!(DEBUG, "{} hand armed teleport", hand.name());
                    self.registry.rebuild(scene, self.now);
                    let landing = self.resolver.resolve(&ray, &self.registry, scene);
                    self.ring.hold(hand, landing.as_ref());
                }
                PinchEdge::Released(hand, ray) => {
                    let landing = self.resolver.resolve(&ray, &self.registry, scene);
                    let committed = self.confirm(scene, landing);
                    input_log!(DEBUG, "{} hand released, committed: {}", hand.name(), committed);
                    self.ring.release(committed);
                    started |= committed;
                }
                PinchEdge::Cancelled(hand) => {
                    input_log!(DEBUG, "{} hand lost tracking", hand.name());
                    self.ring.hide();
                }
            }
        }
        started
    }

    fn confirm(&mut self, scene: &SceneGraph, landing: LandingResolution) -> bool {
        match landing {
            Some(landing) => self.begin_teleport(scene, &landing),
            None => {
                verbose!(self.config.debug, "confirmation without a landing ignored");
                false
            }
        }
    }

    /// Start moving the rig to `landing`. A teleport already in flight is
    /// replaced, starting from wherever the rig currently is.
    fn begin_teleport(&mut self, scene: &SceneGraph, landing: &Landing) -> bool {
        let Some(from) = self.rig_node().and_then(|rig| scene.pose(rig)) else {
            verbose!(self.config.debug, "no camera rig; teleport ignored");
            return false;
        };

        let to = Pose::new(
            landing.point,
            landing_orientation(
                from.orientation,
                landing.normal,
                self.config.landing_normal(),
                self.config.align_to_surface,
            ),
        );
        let event = self.transition.start(from, to);
        self.tunnel.handle(&event);
        self.events.push(event);
        self.indicator.hide();
        self.hover.clear();

        navigation_log!(INFO, "teleport from {:?} to {:?}", from.position, to.position);
        true
    }

    /// Move the rig directly, e.g. to restore a saved pose. Refused while a
    /// teleport owns the rig.
    pub fn place_rig(&mut self, scene: &mut SceneGraph, pose: Pose) -> Result<(), TeleportError> {
        if self.transition.is_transitioning() {
            return Err(TeleportError::RigBusy);
        }
        let rig = self.rig_node().ok_or(TeleportError::RigUnavailable)?;
        if !scene.set_pose(rig, pose) {
            return Err(TeleportError::RigUnavailable);
        }
        Ok(())
    }

    pub fn rig_pose(&self, scene: &SceneGraph) -> Option<Pose> {
        scene.pose(self.rig_node()?)
    }

    pub fn enter_vr(&mut self) {
        self.mode = InputMode::Headset;
        self.reset_transient();
    }

    pub fn exit_vr(&mut self) {
        self.mode = InputMode::Desktop;
        self.reset_transient();
    }

    /// Drop everything tied to the scene. Never fails.
    pub fn teardown(&mut self) {
        self.reset_transient();
        self.registry.clear();
        self.camera_head.reset();
        if let Some(rig) = self.camera_rig.as_mut() {
            rig.reset();
        }
        self.events.clear();
    }

    fn reset_transient(&mut self) {
        self.transition.reset();
        self.tunnel = TunnelEffect::default();
        self.hover.clear();
        self.mouse.reset();
        self.gaze.reset();
        self.pinch.reset();
        self.indicator.hide();
        self.ring.hide();
    }

    /// Navigation events since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<NavigationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
    }

    pub fn indicator(&self) -> &LandingIndicator {
        &self.indicator
    }

    pub fn ring(&self) -> &RingIndicator {
        &self.ring
    }

    pub fn tunnel(&self) -> &TunnelEffect {
        &self.tunnel
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_transitioning()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn config(&self) -> &TeleportConfig {
        &self.config
    }

    pub fn registry(&self) -> &RaycastRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &HitResolver {
        &self.resolver
    }

    #[cfg(any(test, feature = "diagnostics"))]
    pub fn diagnostics(&self) -> TeleportDiagnostics {
        TeleportDiagnostics {
            mode: self.mode,
            collidable: self.registry.collidable().count(),
            scene_meshes: self.registry.scene_meshes().len(),
            progress: self.transition.progress(),
            hover: self.hover.latest().copied(),
            camera_head: self.camera_head.state(),
            camera_rig: self.camera_rig.as_ref().map(|rig| rig.state()),
        }
    }
}

/// Snapshot of internal state for tests and tooling.
#[cfg(any(test, feature = "diagnostics"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TeleportDiagnostics {
    pub mode: InputMode,
    pub collidable: usize,
    pub scene_meshes: usize,
    pub progress: Option<f32>,
    pub hover: Option<HoverSample>,
    pub camera_head: ReferenceState,
    pub camera_rig: Option<ReferenceState>,
}
