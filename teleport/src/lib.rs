//! Point-and-click teleport navigation for a scene graph.
//!
//! A pointer, gaze reticle or tracked hand produces a ray; [`HitResolver`]
//! decides whether it ends on a walkable navmesh, and
//! [`TransitionController`] eases the camera rig there. [`CursorTeleport`]
//! wires the pieces to host events and the per-frame tick.

/// `debug!` gated on the injected `debug` config flag.
macro_rules! verbose {
    ($enabled:expr, $($arg:tt)*) => {
        if $enabled {
            tracing::debug!($($arg)*);
        }
    };
}

pub mod config;
pub mod error;
pub mod hit_resolver;
pub mod hover_cache;
pub mod input;
pub mod position_store;
pub mod reference;
pub mod registry;
pub mod selector;
pub mod teleport_system;
pub mod teleport_ui;
pub mod transition;
pub mod tunnel;

pub use config::{TeleportButton, TeleportConfig};
pub use error::TeleportError;
pub use hit_resolver::{HitResolver, Landing, LandingResolution};
pub use input::{HandInput, Handedness, HandsInput, InputMode};
pub use position_store::PositionStore;
pub use registry::{RaycastRegistry, SurfaceFlags, SurfaceHandle};
pub use selector::Selector;
pub use teleport_system::{CursorTeleport, FrameTime};
#[cfg(any(test, feature = "diagnostics"))]
pub use teleport_system::TeleportDiagnostics;
pub use transition::{NavigationEvent, TransitionController};
