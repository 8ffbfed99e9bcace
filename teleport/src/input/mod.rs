//! Front ends that turn device input into teleport rays and confirmations.
//! All three hand their rays to the same `HitResolver::resolve`.
pub mod gaze;
pub mod mouse;
pub mod pinch;

pub use gaze::GazeAdapter;
pub use mouse::{pointer_ray, MouseAdapter};
pub use pinch::{hand_ray, HandInput, Handedness, HandsInput, PinchAdapter, PinchEdge, PinchHandState};

/// Desktop uses the mouse for hover; headset uses hands, then the reticle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Desktop,
    Headset,
}
