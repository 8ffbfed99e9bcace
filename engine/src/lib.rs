pub mod error;
pub mod logging;
pub mod scene;

pub use error::SceneError;
