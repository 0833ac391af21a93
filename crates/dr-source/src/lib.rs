/// Depth frame sources for depthscii (recorded images, folders, synthetic scene).

pub mod error;
pub mod folder;
pub mod image;
pub mod open;
pub mod pace;
pub mod sensor;
pub mod synthetic;

pub use error::SourceError;
pub use open::{SourceKind, open_source};
pub use pace::FramePacer;
pub use sensor::depth_unit_scale;
