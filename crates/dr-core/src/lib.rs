/// Types partagés, configuration et rasteriseur de profondeur pour depthscii.
///
/// The rasterizer turns a raw depth frame into a compact ASCII occupancy map:
/// the frame is cut into tiles and each tile's share of "near" pixels picks a
/// symbol from an ordered ramp.

pub mod charset;
pub mod config;
pub mod error;
pub mod frame;
pub mod raster;
pub mod rasterize;
pub mod traits;

pub use config::{Config, RasterConfig, StreamConfig};
pub use error::CoreError;
pub use frame::{DepthBuffer, DepthFrame, DepthUnitScale};
pub use raster::Raster;
pub use rasterize::{DepthRasterizer, rasterize};
pub use traits::{DepthSource, SensorInfo};
