use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Frame geometry is empty or the sample buffer does not match it.
    #[error("Dimensions invalides : {width}×{height} pour {len} échantillons")]
    InvalidDimensions {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Number of samples actually supplied.
        len: usize,
    },

    /// Non-positive tile size, non-positive near distance, or empty ramp.
    #[error("Configuration de raster invalide : {0}")]
    InvalidConfig(String),

    /// Non-positive or non-finite depth unit scale.
    #[error("Échelle de profondeur invalide : {0} m/tick")]
    InvalidScale(f32),

    /// Config file could not be read or parsed.
    #[error("Configuration illisible : {0}")]
    Config(String),
}
