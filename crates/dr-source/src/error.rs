use thiserror::Error;

/// Errors originating from the source module.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// No sensor or recording exposes depth data.
    #[error("Aucun capteur de profondeur trouvé : {0}")]
    NoDepthSensor(String),

    /// The depth sensor reported a unusable depth-units option.
    #[error("Unité de profondeur invalide rapportée par {sensor} : {value} m/tick")]
    InvalidDepthUnits {
        /// Sensor name.
        sensor: String,
        /// Reported value.
        value: f32,
    },

    /// Image is not a 16-bit single-channel depth map.
    #[error("Format non supporté pour {path} : {format} (attendu : L16)")]
    UnsupportedFormat {
        /// Offending file.
        path: String,
        /// Decoded color type.
        format: String,
    },
}
