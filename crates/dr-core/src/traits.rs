use std::sync::Arc;

use crate::frame::DepthBuffer;

/// Capteur exposé par un périphérique de profondeur.
///
/// # Example
/// ```
/// use dr_core::traits::SensorInfo;
/// let sensor = SensorInfo::depth("Stereo Module", Some(0.001));
/// assert!(sensor.depth_capable);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SensorInfo {
    /// Nom lisible du capteur.
    pub name: String,
    /// Le capteur produit des frames de profondeur.
    pub depth_capable: bool,
    /// Option "depth units" en m/tick, si le capteur la supporte.
    pub depth_units: Option<f32>,
}

impl SensorInfo {
    /// A depth-capable sensor.
    #[must_use]
    pub fn depth(name: impl Into<String>, depth_units: Option<f32>) -> Self {
        Self {
            name: name.into(),
            depth_capable: true,
            depth_units,
        }
    }

    /// A sensor without depth capability (RGB, IMU...).
    #[must_use]
    pub fn other(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depth_capable: false,
            depth_units: None,
        }
    }
}

/// Fournit des frames de profondeur au pipeline.
///
/// Implémenté par : `ImageDepthSource`, `FolderDepthSource`, `SyntheticDepthSource`.
/// Les ressources du périphérique sont libérées au `Drop`.
///
/// # Example
/// ```
/// use dr_core::traits::{DepthSource, SensorInfo};
/// use dr_core::frame::DepthBuffer;
/// use std::sync::Arc;
///
/// struct DummySource;
/// impl DepthSource for DummySource {
///     fn next_frame(&mut self) -> anyhow::Result<Option<Arc<DepthBuffer>>> { Ok(None) }
///     fn native_size(&self) -> (u32, u32) { (0, 0) }
///     fn is_live(&self) -> bool { false }
///     fn sensors(&self) -> &[SensorInfo] { &[] }
///     fn name(&self) -> &str { "dummy" }
/// }
/// ```
pub trait DepthSource: Send + 'static {
    /// Bloque jusqu'à la prochaine frame.
    ///
    /// `Ok(None)` : source épuisée. `Err` : échec d'acquisition.
    ///
    /// # Errors
    /// Returns an error if the frame cannot be acquired or decoded.
    fn next_frame(&mut self) -> anyhow::Result<Option<Arc<DepthBuffer>>>;

    /// Dimensions natives de la source.
    fn native_size(&self) -> (u32, u32);

    /// Indique si la source est infinie (capteur, synthétique) ou finie (fichiers).
    fn is_live(&self) -> bool;

    /// Capteurs exposés par le périphérique.
    fn sensors(&self) -> &[SensorInfo];

    /// Description lisible du périphérique, pour les logs.
    fn name(&self) -> &str;
}
