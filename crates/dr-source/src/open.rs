use std::path::PathBuf;

use anyhow::Result;
use dr_core::traits::DepthSource;

use crate::folder::FolderDepthSource;
use crate::image::ImageDepthSource;
use crate::synthetic::SyntheticDepthSource;

/// Source de frames choisie par l'utilisateur.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceKind {
    /// Une carte de profondeur 16 bits, rejouée indéfiniment.
    Image(PathBuf),
    /// Toutes les cartes d'un dossier, dans l'ordre des noms.
    Folder { path: PathBuf, looping: bool },
    /// Scène procédurale cadencée à `fps` (0 = sans attente).
    Synthetic { width: u32, height: u32, fps: u32 },
}

/// Fabrique la source demandée.
///
/// `depth_units` renseigne l'unité des enregistrements, qui ne la portent pas.
///
/// # Errors
/// Returns an error if the source cannot be opened; a folder without depth
/// images yields [`crate::SourceError::NoDepthSensor`].
///
/// # Example
/// ```
/// use dr_source::open::{SourceKind, open_source};
/// let source = open_source(&SourceKind::Synthetic { width: 32, height: 24, fps: 0 }, None).unwrap();
/// assert_eq!(source.native_size(), (32, 24));
/// ```
pub fn open_source(kind: &SourceKind, depth_units: Option<f32>) -> Result<Box<dyn DepthSource>> {
    let source: Box<dyn DepthSource> = match kind {
        SourceKind::Image(path) => Box::new(ImageDepthSource::new(path, depth_units)?),
        SourceKind::Folder { path, looping } => {
            Box::new(FolderDepthSource::new(path, *looping, depth_units)?)
        }
        SourceKind::Synthetic { width, height, fps } => {
            if *width == 0 || *height == 0 {
                anyhow::bail!("Dimensions synthétiques invalides : {width}x{height}");
            }
            Box::new(SyntheticDepthSource::new(*width, *height, *fps))
        }
    };
    log::info!("Source ouverte : {}", source.name());
    for sensor in source.sensors() {
        log::debug!(
            "  capteur {} (profondeur : {}, unité : {:?})",
            sensor.name,
            sensor.depth_capable,
            sensor.depth_units
        );
    }
    Ok(source)
}
