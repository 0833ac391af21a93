use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dr_core::frame::DepthBuffer;
use dr_core::traits::{DepthSource, SensorInfo};
use image::DynamicImage;

use crate::error::SourceError;

/// Extensions reconnues pour les cartes de profondeur enregistrées.
pub const DEPTH_IMAGE_EXTS: &[&str] = &["png", "tif", "tiff"];

/// Décode une carte de profondeur 16 bits (un canal, ticks bruts).
///
/// Les images 8 bits ou couleur sont refusées : les convertir changerait
/// l'unité des échantillons.
///
/// # Errors
/// Returns an error if the file cannot be decoded or is not single-channel 16-bit.
///
/// # Example
/// ```no_run
/// use dr_source::image::load_depth_image;
/// use std::path::Path;
/// let buf = load_depth_image(Path::new("depth.png")).unwrap();
/// ```
pub fn load_depth_image(path: &Path) -> Result<DepthBuffer> {
    let img = image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    match img {
        DynamicImage::ImageLuma16(buf) => {
            let (width, height) = buf.dimensions();
            Ok(DepthBuffer {
                data: buf.into_raw(),
                width,
                height,
            })
        }
        other => Err(SourceError::UnsupportedFormat {
            path: path.display().to_string(),
            format: format!("{:?}", other.color()),
        }
        .into()),
    }
}

/// Source d'image de profondeur statique. Retourne toujours la même frame.
///
/// # Example
/// ```no_run
/// use dr_source::image::ImageDepthSource;
/// use std::path::Path;
/// let source = ImageDepthSource::new(Path::new("depth.png"), None).unwrap();
/// ```
pub struct ImageDepthSource {
    frame: Arc<DepthBuffer>,
    sensors: Vec<SensorInfo>,
    name: String,
}

impl ImageDepthSource {
    /// Load a depth image; `depth_units` is the recording's m/tick, if known.
    ///
    /// # Errors
    /// Returns an error if the image cannot be loaded.
    pub fn new(path: &Path, depth_units: Option<f32>) -> Result<Self> {
        let frame = load_depth_image(path)?;
        log::info!(
            "Image de profondeur {} : {}x{}",
            path.display(),
            frame.width,
            frame.height
        );
        Ok(Self {
            frame: Arc::new(frame),
            sensors: vec![SensorInfo::depth("Recorded depth", depth_units)],
            name: format!("image {}", path.display()),
        })
    }
}

impl DepthSource for ImageDepthSource {
    fn next_frame(&mut self) -> Result<Option<Arc<DepthBuffer>>> {
        Ok(Some(Arc::clone(&self.frame)))
    }

    fn native_size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn is_live(&self) -> bool {
        false
    }

    fn sensors(&self) -> &[SensorInfo] {
        &self.sensors
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma};

    #[test]
    fn decodes_sixteen_bit_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depth.png");
        let img: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(4, 3, |x, y| Luma([(y * 1000 + x) as u16]));
        img.save(&path).unwrap();

        let buf = load_depth_image(&path).unwrap();
        assert_eq!((buf.width, buf.height), (4, 3));
        assert_eq!(buf.data[0], 0);
        assert_eq!(buf.data[2 * 4 + 3], 2003);
    }

    #[test]
    fn rejects_eight_bit_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        GrayImage::new(2, 2).save(&path).unwrap();

        let err = load_depth_image(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn image_source_replays_same_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depth.png");
        let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(8, 8, Luma([750]));
        img.save(&path).unwrap();

        let mut source = ImageDepthSource::new(&path, Some(0.001)).unwrap();
        let a = source.next_frame().unwrap().unwrap();
        let b = source.next_frame().unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.native_size(), (8, 8));
        assert!(source.sensors()[0].depth_capable);
    }
}
