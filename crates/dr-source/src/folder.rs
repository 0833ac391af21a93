use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use dr_core::frame::DepthBuffer;
use dr_core::traits::{DepthSource, SensorInfo};

use crate::error::SourceError;
use crate::image::{DEPTH_IMAGE_EXTS, load_depth_image};

/// Source qui rejoue un dossier de cartes de profondeur, dans l'ordre des noms.
///
/// Les fichiers sont décodés à la demande ; un fichier illisible est une
/// erreur d'acquisition.
pub struct FolderDepthSource {
    files: Vec<PathBuf>,
    current_idx: usize,
    looping: bool,
    native_size: (u32, u32),
    sensors: Vec<SensorInfo>,
    name: String,
}

impl FolderDepthSource {
    /// Scanne `folder_path` récursivement.
    ///
    /// # Errors
    /// Retourne [`SourceError::NoDepthSensor`] si le dossier ne contient aucune
    /// carte de profondeur, ou une erreur si le dossier ou la première image
    /// ne peut être lu.
    pub fn new(folder_path: &Path, looping: bool, depth_units: Option<f32>) -> Result<Self> {
        let mut files = Vec::new();
        scan_dir(folder_path, &mut files)
            .with_context(|| format!("Impossible de parcourir {}", folder_path.display()))?;
        files.sort();

        let Some(first) = files.first() else {
            return Err(SourceError::NoDepthSensor(format!(
                "aucune image de profondeur dans {}",
                folder_path.display()
            ))
            .into());
        };
        let first_frame = load_depth_image(first)?;
        log::info!(
            "Dossier {} : {} frames {}x{}",
            folder_path.display(),
            files.len(),
            first_frame.width,
            first_frame.height
        );

        Ok(Self {
            native_size: (first_frame.width, first_frame.height),
            files,
            current_idx: 0,
            looping,
            sensors: vec![SensorInfo::depth("Recorded depth", depth_units)],
            name: format!("dossier {}", folder_path.display()),
        })
    }

    /// Nombre de frames enregistrées.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Extrait récursivement les images de profondeur reconnues.
fn scan_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                scan_dir(&path, files)?;
            } else if let Some(ext) = path.extension().and_then(|s| s.to_str())
                && DEPTH_IMAGE_EXTS.contains(&ext.to_lowercase().as_str())
            {
                files.push(path);
            }
        }
    }
    Ok(())
}

impl DepthSource for FolderDepthSource {
    fn next_frame(&mut self) -> Result<Option<Arc<DepthBuffer>>> {
        if self.current_idx >= self.files.len() {
            if !self.looping || self.files.is_empty() {
                return Ok(None);
            }
            self.current_idx = 0;
        }
        let path = &self.files[self.current_idx];
        self.current_idx += 1;

        let frame = load_depth_image(path)?;
        if (frame.width, frame.height) != self.native_size {
            log::warn!(
                "{} : {}x{} au lieu de {}x{}",
                path.display(),
                frame.width,
                frame.height,
                self.native_size.0,
                self.native_size.1
            );
        }
        Ok(Some(Arc::new(frame)))
    }

    fn native_size(&self) -> (u32, u32) {
        self.native_size
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
