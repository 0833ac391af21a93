use std::sync::Arc;
use anyhow::Result;
use dr_core::frame::DepthBuffer;
use dr_core::traits::{DepthSource, SensorInfo};
use rayon::prelude::*;

use crate::pace::FramePacer;

/// Unité des frames synthétiques : le millimètre.
const DEPTH_UNITS: f32 = 0.001;

/// Mur du fond, en ticks.
const WALL_TICKS: f64 = 2500.0;

/// Scène procédurale : une sphère orbitant devant un mur, avec la bande
/// gauche sans mesure typique des caméras stéréo.
///
/// La frame `n` ne dépend que de `n` ; `fps` ne règle que le rythme de livraison.
///
/// # Example
/// ```
/// use dr_source::synthetic::SyntheticDepthSource;
/// let source = SyntheticDepthSource::new(64, 48, 0);
/// let frame = source.frame_at(0);
/// assert_eq!(frame.data.len(), 64 * 48);
/// ```
pub struct SyntheticDepthSource {
    width: u32,
    height: u32,
    frame_count: u64,
    pacer: FramePacer,
    sensors: Vec<SensorInfo>,
}

impl SyntheticDepthSource {
    /// `fps == 0` livre les frames sans attente.
    #[must_use]
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            frame_count: 0,
            pacer: FramePacer::new(fps),
            sensors: vec![
                SensorInfo::other("Synthetic RGB Camera"),
                SensorInfo::depth("Synthetic Stereo Module", Some(DEPTH_UNITS)),
            ],
        }
    }

    /// Render frame `index` of the scene.
    #[must_use]
    pub fn frame_at(&self, index: u64) -> DepthBuffer {
        let mut fb = DepthBuffer::new(self.width, self.height);
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        let time = index as f64 / 30.0;

        let cx = w / 2.0 + w / 4.0 * time.cos();
        let cy = h / 2.0 + h / 8.0 * (2.0 * time).sin();
        let radius = w.min(h) / 5.0;
        // Distance du centre de la sphère : 0.5 m → 1.5 m.
        let center_ticks = (1.0 + 0.5 * (0.7 * time).sin()) * 1000.0;
        let dropout = self.width / 16;

        if self.width == 0 {
            return fb;
        }
        fb.data
            .par_chunks_mut(self.width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let py = y as f64 + 0.5;
                let wall = WALL_TICKS + 500.0 * py / h;
                for (x, sample) in row.iter_mut().enumerate() {
                    if (x as u32) < dropout {
                        *sample = 0;
                        continue;
                    }
                    let dx = x as f64 + 0.5 - cx;
                    let dy = py - cy;
                    let d2 = dx * dx + dy * dy;
                    let r2 = radius * radius;
                    let depth = if d2 < r2 {
                        center_ticks - 150.0 * (r2 - d2).sqrt() / radius
                    } else {
                        wall
                    };
                    *sample = depth.clamp(1.0, f64::from(u16::MAX)) as u16;
                }
            });
        fb
    }
}

impl DepthSource for SyntheticDepthSource {
    fn next_frame(&mut self) -> Result<Option<Arc<DepthBuffer>>> {
        self.pacer.wait();
        let frame = self.frame_at(self.frame_count);
        self.frame_count += 1;
        Ok(Some(Arc::new(frame)))
    }

    fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_live(&self) -> bool {
        true
    }

    fn sensors(&self) -> &[SensorInfo] {
        &self.sensors
    }

    fn name(&self) -> &str {
        "Synthetic depth camera"
    }
}
