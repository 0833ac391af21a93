use rayon::prelude::*;

use crate::config::RasterConfig;
use crate::error::CoreError;
use crate::frame::{DepthFrame, DepthUnitScale};
use crate::raster::Raster;

/// Rasteriseur d'occupation : découpe la frame en tuiles et mappe la densité
/// de pixels proches de chaque tuile sur un symbole de la rampe.
///
/// La configuration est validée une fois à la construction ; chaque appel à
/// [`DepthRasterizer::rasterize`] est pur et ne conserve aucun état.
///
/// # Example
/// ```
/// use dr_core::config::RasterConfig;
/// use dr_core::frame::{DepthFrame, DepthUnitScale};
/// use dr_core::rasterize::DepthRasterizer;
///
/// let config = RasterConfig { tile_width: 2, tile_height: 2, near_distance_m: 1.0, ramp: vec![' ', '#'] };
/// let rasterizer = DepthRasterizer::new(config).unwrap();
/// let data = [500u16, 500, 0, 0, 500, 500, 0, 0];
/// let frame = DepthFrame::new(4, 2, &data).unwrap();
/// let raster = rasterizer.rasterize(&frame, DepthUnitScale::MILLIMETER);
/// assert_eq!(raster.to_string(), "# ");
/// ```
#[derive(Clone, Debug)]
pub struct DepthRasterizer {
    config: RasterConfig,
}

impl DepthRasterizer {
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: RasterConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// Rasterise une frame. Infaillible : frame, échelle et config sont déjà validées.
    #[must_use]
    pub fn rasterize(&self, frame: &DepthFrame<'_>, scale: DepthUnitScale) -> Raster {
        render(frame, scale, &self.config)
    }
}

/// One-shot form: validate `config`, then rasterize.
///
/// # Errors
/// Returns [`CoreError::InvalidConfig`] if `config` does not validate. Frame
/// geometry and scale are checked when [`DepthFrame`] and [`DepthUnitScale`]
/// are built.
pub fn rasterize(
    frame: &DepthFrame<'_>,
    scale: DepthUnitScale,
    config: &RasterConfig,
) -> Result<Raster, CoreError> {
    config.validate()?;
    Ok(render(frame, scale, config))
}

/// Index dans une rampe de `ramp_len` symboles pour `near` pixels proches
/// sur une tuile de `area` pixels.
///
/// `floor(near * len / (area + 1))`, une tuile entièrement proche saturant au
/// dernier symbole. Monotone en `near` pour une aire fixée.
///
/// # Example
/// ```
/// use dr_core::rasterize::ramp_index;
/// assert_eq!(ramp_index(0, 200, 9), 0);
/// assert_eq!(ramp_index(100, 200, 9), 4);
/// assert_eq!(ramp_index(200, 200, 9), 8);
/// assert_eq!(ramp_index(3, 3, 9), 8);
/// ```
#[inline]
#[must_use]
pub fn ramp_index(near: usize, area: usize, ramp_len: usize) -> usize {
    let top = ramp_len.saturating_sub(1);
    if near >= area {
        return top;
    }
    (near * ramp_len / (area + 1)).min(top)
}

/// Zéro = pas de mesure (dropout), jamais "proche".
#[inline(always)]
fn is_near(depth: u16, near_ticks: u64) -> bool {
    depth > 0 && u64::from(depth) < near_ticks
}

fn render(frame: &DepthFrame<'_>, scale: DepthUnitScale, config: &RasterConfig) -> Raster {
    let near_ticks = scale.ticks_for(config.near_distance_m);
    let width = frame.width() as usize;
    let tile_w = config.tile_width as usize;
    let band_len = width * config.tile_height as usize;
    let columns = width.div_ceil(tile_w);

    // Chaque bande de tile_height lignes est indépendante.
    let rows: Vec<String> = frame
        .samples()
        .par_chunks(band_len)
        .map(|band| render_band(band, width, tile_w, near_ticks, &config.ramp))
        .collect();

    Raster::new(rows, columns)
}

fn render_band(
    band: &[u16],
    width: usize,
    tile_w: usize,
    near_ticks: u64,
    ramp: &[char],
) -> String {
    let band_rows = band.len() / width;
    let mut coverage = vec![0usize; width.div_ceil(tile_w)];

    for row in band.chunks_exact(width) {
        for (count, tile) in coverage.iter_mut().zip(row.chunks(tile_w)) {
            *count += tile.iter().filter(|&&d| is_near(d, near_ticks)).count();
        }
    }

    coverage
        .iter()
        .enumerate()
        .map(|(col, &near)| {
            let tile_cols = tile_w.min(width - col * tile_w);
            ramp[ramp_index(near, tile_cols * band_rows, ramp.len())]
        })
        .collect()
}
