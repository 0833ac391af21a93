use crate::error::CoreError;

/// Vue immuable sur une frame de profondeur brute.
///
/// Les échantillons sont en ticks capteur (Z16), row-major, un par pixel.
/// Invariant : `width > 0`, `height > 0`, `data.len() == width * height`.
///
/// # Example
/// ```
/// use dr_core::frame::DepthFrame;
/// let data = [0u16, 1, 2, 3, 4, 5];
/// let frame = DepthFrame::new(3, 2, &data).unwrap();
/// assert_eq!(frame.get(2, 1), Some(5));
/// assert_eq!(frame.get(3, 0), None);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct DepthFrame<'a> {
    data: &'a [u16],
    width: u32,
    height: u32,
}

impl<'a> DepthFrame<'a> {
    /// Wrap a borrowed sample buffer, checking its geometry.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if either dimension is zero or
    /// the buffer length differs from `width * height`.
    pub fn new(width: u32, height: u32, data: &'a [u16]) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(CoreError::InvalidDimensions {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw samples, row-major.
    #[inline]
    #[must_use]
    pub fn samples(&self) -> &'a [u16] {
        self.data
    }

    /// Échantillon en (x, y), `None` hors limites.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Itère sur les lignes de pixels, de haut en bas.
    ///
    /// # Example
    /// ```
    /// use dr_core::frame::DepthFrame;
    /// let data = [1u16, 2, 3, 4];
    /// let frame = DepthFrame::new(2, 2, &data).unwrap();
    /// let rows: Vec<&[u16]> = frame.rows().collect();
    /// assert_eq!(rows, vec![&[1u16, 2][..], &[3u16, 4][..]]);
    /// ```
    pub fn rows(&self) -> std::slice::ChunksExact<'a, u16> {
        self.data.chunks_exact(self.width as usize)
    }
}

/// Buffer de profondeur possédé, produit par les sources.
///
/// # Example
/// ```
/// use dr_core::frame::DepthBuffer;
/// let buf = DepthBuffer::new(4, 3);
/// assert_eq!(buf.data.len(), 12);
/// assert!(buf.view().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthBuffer {
    /// Samples in raw ticks, row-major.
    pub data: Vec<u16>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl DepthBuffer {
    /// Crée un buffer rempli de zéros (aucune mesure).
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Borrow the buffer as a checked [`DepthFrame`].
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if the buffer was built with
    /// inconsistent fields.
    pub fn view(&self) -> Result<DepthFrame<'_>, CoreError> {
        DepthFrame::new(self.width, self.height, &self.data)
    }
}

/// Facteur de conversion tick → mètres, fourni par le capteur.
///
/// # Example
/// ```
/// use dr_core::frame::DepthUnitScale;
/// let scale = DepthUnitScale::new(0.001).unwrap();
/// assert!((scale.meters_per_tick() - 0.001).abs() < f32::EPSILON);
/// assert!(DepthUnitScale::new(0.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthUnitScale(f32);

impl DepthUnitScale {
    /// Millimètres : valeur par défaut quand le capteur n'expose pas l'option.
    pub const MILLIMETER: Self = Self(0.001);

    /// Validate a meters-per-tick factor.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidScale`] if `meters_per_tick` is not a
    /// positive finite number.
    pub fn new(meters_per_tick: f32) -> Result<Self, CoreError> {
        if meters_per_tick.is_finite() && meters_per_tick > 0.0 {
            Ok(Self(meters_per_tick))
        } else {
            Err(CoreError::InvalidScale(meters_per_tick))
        }
    }

    #[inline]
    #[must_use]
    pub fn meters_per_tick(self) -> f32 {
        self.0
    }

    /// Distance in meters expressed in raw ticks, rounded to nearest.
    #[inline]
    #[must_use]
    pub fn ticks_for(self, meters: f32) -> u64 {
        (f64::from(meters) / f64::from(self.0)).round() as u64
    }
}

impl Default for DepthUnitScale {
    fn default() -> Self {
        Self::MILLIMETER
    }
}
