//! Raster containers passed between pipeline stages.

use ndarray::{Array2, ArrayD};

use crate::fits_io::header::AstrometricHeader;
use crate::image_proc::rank::{reduce_rank, RankError};

/// A 2D grid of intensities indexed `[row, col]`, FITS NAXIS2 × NAXIS1.
pub type Raster = Array2<f64>;

/// Raster of arbitrary rank as read from disk, before rank reduction.
#[derive(Debug, Clone)]
pub struct RawSkyImage {
    pub data: ArrayD<f64>,
    pub header: AstrometricHeader,
}

impl RawSkyImage {
    pub fn new(data: ArrayD<f64>, header: AstrometricHeader) -> Self {
        Self { data, header }
    }

    /// Collapse to the spatial plane.
    ///
    /// The header is kept except for the WCS cards of the dropped axes.
    pub fn into_sky_image(self) -> Result<SkyImage, RankError> {
        let data = reduce_rank(self.data)?;
        let mut header = self.header;
        header.retain_celestial_axes();
        Ok(SkyImage { data, header })
    }
}

/// A 2D raster paired with its astrometric header.
#[derive(Debug, Clone)]
pub struct SkyImage {
    pub data: Raster,
    pub header: AstrometricHeader,
}

impl SkyImage {
    pub fn new(data: Raster, header: AstrometricHeader) -> Self {
        Self { data, header }
    }

    /// Shape as (height, width).
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }
}
