//! Best-effort matching of a raster's beam to a coarser target beam.
//!
//! A finer-resolution raster is convolved with the Gaussian that turns its
//! beam into the target beam. When the target beam is not coarser the raster
//! is returned untouched. Any failure to build or apply the kernel, including
//! a kernel too wide to allocate, degrades to the original raster with a
//! logged reason; it is never a pipeline error.

use log::{debug, warn};
use thiserror::Error;

use super::convolve::{convolve_normalized, gaussian_kernel, ConvolveError};
use crate::beam::{Beam, BeamError, FWHM_PER_SIGMA};
use crate::sky_image::Raster;

/// Why a beam match fell back to the unconvolved raster.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BeamMatchFailure {
    #[error(transparent)]
    Beam(#[from] BeamError),
    #[error(transparent)]
    Convolve(#[from] ConvolveError),
    #[error("Pixel scale must be positive and finite, got {0} arcsec")]
    InvalidPixelScale(f64),
    #[error("Matching kernel sigma {sigma_px} px is below the {min_px} px minimum")]
    KernelTooNarrow { sigma_px: f64, min_px: f64 },
    #[error("Matching kernel half-width {radius_px} px exceeds the {limit} px limit")]
    KernelTooWide { radius_px: f64, limit: usize },
}

/// Outcome of [`match_beam`].
#[derive(Debug, Clone)]
pub enum BeamMatch {
    /// Target beam is not coarser, nothing to do
    Unchanged(Raster),
    /// Raster was convolved up to the target beam
    Convolved(Raster),
    /// Matching failed; the original raster is carried with the reason
    Degraded {
        raster: Raster,
        reason: BeamMatchFailure,
    },
}

impl BeamMatch {
    /// The raster to continue the pipeline with, whatever the outcome.
    pub fn into_raster(self) -> Raster {
        match self {
            BeamMatch::Unchanged(raster)
            | BeamMatch::Convolved(raster)
            | BeamMatch::Degraded { raster, .. } => raster,
        }
    }

    pub fn raster(&self) -> &Raster {
        match self {
            BeamMatch::Unchanged(raster)
            | BeamMatch::Convolved(raster)
            | BeamMatch::Degraded { raster, .. } => raster,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, BeamMatch::Degraded { .. })
    }
}

/// Kernel construction limits for [`match_beam`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelLimits {
    /// Kernel half-width in units of sigma
    pub truncate_sigma: f64,
    /// Smallest kernel sigma in pixels considered a real convolution
    pub min_sigma_px: f64,
    /// Largest kernel half-width in pixels
    pub max_radius_px: usize,
}

impl Default for KernelLimits {
    fn default() -> Self {
        Self {
            truncate_sigma: 4.0,
            min_sigma_px: 1e-3,
            max_radius_px: 1024,
        }
    }
}

/// Convolve `raster` from `current` beam to `target` beam.
///
/// The matching kernel is the Gaussian whose FWHM is the quadrature
/// difference of the two beams, sampled on the raster's pixel grid.
///
/// # Arguments
///
/// * `raster` - Intensities on a grid of `pixel_scale_arcsec` pixels; NaN marks missing data
/// * `current` - Restoring beam of `raster`
/// * `target` - Beam to degrade to
/// * `pixel_scale_arcsec` - Angular size of one pixel
/// * `limits` - Kernel truncation and size bounds
///
/// # Returns
///
/// [`BeamMatch::Unchanged`] whenever the target resolution is not strictly
/// coarser than the current one, for any pixel scale. Otherwise
/// [`BeamMatch::Convolved`], or [`BeamMatch::Degraded`] with the untouched
/// raster when no usable kernel can be built or applied.
///
/// # Examples
///
/// ```
/// use ndarray::Array2;
/// use spectral_index::image_proc::{match_beam, BeamMatch, KernelLimits};
/// use spectral_index::Beam;
///
/// let mut raster = Array2::zeros((41, 41));
/// raster[[20, 20]] = 1.0;
///
/// // 6" to 25" on 1.5" pixels
/// let outcome = match_beam(
///     raster,
///     &Beam::circular(6.0),
///     &Beam::circular(25.0),
///     1.5,
///     KernelLimits::default(),
/// );
/// assert!(matches!(outcome, BeamMatch::Convolved(_)));
/// assert!(outcome.raster()[[20, 20]] < 0.1);
/// ```
pub fn match_beam(
    raster: Raster,
    current: &Beam,
    target: &Beam,
    pixel_scale_arcsec: f64,
    limits: KernelLimits,
) -> BeamMatch {
    if target.resolution_arcsec() <= current.resolution_arcsec() {
        debug!(
            "Beam {:.3}\" already at or coarser than target {:.3}\"",
            current.resolution_arcsec(),
            target.resolution_arcsec()
        );
        return BeamMatch::Unchanged(raster);
    }

    match convolve_to_target(&raster, current, target, pixel_scale_arcsec, limits) {
        Ok(convolved) => BeamMatch::Convolved(convolved),
        Err(reason) => {
            warn!(
                "Beam matching {:.3}\" -> {:.3}\" failed, continuing with unconvolved raster: {}",
                current.resolution_arcsec(),
                target.resolution_arcsec(),
                reason
            );
            BeamMatch::Degraded { raster, reason }
        }
    }
}

fn convolve_to_target(
    raster: &Raster,
    current: &Beam,
    target: &Beam,
    pixel_scale_arcsec: f64,
    limits: KernelLimits,
) -> Result<Raster, BeamMatchFailure> {
    let kernel_beam = target.deconvolve(current)?;

    if !pixel_scale_arcsec.is_finite() || pixel_scale_arcsec <= 0.0 {
        return Err(BeamMatchFailure::InvalidPixelScale(pixel_scale_arcsec));
    }

    let sigma_px = kernel_beam.major_arcsec / FWHM_PER_SIGMA / pixel_scale_arcsec;
    if !(sigma_px >= limits.min_sigma_px) {
        return Err(BeamMatchFailure::KernelTooNarrow {
            sigma_px,
            min_px: limits.min_sigma_px,
        });
    }

    let radius_px = limits.truncate_sigma * sigma_px;
    if !radius_px.is_finite() || radius_px > limits.max_radius_px as f64 {
        return Err(BeamMatchFailure::KernelTooWide {
            radius_px,
            limit: limits.max_radius_px,
        });
    }

    let kernel = gaussian_kernel(sigma_px, limits.truncate_sigma)?;
    debug!(
        "Matching kernel FWHM {:.3}\" = sigma {:.3} px, {}x{} taps",
        kernel_beam.major_arcsec,
        sigma_px,
        kernel.nrows(),
        kernel.ncols()
    );

    convolve_normalized(raster.view(), kernel.view()).map_err(BeamMatchFailure::from)
}
