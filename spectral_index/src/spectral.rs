//! Frequency ordering and the per-pixel spectral index.
//!
//! The spectral index α of a power law `S ∝ ν^α` is estimated per pixel from
//! two co-registered, beam-matched maps:
//!
//! ```text
//! α = ln(S_num / S_den) / ln(ν_num / ν_den)
//! ```
//!
//! By convention the higher-frequency map is the numerator, which fixes the
//! sign of α whatever order the caller supplied the two surveys in.

use log::debug;
use ndarray::{ArrayView2, Zip};

use crate::error::SpectralIndexError;
use crate::sky_image::Raster;
use crate::survey::Survey;

/// Default replacement for exact zeros in the denominator map.
pub const DEFAULT_ZERO_SUBSTITUTE: f64 = 1e-10;

/// A processed raster with the survey parameters that travel with it.
#[derive(Debug, Clone)]
pub struct BandImage {
    pub survey: Survey,
    pub raster: Raster,
    pub frequency_mhz: f64,
    pub noise_floor: f64,
}

impl BandImage {
    /// Pair a raster with its survey's registry parameters.
    pub fn new(survey: Survey, raster: Raster) -> Self {
        Self {
            survey,
            raster,
            frequency_mhz: survey.frequency_mhz(),
            noise_floor: survey.noise_floor(),
        }
    }
}

/// Two bands in numerator (higher frequency) / denominator order.
#[derive(Debug, Clone)]
pub struct OrderedPair {
    pub numerator: BandImage,
    pub denominator: BandImage,
    /// True when the caller's second band became the numerator
    pub swapped: bool,
}

/// Put the higher-frequency band first.
///
/// Bands are swapped as whole units, raster and parameters together, only when
/// `first` is strictly lower in frequency. Equal frequencies keep input order.
pub fn order_by_frequency(first: BandImage, second: BandImage) -> OrderedPair {
    if first.frequency_mhz < second.frequency_mhz {
        debug!(
            "Swapping bands: {} ({} MHz) becomes numerator over {} ({} MHz)",
            second.survey, second.frequency_mhz, first.survey, first.frequency_mhz
        );
        OrderedPair {
            numerator: second,
            denominator: first,
            swapped: true,
        }
    } else {
        OrderedPair {
            numerator: first,
            denominator: second,
            swapped: false,
        }
    }
}

/// Compute the per-pixel spectral index.
///
/// # Arguments
///
/// * `numerator` - Higher-frequency map
/// * `denominator` - Lower-frequency map on the same grid
/// * `numerator_mhz` - Frequency of `numerator` in MHz
/// * `denominator_mhz` - Frequency of `denominator` in MHz
/// * `zero_substitute` - Replacement for exact zeros in `denominator`
///
/// # Returns
///
/// A map of α with the shape of the inputs. Any non-finite result (NaN from
/// negative or missing flux, ±inf from a zero numerator) is written as 0.
/// Fails with [`SpectralIndexError::ShapeMismatch`] for differently shaped
/// maps and with a frequency error unless both frequencies are positive,
/// finite and different.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use spectral_index::spectral_index;
///
/// let nvss = array![[2.0, 0.0]];
/// let lotss = array![[1.0, 1.0]];
/// let alpha = spectral_index(nvss.view(), lotss.view(), 1400.0, 144.0, 1e-10).unwrap();
///
/// // ln(2) / ln(1400 / 144)
/// assert!((alpha[[0, 0]] - 0.3010).abs() < 1e-4);
/// // ln(0) is not a spectral index
/// assert_eq!(alpha[[0, 1]], 0.0);
/// ```
pub fn spectral_index(
    numerator: ArrayView2<f64>,
    denominator: ArrayView2<f64>,
    numerator_mhz: f64,
    denominator_mhz: f64,
    zero_substitute: f64,
) -> Result<Raster, SpectralIndexError> {
    if numerator.dim() != denominator.dim() {
        return Err(SpectralIndexError::ShapeMismatch {
            numerator: numerator.dim(),
            denominator: denominator.dim(),
        });
    }
    let valid = |f: f64| f.is_finite() && f > 0.0;
    if !valid(numerator_mhz) || !valid(denominator_mhz) {
        return Err(SpectralIndexError::InvalidFrequencies {
            numerator_mhz,
            denominator_mhz,
        });
    }
    if numerator_mhz == denominator_mhz {
        return Err(SpectralIndexError::IndistinctFrequencies {
            frequency_mhz: numerator_mhz,
        });
    }

    let log_freq_ratio = (numerator_mhz / denominator_mhz).ln();

    let index = Zip::from(&numerator)
        .and(&denominator)
        .par_map_collect(|&num, &den| {
            let den = if den == 0.0 { zero_substitute } else { den };
            let alpha = (num / den).ln() / log_freq_ratio;
            if alpha.is_finite() {
                alpha
            } else {
                0.0
            }
        });

    debug!(
        "Spectral index over {:?} pixels, ln(nu ratio) = {:.6}",
        index.dim(),
        log_freq_ratio
    );
    Ok(index)
}

/// Spectral index of an already ordered pair.
pub fn spectral_index_of(
    pair: &OrderedPair,
    zero_substitute: f64,
) -> Result<Raster, SpectralIndexError> {
    spectral_index(
        pair.numerator.raster.view(),
        pair.denominator.raster.view(),
        pair.numerator.frequency_mhz,
        pair.denominator.frequency_mhz,
        zero_substitute,
    )
}
