//! Deterministic synthetic sky fields.
//!
//! Rasters are indexed `[row, col]` like FITS images read into ndarray.
//! Everything that involves randomness takes an explicit seed.

use ndarray::Array2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Circular Gaussian source, position in zero-based array coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianSource {
    pub row: f64,
    pub col: f64,
    /// Peak brightness
    pub peak: f64,
    pub sigma_px: f64,
}

impl GaussianSource {
    pub fn new(row: f64, col: f64, peak: f64, sigma_px: f64) -> Self {
        Self {
            row,
            col,
            peak,
            sigma_px,
        }
    }

    /// Brightness at the centre of pixel `(row, col)`.
    pub fn value_at(&self, row: usize, col: usize) -> f64 {
        let dy = row as f64 - self.row;
        let dx = col as f64 - self.col;
        self.peak * (-(dx * dx + dy * dy) / (2.0 * self.sigma_px * self.sigma_px)).exp()
    }
}

/// Sum of Gaussian sources on a constant background.
pub fn gaussian_field(shape: (usize, usize), background: f64, sources: &[GaussianSource]) -> Array2<f64> {
    Array2::from_shape_fn(shape, |(r, c)| {
        background + sources.iter().map(|s| s.value_at(r, c)).sum::<f64>()
    })
}

/// Scale a reference-band map to another frequency with a power law.
///
/// Returns `reference * (target_mhz / reference_mhz)^alpha`.
pub fn power_law_scaled(
    reference: &Array2<f64>,
    reference_mhz: f64,
    target_mhz: f64,
    alpha: f64,
) -> Array2<f64> {
    let factor = (target_mhz / reference_mhz).powf(alpha);
    reference.mapv(|v| v * factor)
}

/// Pair of maps at two frequencies following `S ∝ ν^alpha` everywhere.
pub fn power_law_pair(
    reference: &Array2<f64>,
    low_mhz: f64,
    high_mhz: f64,
    alpha: f64,
) -> (Array2<f64>, Array2<f64>) {
    (reference.clone(), power_law_scaled(reference, low_mhz, high_mhz, alpha))
}

/// Add seeded white Gaussian noise in place.
pub fn add_gaussian_noise(data: &mut Array2<f64>, std_dev: f64, seed: u64) {
    if std_dev <= 0.0 {
        return;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let normal = Normal::new(0.0, std_dev).expect("finite positive standard deviation");
    data.iter_mut().for_each(|v| *v += normal.sample(&mut rng));
}
