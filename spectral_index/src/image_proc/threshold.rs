//! Noise floor clipping.
//!
//! This is a hard clip at a fixed per-survey level, not a statistical mask
//! built from a measured local noise estimate.

use ndarray::ArrayView2;

use crate::sky_image::Raster;

/// Replace every value strictly below `noise_floor` with 0.
///
/// Values at or above the floor are copied unchanged, and NaN stays NaN so
/// that pixels outside a reprojected footprint remain marked as missing.
pub fn apply_noise_floor(data: ArrayView2<f64>, noise_floor: f64) -> Raster {
    data.mapv(|v| if v < noise_floor { 0.0 } else { v })
}
