//! Gaussian kernels and FFT-based convolution of rasters with missing data.
//!
//! Convolution is linear (zero padded, no wrap-around) and cropped back to the
//! input shape. NaN pixels are treated as missing: the zero-filled data and
//! its validity mask are convolved with the same kernel and divided, and every
//! pixel that was NaN on input stays NaN on output.

use std::sync::Arc;

use ndarray::{s, Array2, ArrayView2, Axis, Zip};
use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};
use thiserror::Error;

use crate::sky_image::Raster;

/// Normalisation weights below this are treated as no coverage.
const MIN_COVERAGE_WEIGHT: f64 = 1e-8;

/// Largest kernel half-width [`gaussian_kernel`] will allocate.
pub const MAX_KERNEL_RADIUS_PX: usize = 4096;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvolveError {
    #[error("Cannot convolve an empty raster")]
    EmptyRaster,
    #[error("Convolution kernel is empty")]
    EmptyKernel,
    #[error("Kernel sum {0} is not positive and finite")]
    DegenerateKernel(f64),
    #[error("Gaussian sigma must be positive and finite, got {0} px")]
    InvalidSigma(f64),
    #[error("Kernel truncation must be positive and finite, got {0} sigma")]
    InvalidTruncation(f64),
    #[error("Kernel half-width {radius_px} px exceeds the {limit} px limit")]
    KernelTooLarge { radius_px: f64, limit: usize },
}

/// Build a normalised, square 2D Gaussian kernel.
///
/// The kernel is sampled at pixel centres out to `ceil(truncate_sigma * sigma_px)`
/// pixels from the centre (at least one) and scaled to unit sum. Half-widths
/// above [`MAX_KERNEL_RADIUS_PX`] are refused before anything is allocated.
pub fn gaussian_kernel(sigma_px: f64, truncate_sigma: f64) -> Result<Array2<f64>, ConvolveError> {
    if !sigma_px.is_finite() || sigma_px <= 0.0 {
        return Err(ConvolveError::InvalidSigma(sigma_px));
    }
    if !truncate_sigma.is_finite() || truncate_sigma <= 0.0 {
        return Err(ConvolveError::InvalidTruncation(truncate_sigma));
    }

    let radius_px = (truncate_sigma * sigma_px).ceil();
    if !radius_px.is_finite() || radius_px > MAX_KERNEL_RADIUS_PX as f64 {
        return Err(ConvolveError::KernelTooLarge {
            radius_px,
            limit: MAX_KERNEL_RADIUS_PX,
        });
    }
    let radius = (radius_px as usize).max(1);
    let size = 2 * radius + 1;
    let two_sigma_sq = 2.0 * sigma_px * sigma_px;

    let mut kernel = Array2::from_shape_fn((size, size), |(r, c)| {
        let dy = r as f64 - radius as f64;
        let dx = c as f64 - radius as f64;
        (-(dx * dx + dy * dy) / two_sigma_sq).exp()
    });

    let sum = kernel.sum();
    if !sum.is_finite() || sum <= 0.0 {
        return Err(ConvolveError::DegenerateKernel(sum));
    }
    kernel /= sum;
    Ok(kernel)
}

/// Convolve `data` with `kernel`, treating NaN pixels as missing.
///
/// The output has the shape of `data`, aligned so that the kernel centre
/// (`kh / 2`, `kw / 2`) sits on each output pixel. Valid pixels with no
/// covered neighbours (weight below 1e-8) come out as NaN.
pub fn convolve_normalized(
    data: ArrayView2<f64>,
    kernel: ArrayView2<f64>,
) -> Result<Raster, ConvolveError> {
    let (height, width) = data.dim();
    if height == 0 || width == 0 {
        return Err(ConvolveError::EmptyRaster);
    }
    let (kh, kw) = kernel.dim();
    if kh == 0 || kw == 0 {
        return Err(ConvolveError::EmptyKernel);
    }
    let kernel_sum = kernel.sum();
    if !kernel_sum.is_finite() || kernel_sum <= 0.0 {
        return Err(ConvolveError::DegenerateKernel(kernel_sum));
    }

    let padded_shape = (height + kh - 1, width + kw - 1);
    let fft = Fft2d::new(padded_shape);

    let mut values = padded(padded_shape, data, |v| if v.is_nan() { 0.0 } else { v });
    let mut mask = padded(padded_shape, data, |v| if v.is_nan() { 0.0 } else { 1.0 });
    let mut kernel_spec = padded(padded_shape, kernel, |v| v);

    fft.forward(&mut kernel_spec);
    fft.forward(&mut values);
    fft.forward(&mut mask);

    values *= &kernel_spec;
    mask *= &kernel_spec;

    fft.inverse(&mut values);
    fft.inverse(&mut mask);

    let (oy, ox) = (kh / 2, kw / 2);
    let values = values.slice(s![oy..oy + height, ox..ox + width]);
    let weights = mask.slice(s![oy..oy + height, ox..ox + width]);

    let output = Zip::from(&data)
        .and(&values)
        .and(&weights)
        .par_map_collect(|&original, value, weight| {
            if original.is_nan() || weight.re < MIN_COVERAGE_WEIGHT * kernel_sum {
                f64::NAN
            } else {
                value.re / weight.re
            }
        });
    Ok(output)
}

/// Copy `source` into the top-left corner of a zeroed complex array.
fn padded(
    shape: (usize, usize),
    source: ArrayView2<f64>,
    map: impl Fn(f64) -> f64,
) -> Array2<Complex64> {
    let (h, w) = source.dim();
    let mut out = Array2::from_elem(shape, Complex64::new(0.0, 0.0));
    out.slice_mut(s![..h, ..w])
        .zip_mut_with(&source, |dst, &v| *dst = Complex64::new(map(v), 0.0));
    out
}

/// Row-column 2D FFT over arrays of a fixed shape.
struct Fft2d {
    shape: (usize, usize),
    row_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl Fft2d {
    fn new(shape: (usize, usize)) -> Self {
        let (rows, cols) = shape;
        let mut planner = FftPlanner::new();
        Self {
            shape,
            row_forward: planner.plan_fft_forward(cols),
            row_inverse: planner.plan_fft_inverse(cols),
            col_forward: planner.plan_fft_forward(rows),
            col_inverse: planner.plan_fft_inverse(rows),
        }
    }

    fn forward(&self, data: &mut Array2<Complex64>) {
        Self::process(data, &self.row_forward, &self.col_forward);
    }

    /// Inverse transform including the 1/N normalisation.
    fn inverse(&self, data: &mut Array2<Complex64>) {
        Self::process(data, &self.row_inverse, &self.col_inverse);
        let norm = 1.0 / (self.shape.0 * self.shape.1) as f64;
        data.par_mapv_inplace(|v| v * norm);
    }

    fn process(data: &mut Array2<Complex64>, row_fft: &Arc<dyn Fft<f64>>, col_fft: &Arc<dyn Fft<f64>>) {
        data.axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| match row.as_slice_mut() {
                Some(slice) => row_fft.process(slice),
                None => {
                    let mut scratch = row.to_vec();
                    row_fft.process(&mut scratch);
                    row.assign(&ndarray::ArrayView1::from(&scratch));
                }
            });

        data.axis_iter_mut(Axis(1))
            .into_par_iter()
            .for_each(|mut column| {
                let mut scratch = column.to_vec();
                col_fft.process(&mut scratch);
                column.assign(&ndarray::ArrayView1::from(&scratch));
            });
    }
}
