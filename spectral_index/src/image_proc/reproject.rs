//! Bilinear reprojection between two celestial pixel grids.
//!
//! For every target pixel the sky position is computed from the target WCS,
//! mapped into the source grid through the source WCS and sampled with
//! bilinear interpolation. Target pixels that land outside the source
//! footprint are `NaN`, never zero, so they cannot pass for real signal.
//! Both grids must share a celestial frame.

use log::debug;
use ndarray::{Array2, ArrayView2, Zip};

use crate::sky_image::Raster;
use crate::wcs::{Wcs, WcsError};

/// Source samples may sit this far past the outermost pixel centre and still
/// be clamped onto the edge, matching the footprint of the pixel itself.
const EDGE_TOLERANCE_PX: f64 = 0.5;

/// Resample `source` (on `source_wcs`) onto a grid described by `target_wcs`
/// with `target_shape` = (height, width).
///
/// Identical grids and shapes return a copy of the source without resampling.
/// Fails with [`WcsError::FrameMismatch`] when the two solutions use
/// different celestial frames.
pub fn reproject_bilinear(
    source: ArrayView2<f64>,
    source_wcs: &Wcs,
    target_wcs: &Wcs,
    target_shape: (usize, usize),
) -> Result<Raster, WcsError> {
    target_wcs.ensure_same_frame(source_wcs)?;

    if source_wcs == target_wcs && source.dim() == target_shape {
        debug!("Reprojection skipped: grids are identical");
        return Ok(source.to_owned());
    }

    let mut output = Array2::from_elem(target_shape, f64::NAN);
    Zip::indexed(&mut output).par_for_each(|(row, col), value| {
        // Array index -> 1-based FITS pixel
        let sample = target_wcs
            .pixel_to_world(col as f64 + 1.0, row as f64 + 1.0)
            .and_then(|(ra, dec)| source_wcs.world_to_pixel(ra, dec))
            .and_then(|(x, y)| sample_bilinear(&source, x - 1.0, y - 1.0));
        if let Some(v) = sample {
            *value = v;
        }
    });

    let valid = output.iter().filter(|v| !v.is_nan()).count();
    debug!(
        "Reprojected {:?} at {:.3}\"/px -> {:?} at {:.3}\"/px: {} of {} pixels inside the source footprint",
        source.dim(),
        source_wcs.pixel_scale_arcsec(),
        target_shape,
        target_wcs.pixel_scale_arcsec(),
        valid,
        output.len()
    );
    Ok(output)
}

/// Bilinear sample at zero-based array coordinates (`x` = column, `y` = row).
///
/// Returns `None` outside the footprint. Neighbours with zero weight are not
/// read, so sampling exactly on a pixel centre next to a NaN stays finite.
fn sample_bilinear(data: &ArrayView2<f64>, x: f64, y: f64) -> Option<f64> {
    let (height, width) = data.dim();
    let (x0, tx) = axis_position(x, width)?;
    let (y0, ty) = axis_position(y, height)?;

    let mut acc = 0.0;
    for (dy, wy) in [(0, 1.0 - ty), (1, ty)] {
        if wy == 0.0 {
            continue;
        }
        for (dx, wx) in [(0, 1.0 - tx), (1, tx)] {
            if wx == 0.0 {
                continue;
            }
            acc += wy * wx * data[[y0 + dy, x0 + dx]];
        }
    }
    Some(acc)
}

/// Lower neighbour index and fractional offset along one axis of length `len`.
fn axis_position(coord: f64, len: usize) -> Option<(usize, f64)> {
    if len == 0 || !coord.is_finite() {
        return None;
    }
    let max = (len - 1) as f64;
    if coord < -EDGE_TOLERANCE_PX || coord > max + EDGE_TOLERANCE_PX {
        return None;
    }
    let clamped = coord.clamp(0.0, max);
    if len == 1 {
        return Some((0, 0.0));
    }
    let lower = (clamped.floor() as usize).min(len - 2);
    Some((lower, clamped - lower as f64))
}
