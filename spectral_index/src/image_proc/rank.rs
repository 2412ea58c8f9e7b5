//! Rank reduction of survey cubes to a single spatial plane.
//!
//! Survey cutouts are often stored with degenerate Stokes and frequency axes,
//! e.g. `(1, 1, H, W)`. Only the first plane along each leading axis is kept.

use ndarray::{Array2, ArrayD, Axis, Ix2};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankError {
    #[error("Unsupported raster dimensionality: rank {rank} (expected 2, 3 or 4)")]
    UnsupportedDimensionality { rank: usize },
    #[error("Leading axis {axis} has length 0, no plane to select")]
    EmptyAxis { axis: usize },
}

/// Reduce a rank 2, 3 or 4 array to its trailing two axes.
///
/// Rank 2 passes through untouched. Rank 3 keeps index 0 of axis 0. Rank 4
/// keeps index 0 of axes 0 and 1.
pub fn reduce_rank(data: ArrayD<f64>) -> Result<Array2<f64>, RankError> {
    let rank = data.ndim();
    if !(2..=4).contains(&rank) {
        return Err(RankError::UnsupportedDimensionality { rank });
    }

    let mut plane = data;
    for axis in 0..rank - 2 {
        if plane.len_of(Axis(0)) == 0 {
            return Err(RankError::EmptyAxis { axis });
        }
        plane = plane.index_axis_move(Axis(0), 0);
    }

    plane
        .into_dimensionality::<Ix2>()
        .map_err(|_| RankError::UnsupportedDimensionality { rank })
}
