//! Raster processing stages of the spectral index pipeline.
//!
//! Every stage is a pure transform: inputs are borrowed or consumed and a new
//! raster is returned, so stages compose and can be tested one at a time.
//!
//! - [`rank`]: collapse Stokes/frequency axes down to the spatial plane
//! - [`threshold`]: hard clip below a survey noise floor
//! - [`reproject`]: resample onto a reference WCS grid
//! - [`convolve`]: FFT Gaussian convolution with NaN-aware normalisation
//! - [`beam_match`]: degrade a finer beam to a coarser one, best effort

pub mod beam_match;
pub mod convolve;
pub mod rank;
pub mod reproject;
pub mod threshold;

pub use beam_match::{match_beam, BeamMatch, BeamMatchFailure, KernelLimits};
pub use convolve::{convolve_normalized, gaussian_kernel, ConvolveError};
pub use rank::{reduce_rank, RankError};
pub use reproject::reproject_bilinear;
pub use threshold::apply_noise_floor;
