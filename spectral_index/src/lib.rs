//! Pixel-wise spectral index maps from pairs of radio survey images.
//!
//! Two survey cutouts at different frequencies are reduced to their spatial
//! planes, clipped at each survey's noise floor, reprojected onto a common
//! grid, brought to a common resolution and combined into a map of the
//! power-law exponent α in `S ∝ ν^α`.
//!
//! The [`pipeline`] module ties the stages together; each stage is also
//! usable on its own.

pub mod beam;
pub mod config;
pub mod error;
pub mod fits_io;
pub mod image_proc;
pub mod package;
pub mod pipeline;
pub mod sky_image;
pub mod spectral;
pub mod survey;
pub mod wcs;

pub use beam::Beam;
pub use config::PipelineConfig;
pub use error::{InputSlot, SpectralIndexError};
pub use fits_io::AstrometricHeader;
pub use image_proc::{BeamMatch, BeamMatchFailure};
pub use package::{ResultHandle, ResultStore, SpectralIndexResult, ARTIFACT_NAME};
pub use pipeline::{compute, run, PipelineOutput, SurveyInput};
pub use sky_image::{Raster, RawSkyImage, SkyImage};
pub use spectral::{order_by_frequency, spectral_index, BandImage, OrderedPair};
pub use survey::{Survey, SurveyDescriptor, UnknownSurvey};
pub use wcs::Wcs;
