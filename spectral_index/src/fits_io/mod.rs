//! FITS input and output for survey images and spectral index products.
//!
//! Reading and writing go through cfitsio via the `fitsio` crate. Only the
//! primary HDU is used in both directions, and its header travels from input
//! to output card by card.

pub mod cards;
pub mod header;
pub mod loader;
pub mod writer;

use std::path::PathBuf;

use thiserror::Error;

pub use header::{AstrometricHeader, HeaderCard, HeaderError, HeaderValue};
pub use loader::load_fits;
pub use writer::write_fits;

/// Errors raised while reading or writing FITS files.
#[derive(Debug, Error)]
pub enum FitsIoError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("FITS error in '{path}': {source}")]
    Fits {
        path: PathBuf,
        source: fitsio::errors::Error,
    },

    #[error("Primary HDU of '{path}' is not an image")]
    NotAnImage { path: PathBuf },

    #[error("Pixel data of '{path}' does not match its declared shape: {source}")]
    Shape {
        path: PathBuf,
        source: ndarray::ShapeError,
    },

    #[error("'{path}' is {size} bytes, above the {limit} byte input limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Refusing to overwrite existing file '{0}'")]
    AlreadyExists(PathBuf),
}
