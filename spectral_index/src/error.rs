//! Crate-level error type.
//!
//! Every fatal condition reaches the caller as a [`SpectralIndexError`] naming
//! the stage that failed and, where it applies, which of the two inputs.
//! Beam matching problems are not errors; see [`crate::image_proc::BeamMatch`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::fits_io::{FitsIoError, HeaderError};
use crate::image_proc::RankError;
use crate::survey::UnknownSurvey;
use crate::wcs::WcsError;

/// Which of the two pipeline inputs an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    First,
    Second,
}

impl fmt::Display for InputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSlot::First => write!(f, "first"),
            InputSlot::Second => write!(f, "second"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SpectralIndexError {
    #[error(transparent)]
    UnknownSurvey(#[from] UnknownSurvey),

    #[error("Failed to read {input} input: {source}")]
    Load {
        input: InputSlot,
        #[source]
        source: FitsIoError,
    },

    #[error("{input} input '{path}' is {size} bytes, above the {limit} byte limit")]
    InputTooLarge {
        input: InputSlot,
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    #[error("Unsupported dimensionality in {input} input: {source}")]
    UnsupportedDimensionality {
        input: InputSlot,
        #[source]
        source: RankError,
    },

    #[error("{input} input header is missing required keyword '{keyword}'")]
    MissingHeaderKeyword { input: InputSlot, keyword: String },

    #[error("Invalid {input} input header: {source}")]
    Header {
        input: InputSlot,
        #[source]
        source: HeaderError,
    },

    #[error("Invalid WCS in {input} input: {source}")]
    Wcs {
        input: InputSlot,
        #[source]
        source: WcsError,
    },

    #[error("Both inputs are at {frequency_mhz} MHz; a spectral index needs two distinct positive frequencies")]
    IndistinctFrequencies { frequency_mhz: f64 },

    #[error("Invalid frequency pair {numerator_mhz} / {denominator_mhz} MHz")]
    InvalidFrequencies {
        numerator_mhz: f64,
        denominator_mhz: f64,
    },

    #[error("Raster shapes differ: numerator {numerator:?}, denominator {denominator:?}")]
    ShapeMismatch {
        numerator: (usize, usize),
        denominator: (usize, usize),
    },

    #[error("Failed to prepare result directory '{path}': {source}")]
    ResultDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write result: {0}")]
    Write(#[source] FitsIoError),
}

impl SpectralIndexError {
    /// Wrap a loader failure, lifting the size cap into its own variant.
    pub fn load(input: InputSlot, err: FitsIoError) -> Self {
        match err {
            FitsIoError::TooLarge { path, size, limit } => SpectralIndexError::InputTooLarge {
                input,
                path,
                size,
                limit,
            },
            source => SpectralIndexError::Load { input, source },
        }
    }

    pub fn header(input: InputSlot, err: HeaderError) -> Self {
        match err {
            HeaderError::MissingKeyword(keyword) => {
                SpectralIndexError::MissingHeaderKeyword { input, keyword }
            }
            source => SpectralIndexError::Header { input, source },
        }
    }

    pub fn wcs(input: InputSlot, err: WcsError) -> Self {
        match err {
            WcsError::Header(header) => Self::header(input, header),
            source => SpectralIndexError::Wcs { input, source },
        }
    }

    pub fn rank(input: InputSlot, source: RankError) -> Self {
        SpectralIndexError::UnsupportedDimensionality { input, source }
    }

    /// The input this error is attributed to, if any.
    pub fn input(&self) -> Option<InputSlot> {
        match self {
            SpectralIndexError::Load { input, .. }
            | SpectralIndexError::InputTooLarge { input, .. }
            | SpectralIndexError::UnsupportedDimensionality { input, .. }
            | SpectralIndexError::MissingHeaderKeyword { input, .. }
            | SpectralIndexError::Header { input, .. }
            | SpectralIndexError::Wcs { input, .. } => Some(*input),
            _ => None,
        }
    }
}
