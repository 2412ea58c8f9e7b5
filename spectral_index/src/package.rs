//! Packaging and persistence of spectral index maps.
//!
//! Each persisted result lives in its own directory named by a random UUID,
//! `<root>/<uuid>/spectral_index.fits`, so concurrent invocations sharing an
//! output root never write to the same path.

use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::error::SpectralIndexError;
use crate::fits_io::{write_fits, AstrometricHeader};
use crate::sky_image::Raster;
use crate::survey::Survey;

/// Logical name of the downloadable artifact.
pub const ARTIFACT_NAME: &str = "spectral_index";
/// File extension of the artifact.
pub const ARTIFACT_EXTENSION: &str = "fits";

/// Spectral index map on the reference grid, with its provenance.
#[derive(Debug, Clone)]
pub struct SpectralIndexResult {
    pub index: Raster,
    /// Header of the reference-grid input
    pub header: AstrometricHeader,
    /// Higher-frequency survey
    pub numerator: Survey,
    /// Lower-frequency survey
    pub denominator: Survey,
}

impl SpectralIndexResult {
    /// Reference header plus cards recording which surveys produced the map.
    pub fn output_header(&self) -> AstrometricHeader {
        let mut header = self
            .header
            .clone()
            .with_text("SPIXNUM", self.numerator.id())
            .with_text("SPIXDEN", self.denominator.id())
            .with_float("SPIXFNUM", self.numerator.frequency_mhz())
            .with_float("SPIXFDEN", self.denominator.frequency_mhz());
        header.push_history(&format!(
            "Spectral index ln({0}/{1}) / ln(nu_{0}/nu_{1})",
            self.numerator.id(),
            self.denominator.id()
        ));
        header
    }

    /// Write the map as a FITS file at `path`, which must not exist yet.
    pub fn write_to(&self, path: &Path) -> Result<(), SpectralIndexError> {
        write_fits(path, self.index.view(), &self.output_header()).map_err(SpectralIndexError::Write)
    }
}

/// Opaque reference to a persisted result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultHandle {
    pub id: Uuid,
    pub path: PathBuf,
}

impl ResultHandle {
    /// File name a client should save the artifact as.
    pub fn download_name(&self) -> String {
        artifact_file_name()
    }
}

fn artifact_file_name() -> String {
    format!("{ARTIFACT_NAME}.{ARTIFACT_EXTENSION}")
}

/// Directory tree holding persisted results.
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `result` under a fresh identifier and return its handle.
    pub fn persist(&self, result: &SpectralIndexResult) -> Result<ResultHandle, SpectralIndexError> {
        let id = Uuid::new_v4();
        let dir = self.root.join(id.to_string());
        std::fs::create_dir_all(&dir).map_err(|source| SpectralIndexError::ResultDirectory {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(artifact_file_name());
        result.write_to(&path)?;

        info!(
            "Stored {}/{} spectral index as {} at {}",
            result.numerator,
            result.denominator,
            id,
            path.display()
        );
        Ok(ResultHandle { id, path })
    }

    /// Find a previously persisted result by identifier.
    pub fn locate(&self, id: Uuid) -> Option<ResultHandle> {
        let path = self.root.join(id.to_string()).join(artifact_file_name());
        path.is_file().then_some(ResultHandle { id, path })
    }
}
