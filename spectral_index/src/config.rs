//! Tunable pipeline parameters, persisted as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::image_proc::KernelLimits;
use crate::spectral::DEFAULT_ZERO_SUBSTITUTE;

/// Default upper bound on the size of each input file.
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Replacement for exact zeros in the denominator map
    pub zero_substitute: f64,
    /// Half-width of the beam matching kernel in units of its sigma
    pub kernel_truncate_sigma: f64,
    /// Kernels narrower than this (pixels) are reported as a degraded match
    pub min_kernel_sigma_px: f64,
    /// Kernels wider than this half-width (pixels) are reported as a degraded match
    pub max_kernel_radius_px: usize,
    /// Input files above this size are rejected before they are opened
    pub max_input_bytes: u64,
    /// Directory under which each result gets its own subdirectory
    pub output_root: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            zero_substitute: DEFAULT_ZERO_SUBSTITUTE,
            kernel_truncate_sigma: 4.0,
            min_kernel_sigma_px: 1e-3,
            max_kernel_radius_px: 1024,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            output_root: PathBuf::from("spectral_index_results"),
        }
    }
}

impl PipelineConfig {
    pub fn kernel_limits(&self) -> KernelLimits {
        KernelLimits {
            truncate_sigma: self.kernel_truncate_sigma,
            min_sigma_px: self.min_kernel_sigma_px,
            max_radius_px: self.max_kernel_radius_px,
        }
    }

    /// Save to a pretty-printed JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Load from JSON; missing fields take their defaults
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.zero_substitute, 1e-10);
        assert_eq!(config.max_input_bytes, 64 * 1024 * 1024);
        assert_eq!(config.kernel_limits(), KernelLimits::default());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        let config = PipelineConfig {
            zero_substitute: 1e-6,
            output_root: dir.path().join("results"),
            ..Default::default()
        };

        config.save_to_file(&path).unwrap();
        assert_eq!(PipelineConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"kernel_truncate_sigma": 3.0}"#).unwrap();
        assert_eq!(config.kernel_truncate_sigma, 3.0);
        assert_eq!(config.min_kernel_sigma_px, 1e-3);
        assert_eq!(config.max_kernel_radius_px, 1024);
        assert_eq!(config.output_root, PathBuf::from("spectral_index_results"));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = PipelineConfig::load_from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
