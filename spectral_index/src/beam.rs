//! Gaussian restoring beams and beam deconvolution.
//!
//! Beams are described by their FWHM along the major and minor axes in
//! arcseconds and a position angle in degrees. The surveys in the registry
//! all have circular beams, and only circular beams can be deconvolved here;
//! elliptical or rotated beams are rejected rather than approximated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// FWHM = 2 * sqrt(2 * ln(2)) * sigma
pub const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949_3;

/// Relative tolerance used when deciding whether two beam widths are equal.
const BEAM_EQUALITY_TOLERANCE: f64 = 1e-9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BeamError {
    #[error("Only circular beams are supported (major={major}\", minor={minor}\", pa={pa} deg)")]
    NonCircular { major: f64, minor: f64, pa: f64 },
    #[error("Beam {target}\" cannot be deconvolved by {current}\": the difference is not positive")]
    NotDeconvolvable { target: f64, current: f64 },
}

/// Elliptical Gaussian beam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Major axis FWHM in arcseconds
    pub major_arcsec: f64,
    /// Minor axis FWHM in arcseconds
    pub minor_arcsec: f64,
    /// Position angle in degrees
    pub position_angle_deg: f64,
}

impl Beam {
    /// Circular beam with the given FWHM and zero position angle.
    pub fn circular(fwhm_arcsec: f64) -> Self {
        Self {
            major_arcsec: fwhm_arcsec,
            minor_arcsec: fwhm_arcsec,
            position_angle_deg: 0.0,
        }
    }

    pub fn is_circular(&self) -> bool {
        let scale = self.major_arcsec.abs().max(self.minor_arcsec.abs()).max(1.0);
        (self.major_arcsec - self.minor_arcsec).abs() <= BEAM_EQUALITY_TOLERANCE * scale
            && self.position_angle_deg == 0.0
    }

    /// Effective resolution used for ordering beams (the major axis FWHM).
    pub fn resolution_arcsec(&self) -> f64 {
        self.major_arcsec
    }

    /// Gaussian standard deviation along the major axis in arcseconds.
    pub fn sigma_arcsec(&self) -> f64 {
        self.major_arcsec / FWHM_PER_SIGMA
    }

    /// Compute the beam that, convolved with `other`, yields `self`.
    ///
    /// For circular Gaussians this is the quadrature difference of the FWHMs.
    /// Fails if either beam is not circular or if `self` is not strictly
    /// wider than `other`.
    pub fn deconvolve(&self, other: &Beam) -> Result<Beam, BeamError> {
        for beam in [self, other] {
            if !beam.is_circular() {
                return Err(BeamError::NonCircular {
                    major: beam.major_arcsec,
                    minor: beam.minor_arcsec,
                    pa: beam.position_angle_deg,
                });
            }
        }

        let target = self.major_arcsec;
        let current = other.major_arcsec;
        let diff_sq = target * target - current * current;

        if !diff_sq.is_finite() || diff_sq <= BEAM_EQUALITY_TOLERANCE * target * target {
            return Err(BeamError::NotDeconvolvable { target, current });
        }

        Ok(Beam::circular(diff_sq.sqrt()))
    }
}
