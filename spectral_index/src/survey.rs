//! Static registry of the radio surveys this pipeline understands.
//!
//! Every survey carries three physical parameters that drive the pipeline:
//! its observing frequency (used for the spectral index and for ordering),
//! a fixed noise floor (used by the thresholder) and its restoring beam
//! FWHM (used by the beam matcher). The table is compiled in and never
//! mutated at runtime, so it is safe to share between any number of
//! concurrent invocations.
//!
//! # Noise floors
//! The floors are single per-survey values in Jy/beam, roughly the quoted
//! RMS of each survey's public data release. Real maps have spatially varying
//! noise; applying one number everywhere is a deliberate simplification.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

use crate::beam::Beam;

/// Error returned when a survey identifier is not in the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown survey identifier '{0}'")]
pub struct UnknownSurvey(pub String);

/// Identifier of a known radio survey.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum Survey {
    /// LOFAR Two-metre Sky Survey, second data release (144 MHz, 6")
    #[value(name = "lotss-dr2")]
    LotssDr2,
    /// GMRT 150 MHz all-sky survey, first alternative data release (25")
    #[value(name = "tgss-adr1")]
    TgssAdr1,
    /// Westerbork Northern Sky Survey (325 MHz, 54")
    Wenss,
    /// Rapid ASKAP Continuum Survey, low band (887.5 MHz, 25")
    RacsLow,
    /// NRAO VLA Sky Survey (1.4 GHz, 45")
    Nvss,
    /// Faint Images of the Radio Sky at Twenty centimetres (1.4 GHz, 5")
    First,
    /// VLA Sky Survey (3 GHz, 2.5")
    Vlass,
}

/// Physical parameters of one survey.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurveyDescriptor {
    pub id: Survey,
    /// Observing frequency in MHz
    pub frequency_mhz: f64,
    /// Hard clip level in map intensity units (Jy/beam)
    pub noise_floor: f64,
    /// Circular restoring beam FWHM in arcseconds
    pub beam_resolution_arcsec: f64,
}

const LOTSS_DR2: SurveyDescriptor = SurveyDescriptor {
    id: Survey::LotssDr2,
    frequency_mhz: 144.0,
    noise_floor: 0.000083,
    beam_resolution_arcsec: 6.0,
};

const TGSS_ADR1: SurveyDescriptor = SurveyDescriptor {
    id: Survey::TgssAdr1,
    frequency_mhz: 150.0,
    noise_floor: 0.0035,
    beam_resolution_arcsec: 25.0,
};

const WENSS: SurveyDescriptor = SurveyDescriptor {
    id: Survey::Wenss,
    frequency_mhz: 325.0,
    noise_floor: 0.0036,
    beam_resolution_arcsec: 54.0,
};

const RACS_LOW: SurveyDescriptor = SurveyDescriptor {
    id: Survey::RacsLow,
    frequency_mhz: 887.5,
    noise_floor: 0.00025,
    beam_resolution_arcsec: 25.0,
};

const NVSS: SurveyDescriptor = SurveyDescriptor {
    id: Survey::Nvss,
    frequency_mhz: 1400.0,
    noise_floor: 0.00045,
    beam_resolution_arcsec: 45.0,
};

const FIRST: SurveyDescriptor = SurveyDescriptor {
    id: Survey::First,
    frequency_mhz: 1400.0,
    noise_floor: 0.00015,
    beam_resolution_arcsec: 5.0,
};

const VLASS: SurveyDescriptor = SurveyDescriptor {
    id: Survey::Vlass,
    frequency_mhz: 3000.0,
    noise_floor: 0.00012,
    beam_resolution_arcsec: 2.5,
};

impl Survey {
    /// Look up the registry entry for this survey.
    pub fn descriptor(&self) -> &'static SurveyDescriptor {
        match self {
            Survey::LotssDr2 => &LOTSS_DR2,
            Survey::TgssAdr1 => &TGSS_ADR1,
            Survey::Wenss => &WENSS,
            Survey::RacsLow => &RACS_LOW,
            Survey::Nvss => &NVSS,
            Survey::First => &FIRST,
            Survey::Vlass => &VLASS,
        }
    }

    /// Canonical identifier string, as accepted by [`Survey::from_str`].
    pub fn id(&self) -> &'static str {
        match self {
            Survey::LotssDr2 => "lotss-dr2",
            Survey::TgssAdr1 => "tgss-adr1",
            Survey::Wenss => "wenss",
            Survey::RacsLow => "racs-low",
            Survey::Nvss => "nvss",
            Survey::First => "first",
            Survey::Vlass => "vlass",
        }
    }

    pub fn frequency_mhz(&self) -> f64 {
        self.descriptor().frequency_mhz
    }

    pub fn noise_floor(&self) -> f64 {
        self.descriptor().noise_floor
    }

    /// Restoring beam of the survey (always circular).
    pub fn beam(&self) -> Beam {
        Beam::circular(self.descriptor().beam_resolution_arcsec)
    }

    /// Iterate every registry entry in declaration order.
    pub fn all() -> impl Iterator<Item = &'static SurveyDescriptor> {
        Survey::iter().map(|s| s.descriptor())
    }
}

impl FromStr for Survey {
    type Err = UnknownSurvey;

    /// Parse an identifier, ignoring ASCII case and treating `_` like `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Survey::iter()
            .find(|survey| survey.id() == normalized)
            .ok_or_else(|| UnknownSurvey(s.to_string()))
    }
}

impl fmt::Display for Survey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
