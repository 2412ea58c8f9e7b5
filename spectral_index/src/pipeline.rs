//! End-to-end spectral index pipeline.
//!
//! Stages run in a fixed order for each invocation:
//!
//! 1. Registry lookup of both surveys
//! 2. Load and rank-reduce both rasters
//! 3. Clip each raster at its survey noise floor
//! 4. Reproject the second raster onto the first raster's grid
//! 5. Convolve the finer-beam raster up to the coarser beam (best effort)
//! 6. Order by frequency, higher frequency as numerator
//! 7. Compute the spectral index
//! 8. Package the map with the reference header
//!
//! Nothing is shared between invocations apart from the read-only registry.

use std::path::Path;

use log::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{InputSlot, SpectralIndexError};
use crate::fits_io::load_fits;
use crate::image_proc::{
    apply_noise_floor, match_beam, reproject_bilinear, BeamMatch, BeamMatchFailure,
};
use crate::package::{ResultHandle, ResultStore, SpectralIndexResult};
use crate::sky_image::SkyImage;
use crate::spectral::{order_by_frequency, spectral_index_of, BandImage};
use crate::survey::Survey;
use crate::wcs::Wcs;

/// One survey image entering the pipeline.
#[derive(Debug, Clone)]
pub struct SurveyInput {
    pub survey: Survey,
    pub image: SkyImage,
}

impl SurveyInput {
    pub fn new(survey: Survey, image: SkyImage) -> Self {
        Self { survey, image }
    }

    /// Load a FITS file and reduce it to its spatial plane.
    pub fn load(
        path: &Path,
        survey: Survey,
        slot: InputSlot,
        config: &PipelineConfig,
    ) -> Result<Self, SpectralIndexError> {
        let raw = load_fits(path, config.max_input_bytes)
            .map_err(|e| SpectralIndexError::load(slot, e))?;
        let image = raw
            .into_sky_image()
            .map_err(|e| SpectralIndexError::rank(slot, e))?;
        debug!(
            "{} input {} ({}): {:?}",
            slot,
            path.display(),
            survey,
            image.shape()
        );
        Ok(Self { survey, image })
    }
}

/// Result of one pipeline run together with what happened along the way.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub result: SpectralIndexResult,
    /// True when the second input became the numerator
    pub swapped: bool,
    /// Beam matches that fell back to the unconvolved raster
    pub degraded_beam_matches: Vec<(InputSlot, BeamMatchFailure)>,
}

/// Run the pipeline on two in-memory images.
///
/// The first input defines the output grid and header: the second raster is
/// reprojected onto it and the first header, including any cards the
/// pipeline does not interpret, becomes the header of the result.
///
/// # Arguments
///
/// * `first` - Reference image and its survey
/// * `second` - Image resampled onto the reference grid and its survey
/// * `config` - Zero substitute and beam matching kernel limits
///
/// # Returns
///
/// The spectral index map with the higher-frequency survey as numerator,
/// whether the inputs were swapped to get there, and every beam match that
/// fell back to an unconvolved raster. Fails before any raster work when the
/// two surveys share a frequency, and on header, WCS or frame problems of
/// either input.
///
/// # Examples
///
/// ```
/// use ndarray::Array2;
/// use spectral_index::{compute, AstrometricHeader, PipelineConfig, SkyImage, Survey, SurveyInput};
///
/// # fn main() -> Result<(), spectral_index::SpectralIndexError> {
/// let header = AstrometricHeader::new()
///     .with_text("CTYPE1", "RA---SIN")
///     .with_text("CTYPE2", "DEC--SIN")
///     .with_float("CRVAL1", 180.0)
///     .with_float("CRVAL2", 45.0)
///     .with_float("CRPIX1", 4.5)
///     .with_float("CRPIX2", 4.5)
///     .with_float("CDELT1", -0.002)
///     .with_float("CDELT2", 0.002);
///
/// // TGSS and RACS-low share a 25" beam, so no convolution is needed
/// let tgss = SurveyInput::new(
///     Survey::TgssAdr1,
///     SkyImage::new(Array2::from_elem((8, 8), 0.8), header.clone()),
/// );
/// let racs = SurveyInput::new(
///     Survey::RacsLow,
///     SkyImage::new(Array2::from_elem((8, 8), 0.2), header),
/// );
///
/// let output = compute(tgss, racs, &PipelineConfig::default())?;
/// assert!(output.swapped);
/// assert_eq!(output.result.numerator, Survey::RacsLow);
/// assert!(output.result.index.iter().all(|&a| a < 0.0));
/// # Ok(())
/// # }
/// ```
pub fn compute(
    first: SurveyInput,
    second: SurveyInput,
    config: &PipelineConfig,
) -> Result<PipelineOutput, SpectralIndexError> {
    ensure_distinct_frequencies(first.survey, second.survey)?;

    let reference_header = first.image.header;
    let pixel_scale_arcsec = reference_header
        .pixel_scale_arcsec()
        .map_err(|e| SpectralIndexError::header(InputSlot::First, e))?;
    let reference_wcs = Wcs::from_header(&reference_header)
        .map_err(|e| SpectralIndexError::wcs(InputSlot::First, e))?;
    let second_wcs = Wcs::from_header(&second.image.header)
        .map_err(|e| SpectralIndexError::wcs(InputSlot::Second, e))?;

    let first_floor = first.survey.noise_floor();
    let second_floor = second.survey.noise_floor();
    let first_raster = apply_noise_floor(first.image.data.view(), first_floor);
    let second_raster = apply_noise_floor(second.image.data.view(), second_floor);
    debug!(
        "Applied noise floors {} ({}) and {} ({})",
        first_floor, first.survey, second_floor, second.survey
    );

    let target_shape = first_raster.dim();
    let second_raster = reproject_bilinear(
        second_raster.view(),
        &second_wcs,
        &reference_wcs,
        target_shape,
    )
    .map_err(|e| SpectralIndexError::wcs(InputSlot::Second, e))?;

    let first_beam = first.survey.beam();
    let second_beam = second.survey.beam();
    let limits = config.kernel_limits();
    let mut degraded_beam_matches = Vec::new();

    let mut settle = |slot: InputSlot, outcome: BeamMatch| match outcome {
        BeamMatch::Degraded { raster, reason } => {
            degraded_beam_matches.push((slot, reason));
            raster
        }
        other => other.into_raster(),
    };
    let first_raster = settle(
        InputSlot::First,
        match_beam(first_raster, &first_beam, &second_beam, pixel_scale_arcsec, limits),
    );
    let second_raster = settle(
        InputSlot::Second,
        match_beam(second_raster, &second_beam, &first_beam, pixel_scale_arcsec, limits),
    );

    let pair = order_by_frequency(
        BandImage::new(first.survey, first_raster),
        BandImage::new(second.survey, second_raster),
    );
    let index = spectral_index_of(&pair, config.zero_substitute)?;

    info!(
        "Computed {}x{} spectral index map {} / {}",
        index.ncols(),
        index.nrows(),
        pair.numerator.survey,
        pair.denominator.survey
    );

    Ok(PipelineOutput {
        result: SpectralIndexResult {
            index,
            header: reference_header,
            numerator: pair.numerator.survey,
            denominator: pair.denominator.survey,
        },
        swapped: pair.swapped,
        degraded_beam_matches,
    })
}

/// Load two FITS files, run the pipeline and persist the result.
pub fn run(
    first_path: &Path,
    first_survey: Survey,
    second_path: &Path,
    second_survey: Survey,
    config: &PipelineConfig,
) -> Result<(PipelineOutput, ResultHandle), SpectralIndexError> {
    info!(
        "Spectral index of {} ({}) and {} ({})",
        first_path.display(),
        first_survey,
        second_path.display(),
        second_survey
    );

    ensure_distinct_frequencies(first_survey, second_survey)?;

    let first = SurveyInput::load(first_path, first_survey, InputSlot::First, config)?;
    let second = SurveyInput::load(second_path, second_survey, InputSlot::Second, config)?;

    let output = compute(first, second, config)?;
    let handle = ResultStore::new(&config.output_root).persist(&output.result)?;
    Ok((output, handle))
}

/// A spectral index needs two surveys at different frequencies.
fn ensure_distinct_frequencies(first: Survey, second: Survey) -> Result<(), SpectralIndexError> {
    if first.frequency_mhz() == second.frequency_mhz() {
        return Err(SpectralIndexError::IndistinctFrequencies {
            frequency_mhz: first.frequency_mhz(),
        });
    }
    Ok(())
}

/// Same as [`run`] with survey identifiers given as text.
pub fn run_with_ids(
    first_path: &Path,
    first_survey: &str,
    second_path: &Path,
    second_survey: &str,
    config: &PipelineConfig,
) -> Result<(PipelineOutput, ResultHandle), SpectralIndexError> {
    let first_survey: Survey = first_survey.parse()?;
    let second_survey: Survey = second_survey.parse()?;
    run(first_path, first_survey, second_path, second_survey, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fits_io::AstrometricHeader;
    use crate::wcs::WcsError;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn header(crpix: f64, cdelt_deg: f64) -> AstrometricHeader {
        AstrometricHeader::new()
            .with_text("CTYPE1", "RA---SIN")
            .with_text("CTYPE2", "DEC--SIN")
            .with_float("CRVAL1", 180.0)
            .with_float("CRVAL2", 45.0)
            .with_float("CRPIX1", crpix)
            .with_float("CRPIX2", crpix)
            .with_float("CDELT1", -cdelt_deg)
            .with_float("CDELT2", cdelt_deg)
    }

    fn flat(survey: Survey, value: f64, size: usize, cdelt_deg: f64) -> SurveyInput {
        let center = (size as f64 + 1.0) / 2.0;
        SurveyInput::new(
            survey,
            SkyImage::new(Array2::from_elem((size, size), value), header(center, cdelt_deg)),
        )
    }

    #[test]
    fn test_flat_fields_give_constant_index() {
        // TGSS (150 MHz, 25") and RACS-low (887.5 MHz, 25"): no convolution
        let config = PipelineConfig::default();
        let output = compute(
            flat(Survey::TgssAdr1, 0.8, 16, 0.002),
            flat(Survey::RacsLow, 0.2, 16, 0.002),
            &config,
        )
        .unwrap();

        let expected = (0.2f64 / 0.8).ln() / (887.5f64 / 150.0).ln();
        assert!(output.swapped);
        assert_eq!(output.result.numerator, Survey::RacsLow);
        assert!(output.degraded_beam_matches.is_empty());
        for &a in output.result.index.iter() {
            assert_relative_eq!(a, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_output_takes_reference_shape_and_header() {
        let config = PipelineConfig::default();
        let first = flat(Survey::Vlass, 0.5, 12, 0.0005);
        let second = flat(Survey::First, 0.5, 20, 0.0003);
        let first_header = first.image.header.clone();

        let output = compute(first, second, &config).unwrap();
        assert_eq!(output.result.index.dim(), (12, 12));
        assert_eq!(output.result.header, first_header);
        assert!(!output.swapped);
    }

    #[test]
    fn test_missing_pixel_scale_is_fatal() {
        let mut first = flat(Survey::Vlass, 0.5, 8, 0.0005);
        first.image.header = AstrometricHeader::new()
            .with_text("CTYPE1", "RA---SIN")
            .with_text("CTYPE2", "DEC--SIN");
        let err = compute(first, flat(Survey::Wenss, 0.5, 8, 0.0005), &PipelineConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SpectralIndexError::MissingHeaderKeyword { input: InputSlot::First, ref keyword }
                if keyword == "CDELT2"
        ));
    }

    #[test]
    fn test_equal_frequencies_rejected() {
        let err = compute(
            flat(Survey::Nvss, 0.5, 8, 0.004),
            flat(Survey::First, 0.5, 8, 0.004),
            &PipelineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SpectralIndexError::IndistinctFrequencies { .. }));
    }

    #[test]
    fn test_equal_frequencies_rejected_before_header_checks() {
        // Neither input has a usable WCS; the frequency check must fire first
        let mut nvss = flat(Survey::Nvss, 0.5, 8, 0.004);
        let mut first = flat(Survey::First, 0.5, 8, 0.004);
        nvss.image.header = AstrometricHeader::new();
        first.image.header = AstrometricHeader::new();

        let err = compute(nvss, first, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SpectralIndexError::IndistinctFrequencies { frequency_mhz } if frequency_mhz == 1400.0
        ));
    }

    #[test]
    fn test_frame_mismatch_is_fatal() {
        let j2000 = flat(Survey::Wenss, 0.5, 16, 0.002);
        let mut b1950 = flat(Survey::Nvss, 0.5, 16, 0.002);
        b1950.image.header.set_float("EQUINOX", 1950.0);

        let err = compute(j2000, b1950, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SpectralIndexError::Wcs {
                input: InputSlot::Second,
                source: WcsError::FrameMismatch { .. }
            }
        ));
    }

    #[test]
    fn test_equivalent_frames_are_accepted() {
        let mut icrs = flat(Survey::Wenss, 0.5, 16, 0.002);
        icrs.image.header.set_text("RADESYS", "ICRS");
        let mut fk5 = flat(Survey::Nvss, 0.5, 16, 0.002);
        fk5.image.header.set_float("EQUINOX", 2000.0);

        assert!(compute(icrs, fk5, &PipelineConfig::default()).is_ok());
    }

    #[test]
    fn test_unknown_survey_id() {
        let path = Path::new("unused.fits");
        let err = run_with_ids(path, "lotss-dr2", path, "sumss", &PipelineConfig::default())
            .unwrap_err();
        assert!(matches!(err, SpectralIndexError::UnknownSurvey(_)));
    }
}
