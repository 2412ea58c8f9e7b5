//! World Coordinate System for the two celestial axes of a survey image.
//!
//! Implements the FITS WCS zenithal projections used by radio survey
//! cutouts (`TAN`, `SIN`, `ARC`):
//!
//! 1. Pixel to intermediate: `(x, y) = M × (p - CRPIX)` in degrees
//! 2. Intermediate to native spherical `(phi, theta)` via the projection
//! 3. Native to celestial `(RA, Dec)` by rotating the native pole onto
//!    `(CRVAL1, CRVAL2)` with `LONPOLE` (default 180 deg)
//!
//! Pixel coordinates are FITS 1-based: the centre of array element
//! `[row, col]` is pixel `(col + 1, row + 1)`.
//!
//! Each solution also records its celestial frame (equatorial with a
//! reference system and equinox, galactic or ecliptic). Two grids can only be
//! resampled onto each other when their frames agree; no frame conversion is
//! attempted.

use std::fmt;

use thiserror::Error;

use crate::fits_io::header::{AstrometricHeader, HeaderError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WcsError {
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error("Unsupported projection in CTYPE '{0}' (expected TAN, SIN or ARC)")]
    UnsupportedProjection(String),
    #[error("Linear transform matrix is singular (det = {0})")]
    SingularMatrix(f64),
    #[error("Unsupported celestial axes CTYPE1 = '{ctype1}', CTYPE2 = '{ctype2}'")]
    UnsupportedAxes { ctype1: String, ctype2: String },
    #[error("Celestial frame {other} does not match reference frame {reference}")]
    FrameMismatch {
        reference: CelestialFrame,
        other: CelestialFrame,
    },
}

/// Equinox at or after which an equatorial frame without `RADESYS` is FK5.
const FK5_EQUINOX_CUTOFF: f64 = 1984.0;

/// Coordinate frame of the two celestial axes.
#[derive(Debug, Clone, PartialEq)]
pub enum CelestialFrame {
    /// RA/Dec in a reference system (`ICRS`, `FK5`, `FK4`, ...) and, for
    /// the systems that have one, an equinox in years
    Equatorial {
        radesys: String,
        equinox: Option<f64>,
    },
    Galactic,
    /// Ecliptic longitude/latitude of the given equinox
    Ecliptic { equinox: f64 },
}

impl CelestialFrame {
    /// ICRS, the frame assumed for solutions built without a header.
    pub fn icrs() -> Self {
        CelestialFrame::Equatorial {
            radesys: "ICRS".to_string(),
            equinox: None,
        }
    }

    /// Frame named by the `CTYPE1`/`CTYPE2` pair, `RADESYS` and `EQUINOX`.
    ///
    /// Follows the FITS defaults: without `RADESYS` an equinox before 1984
    /// means FK4 and any later one FK5, and no equinox at all means ICRS.
    /// Without `EQUINOX` (or the older `EPOCH`) FK4 is B1950 and FK5 J2000.
    pub fn from_header(header: &AstrometricHeader) -> Result<Self, WcsError> {
        let ctype1 = header
            .text("CTYPE1")
            .ok_or_else(|| HeaderError::MissingKeyword("CTYPE1".to_string()))?;
        let ctype2 = header
            .text("CTYPE2")
            .ok_or_else(|| HeaderError::MissingKeyword("CTYPE2".to_string()))?;

        let equinox = match header.float("EQUINOX")? {
            Some(equinox) => Some(equinox),
            None => header.float("EPOCH")?,
        };

        let axis = |ctype: &str| ctype.trim().split('-').next().unwrap_or("").to_ascii_uppercase();
        match (axis(ctype1).as_str(), axis(ctype2).as_str()) {
            ("RA", "DEC") => {
                let radesys = header
                    .text("RADESYS")
                    .or_else(|| header.text("RADECSYS"))
                    .map(|s| s.trim().to_ascii_uppercase())
                    .unwrap_or_else(|| match equinox {
                        Some(e) if e < FK5_EQUINOX_CUTOFF => "FK4".to_string(),
                        Some(_) => "FK5".to_string(),
                        None => "ICRS".to_string(),
                    });
                let equinox = match radesys.as_str() {
                    "ICRS" => None,
                    "FK4" | "FK4-NO-E" => Some(equinox.unwrap_or(1950.0)),
                    _ => Some(equinox.unwrap_or(2000.0)),
                };
                Ok(CelestialFrame::Equatorial { radesys, equinox })
            }
            ("GLON", "GLAT") => Ok(CelestialFrame::Galactic),
            ("ELON", "ELAT") => Ok(CelestialFrame::Ecliptic {
                equinox: equinox.unwrap_or(2000.0),
            }),
            _ => Err(WcsError::UnsupportedAxes {
                ctype1: ctype1.to_string(),
                ctype2: ctype2.to_string(),
            }),
        }
    }

    /// Whether positions in `self` and `other` can be used interchangeably.
    ///
    /// Identical frames match. ICRS and FK5 J2000 differ by tens of
    /// milliarcseconds, far below any survey pixel, and are treated as equal.
    pub fn matches(&self, other: &CelestialFrame) -> bool {
        self == other || (self.is_icrs_like() && other.is_icrs_like())
    }

    fn is_icrs_like(&self) -> bool {
        match self {
            CelestialFrame::Equatorial { radesys, equinox } => {
                radesys == "ICRS" || (radesys == "FK5" && *equinox == Some(2000.0))
            }
            _ => false,
        }
    }
}

impl fmt::Display for CelestialFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CelestialFrame::Equatorial {
                radesys,
                equinox: Some(equinox),
            } => write!(f, "{radesys} equinox {equinox}"),
            CelestialFrame::Equatorial { radesys, equinox: None } => write!(f, "{radesys}"),
            CelestialFrame::Galactic => write!(f, "galactic"),
            CelestialFrame::Ecliptic { equinox } => write!(f, "ecliptic equinox {equinox}"),
        }
    }
}

/// Zenithal projection type taken from the CTYPE suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Gnomonic
    Tan,
    /// Orthographic / slant orthographic
    Sin,
    /// Zenithal equidistant
    Arc,
}

impl Projection {
    /// Parse the projection code from a CTYPE value such as `RA---SIN`.
    pub fn from_ctype(ctype: &str) -> Result<Self, WcsError> {
        let code = ctype.trim().rsplit('-').next().unwrap_or("");
        match code.to_ascii_uppercase().as_str() {
            "TAN" => Ok(Projection::Tan),
            "SIN" => Ok(Projection::Sin),
            "ARC" => Ok(Projection::Arc),
            _ => Err(WcsError::UnsupportedProjection(ctype.to_string())),
        }
    }

    /// Native latitude (degrees) for intermediate coordinates (degrees).
    fn native_theta(&self, r_deg: f64) -> Option<f64> {
        let r_rad = r_deg.to_radians();
        match self {
            Projection::Tan => Some(1f64.atan2(r_rad).to_degrees()),
            Projection::Sin => (r_rad <= 1.0).then(|| r_rad.acos().to_degrees()),
            Projection::Arc => (r_deg <= 180.0).then_some(90.0 - r_deg),
        }
    }

    /// Radial distance in the projection plane (degrees) for native latitude.
    fn radius(&self, theta_deg: f64) -> Option<f64> {
        let theta = theta_deg.to_radians();
        match self {
            Projection::Tan => (theta > 0.0).then(|| (theta.cos() / theta.sin()).to_degrees()),
            Projection::Sin => (theta >= 0.0).then(|| theta.cos().to_degrees()),
            Projection::Arc => Some(90.0 - theta_deg),
        }
    }
}

/// Celestial WCS solution of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Wcs {
    /// Reference pixel (CRPIX1, CRPIX2), 1-based
    pub crpix: (f64, f64),
    /// Reference sky coordinates in degrees (CRVAL1, CRVAL2)
    pub crval: (f64, f64),
    /// Pixel offset to intermediate coordinates in degrees
    pub matrix: [[f64; 2]; 2],
    pub projection: Projection,
    /// Native longitude of the celestial pole in degrees
    pub lonpole: f64,
    pub frame: CelestialFrame,
}

impl Wcs {
    /// Create an ICRS WCS from an explicit linear matrix.
    pub fn new(
        crpix: (f64, f64),
        crval: (f64, f64),
        matrix: [[f64; 2]; 2],
        projection: Projection,
    ) -> Result<Self, WcsError> {
        let det = determinant(&matrix);
        if det.abs() < 1e-30 || !det.is_finite() {
            return Err(WcsError::SingularMatrix(det));
        }
        Ok(Self {
            crpix,
            crval,
            matrix,
            projection,
            lonpole: 180.0,
            frame: CelestialFrame::icrs(),
        })
    }

    /// Create an axis-aligned WCS with RA increasing to the left.
    ///
    /// `pixel_scale_arcsec` is the absolute size of a pixel on both axes.
    pub fn from_scale(
        crpix: (f64, f64),
        crval: (f64, f64),
        pixel_scale_arcsec: f64,
        projection: Projection,
    ) -> Result<Self, WcsError> {
        let scale = pixel_scale_arcsec / 3600.0;
        Self::new(crpix, crval, [[-scale, 0.0], [0.0, scale]], projection)
    }

    /// Derive the WCS from header cards.
    ///
    /// The linear part is taken from `CDi_j` when present, otherwise from
    /// `PCi_j` scaled by `CDELTi`, otherwise from `CDELTi` and `CROTA2`.
    pub fn from_header(header: &AstrometricHeader) -> Result<Self, WcsError> {
        let ctype1 = header
            .text("CTYPE1")
            .ok_or_else(|| HeaderError::MissingKeyword("CTYPE1".to_string()))?;
        let projection = Projection::from_ctype(ctype1)?;

        let crpix = (
            header.require_float("CRPIX1")?,
            header.require_float("CRPIX2")?,
        );
        let crval = (
            header.require_float("CRVAL1")?,
            header.require_float("CRVAL2")?,
        );

        let matrix = if header.contains("CD1_1") || header.contains("CD2_2") {
            [
                [
                    header.float("CD1_1")?.unwrap_or(0.0),
                    header.float("CD1_2")?.unwrap_or(0.0),
                ],
                [
                    header.float("CD2_1")?.unwrap_or(0.0),
                    header.float("CD2_2")?.unwrap_or(0.0),
                ],
            ]
        } else {
            let cdelt1 = header.require_float("CDELT1")?;
            let cdelt2 = header.require_float("CDELT2")?;

            if header.contains("PC1_1") || header.contains("PC2_2") {
                let pc = [
                    [
                        header.float("PC1_1")?.unwrap_or(1.0),
                        header.float("PC1_2")?.unwrap_or(0.0),
                    ],
                    [
                        header.float("PC2_1")?.unwrap_or(0.0),
                        header.float("PC2_2")?.unwrap_or(1.0),
                    ],
                ];
                [
                    [cdelt1 * pc[0][0], cdelt1 * pc[0][1]],
                    [cdelt2 * pc[1][0], cdelt2 * pc[1][1]],
                ]
            } else {
                let (sin_r, cos_r) = header
                    .float("CROTA2")?
                    .unwrap_or(0.0)
                    .to_radians()
                    .sin_cos();
                [
                    [cdelt1 * cos_r, -cdelt2 * sin_r],
                    [cdelt1 * sin_r, cdelt2 * cos_r],
                ]
            }
        };

        let mut wcs = Self::new(crpix, crval, matrix, projection)?;
        if let Some(lonpole) = header.float("LONPOLE")? {
            wcs.lonpole = lonpole;
        }
        wcs.frame = CelestialFrame::from_header(header)?;
        Ok(wcs)
    }

    /// Fail unless `other` shares this solution's celestial frame.
    pub fn ensure_same_frame(&self, other: &Wcs) -> Result<(), WcsError> {
        if self.frame.matches(&other.frame) {
            Ok(())
        } else {
            Err(WcsError::FrameMismatch {
                reference: self.frame.clone(),
                other: other.frame.clone(),
            })
        }
    }

    /// Convert 1-based pixel coordinates to (RA, Dec) in degrees.
    ///
    /// Returns `None` when the pixel lies outside the projection's domain.
    pub fn pixel_to_world(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let dx = x - self.crpix.0;
        let dy = y - self.crpix.1;
        let ix = self.matrix[0][0] * dx + self.matrix[0][1] * dy;
        let iy = self.matrix[1][0] * dx + self.matrix[1][1] * dy;

        let r = ix.hypot(iy);
        let phi = if r == 0.0 { 0.0 } else { ix.atan2(-iy) };
        let theta = self.projection.native_theta(r)?.to_radians();

        let (sin_dp, cos_dp) = self.crval.1.to_radians().sin_cos();
        let dphi = phi - self.lonpole.to_radians();
        let (sin_t, cos_t) = theta.sin_cos();

        let sin_dec = (sin_t * sin_dp + cos_t * cos_dp * dphi.cos()).clamp(-1.0, 1.0);
        let ra = self.crval.0.to_radians()
            + (-cos_t * dphi.sin()).atan2(sin_t * cos_dp - cos_t * sin_dp * dphi.cos());

        Some((normalize_ra(ra.to_degrees()), sin_dec.asin().to_degrees()))
    }

    /// Convert (RA, Dec) in degrees to 1-based pixel coordinates.
    ///
    /// Returns `None` for sky positions the projection cannot represent,
    /// such as the far hemisphere of a `SIN` or `TAN` projection.
    pub fn world_to_pixel(&self, ra: f64, dec: f64) -> Option<(f64, f64)> {
        let (sin_d, cos_d) = dec.to_radians().sin_cos();
        let (sin_dp, cos_dp) = self.crval.1.to_radians().sin_cos();
        let dra = (ra - self.crval.0).to_radians();
        let (sin_dra, cos_dra) = dra.sin_cos();

        let sin_theta = (sin_d * sin_dp + cos_d * cos_dp * cos_dra).clamp(-1.0, 1.0);
        let theta = sin_theta.asin().to_degrees();
        let phi = self.lonpole.to_radians()
            + (-cos_d * sin_dra).atan2(sin_d * cos_dp - cos_d * sin_dp * cos_dra);

        let r = self.projection.radius(theta)?;
        let ix = r * phi.sin();
        let iy = -r * phi.cos();

        let m = &self.matrix;
        let det = determinant(m);
        let dx = (m[1][1] * ix - m[0][1] * iy) / det;
        let dy = (-m[1][0] * ix + m[0][0] * iy) / det;

        Some((self.crpix.0 + dx, self.crpix.1 + dy))
    }

    /// Mean pixel scale of the two axes in arcseconds.
    pub fn pixel_scale_arcsec(&self) -> f64 {
        let scale_x = self.matrix[0][0].hypot(self.matrix[1][0]);
        let scale_y = self.matrix[0][1].hypot(self.matrix[1][1]);
        (scale_x + scale_y) / 2.0 * 3600.0
    }
}

fn determinant(m: &[[f64; 2]; 2]) -> f64 {
    m[0][0] * m[1][1] - m[0][1] * m[1][0]
}

fn normalize_ra(ra: f64) -> f64 {
    let wrapped = ra.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TOLERANCE: f64 = 1e-9;

    /// Header cards describing an ICRS solution.
    fn to_header(wcs: &Wcs) -> AstrometricHeader {
        let code = match wcs.projection {
            Projection::Tan => "TAN",
            Projection::Sin => "SIN",
            Projection::Arc => "ARC",
        };
        AstrometricHeader::new()
            .with_text("CTYPE1", &format!("RA---{code}"))
            .with_text("CTYPE2", &format!("DEC--{code}"))
            .with_text("RADESYS", "ICRS")
            .with_float("CRVAL1", wcs.crval.0)
            .with_float("CRVAL2", wcs.crval.1)
            .with_float("CRPIX1", wcs.crpix.0)
            .with_float("CRPIX2", wcs.crpix.1)
            .with_float("CD1_1", wcs.matrix[0][0])
            .with_float("CD1_2", wcs.matrix[0][1])
            .with_float("CD2_1", wcs.matrix[1][0])
            .with_float("CD2_2", wcs.matrix[1][1])
            .with_float("CDELT1", wcs.matrix[0][0])
            .with_float("CDELT2", wcs.matrix[1][1])
    }

    fn survey_header(ctype_code: &str) -> AstrometricHeader {
        AstrometricHeader::new()
            .with_text("CTYPE1", &format!("RA---{ctype_code}"))
            .with_text("CTYPE2", &format!("DEC--{ctype_code}"))
            .with_float("CRVAL1", 150.0)
            .with_float("CRVAL2", 30.0)
            .with_float("CRPIX1", 51.0)
            .with_float("CRPIX2", 51.0)
            .with_float("CDELT1", -1.5 / 3600.0)
            .with_float("CDELT2", 1.5 / 3600.0)
    }

    #[test]
    fn test_reference_pixel_maps_to_reference_value() {
        for code in ["TAN", "SIN", "ARC"] {
            let wcs = Wcs::from_header(&survey_header(code)).unwrap();
            let (ra, dec) = wcs.pixel_to_world(51.0, 51.0).unwrap();
            assert_abs_diff_eq!(ra, 150.0, epsilon = TOLERANCE);
            assert_abs_diff_eq!(dec, 30.0, epsilon = TOLERANCE);
        }
    }

    #[test]
    fn test_round_trip_all_projections() {
        for code in ["TAN", "SIN", "ARC"] {
            let wcs = Wcs::from_header(&survey_header(code)).unwrap();
            for (x, y) in [(1.0, 1.0), (20.5, 80.0), (100.0, 3.0), (51.0, 51.0)] {
                let (ra, dec) = wcs.pixel_to_world(x, y).unwrap();
                let (x2, y2) = wcs.world_to_pixel(ra, dec).unwrap();
                assert_abs_diff_eq!(x, x2, epsilon = 1e-7);
                assert_abs_diff_eq!(y, y2, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn test_ra_increases_to_the_left() {
        let wcs = Wcs::from_header(&survey_header("SIN")).unwrap();
        let (ra_left, _) = wcs.pixel_to_world(41.0, 51.0).unwrap();
        let (ra_right, _) = wcs.pixel_to_world(61.0, 51.0).unwrap();
        assert!(ra_left > ra_right);

        let (_, dec_up) = wcs.pixel_to_world(51.0, 61.0).unwrap();
        assert!(dec_up > 30.0);
    }

    #[test]
    fn test_small_offset_matches_pixel_scale() {
        let wcs = Wcs::from_header(&survey_header("TAN")).unwrap();
        let (_, dec) = wcs.pixel_to_world(51.0, 52.0).unwrap();
        assert_abs_diff_eq!((dec - 30.0) * 3600.0, 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(wcs.pixel_scale_arcsec(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cd_matrix_takes_precedence() {
        let header = survey_header("TAN")
            .with_float("CD1_1", -2.0 / 3600.0)
            .with_float("CD2_2", 2.0 / 3600.0);
        let wcs = Wcs::from_header(&header).unwrap();
        assert_abs_diff_eq!(wcs.pixel_scale_arcsec(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_crota2_rotation() {
        let header = survey_header("TAN").with_float("CROTA2", 90.0);
        let wcs = Wcs::from_header(&header).unwrap();
        // With a 90 degree rotation, stepping along +x moves in declination
        let (ra, dec) = wcs.pixel_to_world(52.0, 51.0).unwrap();
        assert_abs_diff_eq!(ra, 150.0, epsilon = 1e-6);
        assert!((dec - 30.0).abs() > 1e-4);
    }

    #[test]
    fn test_far_hemisphere_is_unrepresentable() {
        let wcs = Wcs::from_header(&survey_header("SIN")).unwrap();
        assert!(wcs.world_to_pixel(330.0, -30.0).is_none());
    }

    #[test]
    fn test_unsupported_projection() {
        let header = survey_header("TAN").with_text("CTYPE1", "RA---CAR");
        assert_eq!(
            Wcs::from_header(&header),
            Err(WcsError::UnsupportedProjection("RA---CAR".to_string()))
        );
    }

    #[test]
    fn test_missing_reference_value() {
        let header = AstrometricHeader::new()
            .with_text("CTYPE1", "RA---SIN")
            .with_float("CRPIX1", 1.0)
            .with_float("CRPIX2", 1.0);
        assert_eq!(
            Wcs::from_header(&header),
            Err(WcsError::Header(HeaderError::MissingKeyword(
                "CRVAL1".to_string()
            )))
        );
    }

    #[test]
    fn test_header_round_trip() {
        let wcs = Wcs::from_scale((10.0, 20.0), (45.0, -10.0), 3.0, Projection::Sin).unwrap();
        let header = to_header(&wcs);
        let parsed = Wcs::from_header(&header).unwrap();
        assert_eq!(parsed, wcs);
        assert_abs_diff_eq!(header.pixel_scale_arcsec().unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_defaults_follow_equinox() {
        let frame = |header: AstrometricHeader| CelestialFrame::from_header(&header).unwrap();

        assert_eq!(frame(survey_header("SIN")), CelestialFrame::icrs());
        assert_eq!(
            frame(survey_header("SIN").with_float("EQUINOX", 1950.0)),
            CelestialFrame::Equatorial {
                radesys: "FK4".to_string(),
                equinox: Some(1950.0)
            }
        );
        assert_eq!(
            frame(survey_header("SIN").with_float("EPOCH", 2000.0)),
            CelestialFrame::Equatorial {
                radesys: "FK5".to_string(),
                equinox: Some(2000.0)
            }
        );
        assert_eq!(
            frame(survey_header("SIN").with_text("RADESYS", "fk5")),
            CelestialFrame::Equatorial {
                radesys: "FK5".to_string(),
                equinox: Some(2000.0)
            }
        );
        assert_eq!(
            frame(
                survey_header("SIN")
                    .with_text("RADESYS", "ICRS")
                    .with_float("EQUINOX", 2000.0)
            ),
            CelestialFrame::icrs()
        );
    }

    #[test]
    fn test_galactic_and_ecliptic_axes() {
        let galactic = survey_header("TAN")
            .with_text("CTYPE1", "GLON-TAN")
            .with_text("CTYPE2", "GLAT-TAN");
        assert_eq!(Wcs::from_header(&galactic).unwrap().frame, CelestialFrame::Galactic);

        let ecliptic = survey_header("TAN")
            .with_text("CTYPE1", "ELON-TAN")
            .with_text("CTYPE2", "ELAT-TAN");
        assert_eq!(
            Wcs::from_header(&ecliptic).unwrap().frame,
            CelestialFrame::Ecliptic { equinox: 2000.0 }
        );
    }

    #[test]
    fn test_mixed_or_swapped_axes_rejected() {
        for (c1, c2) in [("RA---TAN", "GLAT-TAN"), ("DEC--TAN", "RA---TAN")] {
            let header = survey_header("TAN").with_text("CTYPE1", c1).with_text("CTYPE2", c2);
            assert!(matches!(
                Wcs::from_header(&header),
                Err(WcsError::UnsupportedAxes { .. })
            ));
        }
    }

    #[test]
    fn test_missing_ctype2() {
        let header = AstrometricHeader::new()
            .with_text("CTYPE1", "RA---SIN")
            .with_float("CRVAL1", 150.0)
            .with_float("CRVAL2", 30.0)
            .with_float("CRPIX1", 1.0)
            .with_float("CRPIX2", 1.0)
            .with_float("CDELT1", -0.001)
            .with_float("CDELT2", 0.001);
        assert_eq!(
            Wcs::from_header(&header),
            Err(WcsError::Header(HeaderError::MissingKeyword(
                "CTYPE2".to_string()
            )))
        );
    }

    #[test]
    fn test_frame_comparison() {
        let j2000 = Wcs::from_header(&survey_header("SIN").with_float("EQUINOX", 2000.0)).unwrap();
        let icrs = Wcs::from_header(&survey_header("SIN").with_text("RADESYS", "ICRS")).unwrap();
        let b1950 = Wcs::from_header(&survey_header("SIN").with_float("EQUINOX", 1950.0)).unwrap();
        let mut galactic = icrs.clone();
        galactic.frame = CelestialFrame::Galactic;

        assert!(j2000.ensure_same_frame(&icrs).is_ok());
        assert!(icrs.ensure_same_frame(&j2000).is_ok());
        assert!(b1950.ensure_same_frame(&b1950.clone()).is_ok());

        let err = j2000.ensure_same_frame(&b1950).unwrap_err();
        assert!(matches!(err, WcsError::FrameMismatch { .. }));
        assert!(err.to_string().contains("FK4 equinox 1950"));
        assert!(icrs.ensure_same_frame(&galactic).is_err());
    }

    #[test]
    fn test_ra_wraps_at_zero() {
        let wcs = Wcs::from_scale((51.0, 51.0), (0.0, 10.0), 60.0, Projection::Tan).unwrap();
        let (ra, _) = wcs.pixel_to_world(52.0, 51.0).unwrap();
        assert!(ra > 359.0 && ra < 360.0);
        let (x, _) = wcs.world_to_pixel(ra, 10.0).unwrap();
        assert_abs_diff_eq!(x, 52.0, epsilon = 1e-7);
    }
}
