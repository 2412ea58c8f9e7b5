use std::path::Path;

use fitsio::images::{ImageDescription, ImageType};
use fitsio::FitsFile;
use log::debug;
use ndarray::ArrayView2;

use super::cards::{write_commentary, write_logical};
use super::header::{is_structural_keyword, AstrometricHeader, HeaderValue};
use super::FitsIoError;

/// Write a 2D `f64` raster as the primary HDU of a new FITS file.
///
/// Every card of `header` is written after the structural keywords in the
/// order the header holds them. Structural cards in `header` are skipped,
/// since cfitsio derives them from the image description. Existing files are
/// never overwritten.
pub fn write_fits(
    path: &Path,
    data: ArrayView2<f64>,
    header: &AstrometricHeader,
) -> Result<(), FitsIoError> {
    if path.exists() {
        return Err(FitsIoError::AlreadyExists(path.to_path_buf()));
    }

    let fits_err = |source| FitsIoError::Fits {
        path: path.to_path_buf(),
        source,
    };

    let (height, width) = data.dim();
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &[height, width],
    };

    let mut fptr = FitsFile::create(path)
        .with_custom_primary(&description)
        .open()
        .map_err(fits_err)?;
    let hdu = fptr.primary_hdu().map_err(fits_err)?;

    // Row-major iteration puts NAXIS1 (columns) fastest, as FITS expects
    let pixels: Vec<f64> = data.iter().copied().collect();
    hdu.write_image(&mut fptr, &pixels).map_err(fits_err)?;

    for card in header.cards() {
        if is_structural_keyword(&card.keyword) {
            debug!("Not copying structural card {}", card.keyword);
            continue;
        }
        let written = match &card.value {
            HeaderValue::Float(v) => hdu.write_key(&mut fptr, &card.keyword, *v),
            HeaderValue::Integer(v) => hdu.write_key(&mut fptr, &card.keyword, *v),
            HeaderValue::Text(s) => hdu.write_key(&mut fptr, &card.keyword, s.as_str()),
            HeaderValue::Logical(b) => write_logical(&mut fptr, &card.keyword, *b),
            HeaderValue::Commentary(text) => write_commentary(&mut fptr, &card.keyword, text),
        };
        written.map_err(fits_err)?;
    }

    debug!(
        "Wrote {}x{} raster with {} header cards to {}",
        width,
        height,
        header.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fits_io::load_fits;
    use approx::assert_relative_eq;
    use ndarray::{Array2, Array4, Ix2};
    use tempfile::tempdir;

    fn sample_header() -> AstrometricHeader {
        AstrometricHeader::new()
            .with_text("OBJECT", "3C 123")
            .with_text("CTYPE1", "RA---SIN")
            .with_text("CTYPE2", "DEC--SIN")
            .with_float("CRVAL1", 69.27)
            .with_float("CRVAL2", 29.67)
            .with_float("CRPIX1", 4.0)
            .with_float("CRPIX2", 3.0)
            .with_float("CDELT1", -0.0004)
            .with_float("CDELT2", 0.0004)
            .with_text("BUNIT", "JY/BEAM")
    }

    #[test]
    fn test_write_then_load_preserves_pixels_and_cards() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.fits");
        let data = Array2::from_shape_fn((5, 7), |(r, c)| r as f64 * 10.0 + c as f64 + 0.25);
        let header = sample_header();

        write_fits(&path, data.view(), &header).unwrap();
        let loaded = load_fits(&path, u64::MAX).unwrap();

        assert_eq!(loaded.data.shape(), &[5, 7]);
        let loaded_2d = loaded.data.into_dimensionality::<Ix2>().unwrap();
        for (a, b) in loaded_2d.iter().zip(data.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }

        assert_eq!(loaded.header.text("OBJECT"), Some("3C 123"));
        assert_eq!(loaded.header.text("CTYPE1"), Some("RA---SIN"));
        assert_relative_eq!(
            loaded.header.float("CDELT2").unwrap().unwrap(),
            0.0004,
            epsilon = 1e-15
        );
        assert!(!loaded.header.contains("CD1_1"));
    }

    #[test]
    fn test_every_card_survives_a_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("full_header.fits");
        let mut header = sample_header()
            .with_float("PV2_1", 0.0)
            .with_float("PV2_2", 0.0)
            .with_text("BTYPE", "Intensity")
            .with_float("RESTFRQ", 1.4e9)
            .with_text("SPECSYS", "LSRK");
        header.set("WSCIMGWG", HeaderValue::Integer(4096));
        header.set("WSCNORMF", HeaderValue::Logical(true));
        header.push_history("Cleaned to 3 sigma");
        header.push_history("Primary beam corrected");
        header.set("COMMENT", HeaderValue::Commentary("Synthetic test field".to_string()));

        write_fits(&path, Array2::<f64>::ones((3, 3)).view(), &header).unwrap();
        let loaded = load_fits(&path, u64::MAX).unwrap().header;

        assert_eq!(loaded.float("PV2_1").unwrap(), Some(0.0));
        assert!(loaded.contains("PV2_2"));
        assert_eq!(loaded.text("BTYPE"), Some("Intensity"));
        assert_relative_eq!(loaded.float("RESTFRQ").unwrap().unwrap(), 1.4e9, max_relative = 1e-12);
        assert_eq!(loaded.text("SPECSYS"), Some("LSRK"));
        assert_eq!(loaded.get("WSCIMGWG"), Some(&HeaderValue::Integer(4096)));
        assert_eq!(loaded.get("WSCNORMF"), Some(&HeaderValue::Logical(true)));

        let history: Vec<_> = loaded
            .cards()
            .iter()
            .filter(|c| c.keyword == "HISTORY")
            .map(|c| c.value.clone())
            .collect();
        assert_eq!(
            history,
            vec![
                HeaderValue::Commentary("Cleaned to 3 sigma".to_string()),
                HeaderValue::Commentary("Primary beam corrected".to_string()),
            ]
        );
        let comments: Vec<_> = loaded.cards().iter().filter(|c| c.keyword == "COMMENT").collect();
        assert_eq!(comments.len(), 1);
        assert_eq!(
            comments[0].value,
            HeaderValue::Commentary("Synthetic test field".to_string())
        );

        // Input order is preserved
        let position = |k: &str| loaded.cards().iter().position(|c| c.keyword == k).unwrap();
        assert!(position("OBJECT") < position("CTYPE1"));
        assert!(position("CTYPE1") < position("PV2_1"));
        assert!(position("PV2_1") < position("BTYPE"));
    }

    #[test]
    fn test_structural_cards_are_not_copied() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("structural.fits");
        let header = sample_header()
            .with_float("NAXIS3", 1.0)
            .with_float("BITPIX", 16.0)
            .with_float("BZERO", 32768.0);

        let data = Array2::from_elem((2, 3), 7.5);
        write_fits(&path, data.view(), &header).unwrap();
        let loaded = load_fits(&path, u64::MAX).unwrap();

        assert_eq!(loaded.data.shape(), &[2, 3]);
        assert!(loaded.data.iter().all(|&v| v == 7.5));
        for keyword in ["SIMPLE", "BITPIX", "NAXIS", "NAXIS1", "NAXIS3", "BZERO", "EXTEND"] {
            assert!(!loaded.header.contains(keyword), "{keyword}");
        }
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("once.fits");
        let data = Array2::<f64>::zeros((2, 2));

        write_fits(&path, data.view(), &sample_header()).unwrap();
        let err = write_fits(&path, data.view(), &sample_header()).unwrap_err();
        assert!(matches!(err, FitsIoError::AlreadyExists(_)));
    }

    #[test]
    fn test_load_keeps_full_rank() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cube.fits");

        let cube = Array4::from_shape_fn((1, 1, 3, 4), |(_, _, r, c)| (r * 4 + c) as f64);
        let description = ImageDescription {
            data_type: ImageType::Double,
            dimensions: &[1, 1, 3, 4],
        };
        let mut fptr = FitsFile::create(&path)
            .with_custom_primary(&description)
            .open()
            .unwrap();
        let hdu = fptr.primary_hdu().unwrap();
        let pixels: Vec<f64> = cube.iter().copied().collect();
        hdu.write_image(&mut fptr, &pixels).unwrap();
        drop(fptr);

        let loaded = load_fits(&path, u64::MAX).unwrap();
        assert_eq!(loaded.data.shape(), &[1, 1, 3, 4]);
        let image = loaded.into_sky_image().unwrap();
        assert_eq!(image.shape(), (3, 4));
        assert_eq!(image.data[[2, 3]], 11.0);
    }

    #[test]
    fn test_size_cap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.fits");
        let data = Array2::<f64>::zeros((16, 16));
        write_fits(&path, data.view(), &sample_header()).unwrap();

        let err = load_fits(&path, 100).unwrap_err();
        assert!(matches!(err, FitsIoError::TooLarge { limit: 100, .. }));
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.fits");
        std::fs::write(&path, b"this is not a FITS file").unwrap();

        let err = load_fits(&path, u64::MAX).unwrap_err();
        assert!(matches!(err, FitsIoError::Fits { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_fits(&dir.path().join("absent.fits"), u64::MAX).unwrap_err();
        assert!(matches!(err, FitsIoError::Io { .. }));
    }
}
