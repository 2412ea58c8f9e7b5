use std::path::Path;

use fitsio::hdu::HduInfo;
use fitsio::FitsFile;
use log::debug;
use ndarray::{ArrayD, IxDyn};

use super::cards::read_cards;
use super::header::{
    is_cfitsio_boilerplate, is_structural_keyword, AstrometricHeader, HeaderValue,
};
use super::FitsIoError;
use crate::sky_image::RawSkyImage;

/// Load the primary image HDU of a FITS file.
///
/// The pixel array keeps the file's full rank in C order (outermost FITS
/// axis first); use [`RawSkyImage::into_sky_image`] to reduce it to 2D.
/// Every header card is kept except the structural ones describing the
/// array layout and scaling, and cfitsio's own boilerplate comments. Files larger than `max_bytes` are rejected before cfitsio opens them.
pub fn load_fits(path: &Path, max_bytes: u64) -> Result<RawSkyImage, FitsIoError> {
    let size = std::fs::metadata(path)
        .map_err(|source| FitsIoError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if size > max_bytes {
        return Err(FitsIoError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_bytes,
        });
    }

    let fits_err = |source| FitsIoError::Fits {
        path: path.to_path_buf(),
        source,
    };

    let mut fptr = FitsFile::open(path).map_err(fits_err)?;
    let hdu = fptr.primary_hdu().map_err(fits_err)?;

    let shape = match &hdu.info {
        HduInfo::ImageInfo { shape, .. } if !shape.is_empty() => shape.clone(),
        _ => {
            return Err(FitsIoError::NotAnImage {
                path: path.to_path_buf(),
            })
        }
    };

    let pixels: Vec<f64> = hdu.read_image(&mut fptr).map_err(fits_err)?;
    let data = ArrayD::from_shape_vec(IxDyn(&shape), pixels).map_err(|source| {
        FitsIoError::Shape {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let header = read_header(&mut fptr).map_err(fits_err)?;
    debug!(
        "Loaded {} with shape {:?} and {} header cards",
        path.display(),
        shape,
        header.len()
    );

    Ok(RawSkyImage::new(data, header))
}

/// Read every non-structural card of the current HDU, in file order.
fn read_header(fptr: &mut FitsFile) -> fitsio::errors::Result<AstrometricHeader> {
    let mut header = AstrometricHeader::new();
    for card in read_cards(fptr)? {
        let keyword = card.keyword.trim().to_ascii_uppercase();
        if is_structural_keyword(&keyword) || keyword == "CONTINUE" {
            continue;
        }
        match HeaderValue::parse_card(&keyword, &card.value, &card.comment) {
            Some(value) if is_cfitsio_boilerplate(&keyword, &value) => {}
            Some(value) => header.set(&keyword, value),
            None => debug!("Skipping header card {} = {}", keyword, card.value),
        }
    }
    Ok(header)
}
