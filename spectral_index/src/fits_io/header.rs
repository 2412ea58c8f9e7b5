//! Astrometric header carried alongside every raster.
//!
//! Every card of an input's primary HDU is kept, in file order, apart from
//! the structural keywords that describe the data array itself. Those are
//! regenerated by the writer for the 2D output. WCS and beam keywords are
//! read back through typed accessors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeaderError {
    #[error("Missing required header keyword '{0}'")]
    MissingKeyword(String),
    #[error("Header keyword '{keyword}' has non-numeric value '{value}'")]
    NotNumeric { keyword: String, value: String },
}

/// Keywords describing the data array, rewritten for every output file.
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "SIMPLE", "BITPIX", "NAXIS", "EXTEND", "PCOUNT", "GCOUNT", "BSCALE", "BZERO", "BLANK",
    "WCSAXES", "END",
];

/// Per-axis WCS keyword stems (`CTYPE3`, `CRVAL4`, ...).
const AXIS_KEYWORD_STEMS: &[&str] = &[
    "CTYPE", "CRVAL", "CRPIX", "CDELT", "CUNIT", "CROTA", "CNAME", "CRDER", "CSYER",
];

/// Commentary keywords, which may repeat and carry free text instead of a value.
const COMMENTARY_KEYWORDS: &[&str] = &["HISTORY", "COMMENT", ""];

/// Fragments of the two `COMMENT` cards cfitsio adds to every primary header.
const CFITSIO_COMMENT_MARKERS: &[&str] = &[
    "FITS (Flexible Image Transport System) format is",
    "and Astrophysics', volume 376, page 359",
];

/// True for the standard `COMMENT` cards cfitsio writes on file creation.
pub fn is_cfitsio_boilerplate(keyword: &str, value: &HeaderValue) -> bool {
    match value {
        HeaderValue::Commentary(text) if keyword.eq_ignore_ascii_case("COMMENT") => {
            CFITSIO_COMMENT_MARKERS.iter().any(|m| text.contains(m))
        }
        _ => false,
    }
}

/// True for keywords that are regenerated from the data array when writing.
pub fn is_structural_keyword(keyword: &str) -> bool {
    let keyword = keyword.trim().to_ascii_uppercase();
    if STRUCTURAL_KEYWORDS.contains(&keyword.as_str()) {
        return true;
    }
    keyword
        .strip_prefix("NAXIS")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// True for WCS keywords that describe axis 3 or higher.
///
/// Covers the per-axis cards (`CTYPE3`, `CDELT4`), the matrix cards
/// `PCi_j`/`CDi_j` with either index above 2, and the projection parameters
/// `PVi_m`/`PSi_m` of an axis above 2.
pub fn is_extra_axis_keyword(keyword: &str) -> bool {
    let keyword = keyword.trim().to_ascii_uppercase();
    let above_two = |digits: &str| {
        !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && digits.parse::<u32>().is_ok_and(|n| n > 2)
    };

    for stem in AXIS_KEYWORD_STEMS {
        if let Some(axis) = keyword.strip_prefix(stem) {
            return above_two(axis);
        }
    }
    for stem in ["PC", "CD"] {
        if let Some((i, j)) = keyword.strip_prefix(stem).and_then(|rest| rest.split_once('_')) {
            return above_two(i) || above_two(j);
        }
    }
    for stem in ["PV", "PS"] {
        if let Some((i, _)) = keyword.strip_prefix(stem).and_then(|rest| rest.split_once('_')) {
            return above_two(i);
        }
    }
    false
}

/// Keyword holding the pixel scale along the declination-like axis.
pub const PIXEL_SCALE_KEYWORD: &str = "CDELT2";

/// Typed header value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeaderValue {
    Float(f64),
    Integer(i64),
    Logical(bool),
    Text(String),
    /// Free text of a `HISTORY`, `COMMENT` or blank-keyword card
    Commentary(String),
}

impl HeaderValue {
    /// Interpret a card as cfitsio reports it: the raw value field and comment.
    ///
    /// Quoted values become [`Text`](Self::Text) with `''` unescaped and
    /// trailing blanks removed, `T`/`F` become logicals, and numbers become
    /// integers or floats (Fortran `D` exponents accepted). Commentary
    /// keywords keep their comment text. Returns `None` for value fields that
    /// fit none of these, such as complex numbers.
    pub fn parse_card(keyword: &str, raw_value: &str, comment: &str) -> Option<Self> {
        let keyword = keyword.trim().to_ascii_uppercase();
        if COMMENTARY_KEYWORDS.contains(&keyword.as_str()) {
            return Some(HeaderValue::Commentary(comment.trim_end().to_string()));
        }

        let raw = raw_value.trim();
        if let Some(quoted) = raw.strip_prefix('\'') {
            let body = quoted.strip_suffix('\'').unwrap_or(quoted);
            return Some(HeaderValue::Text(body.replace("''", "'").trim_end().to_string()));
        }
        match raw {
            "" => None,
            "T" => Some(HeaderValue::Logical(true)),
            "F" => Some(HeaderValue::Logical(false)),
            _ => raw
                .parse::<i64>()
                .map(HeaderValue::Integer)
                .or_else(|_| raw.replace(['D', 'd'], "E").parse::<f64>().map(HeaderValue::Float))
                .ok(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Float(v) => Some(*v),
            HeaderValue::Integer(v) => Some(*v as f64),
            HeaderValue::Text(s) => s.trim().parse().ok(),
            HeaderValue::Logical(_) | HeaderValue::Commentary(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_commentary(&self) -> bool {
        matches!(self, HeaderValue::Commentary(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderCard {
    pub keyword: String,
    pub value: HeaderValue,
}

/// Pixel-scale and WCS metadata of one raster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AstrometricHeader {
    cards: Vec<HeaderCard>,
}

impl AstrometricHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a card, replacing any existing card with the same keyword in place.
    ///
    /// Commentary values are always appended, since those cards repeat.
    pub fn set(&mut self, keyword: &str, value: HeaderValue) {
        let keyword = keyword.to_ascii_uppercase();
        if value.is_commentary() {
            self.cards.push(HeaderCard { keyword, value });
            return;
        }
        match self.cards.iter_mut().find(|c| c.keyword == keyword) {
            Some(card) => card.value = value,
            None => self.cards.push(HeaderCard { keyword, value }),
        }
    }

    /// Append a `HISTORY` card.
    pub fn push_history(&mut self, text: &str) {
        self.set("HISTORY", HeaderValue::Commentary(text.to_string()));
    }

    pub fn set_float(&mut self, keyword: &str, value: f64) {
        self.set(keyword, HeaderValue::Float(value));
    }

    pub fn set_text(&mut self, keyword: &str, value: &str) {
        self.set(keyword, HeaderValue::Text(value.to_string()));
    }

    /// Builder-style variant of [`set_float`](Self::set_float).
    pub fn with_float(mut self, keyword: &str, value: f64) -> Self {
        self.set_float(keyword, value);
        self
    }

    /// Builder-style variant of [`set_text`](Self::set_text).
    pub fn with_text(mut self, keyword: &str, value: &str) -> Self {
        self.set_text(keyword, value);
        self
    }

    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|c| c.keyword.eq_ignore_ascii_case(keyword))
            .map(|c| &c.value)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    /// Numeric value of an optional keyword.
    ///
    /// Returns `Ok(None)` when the keyword is absent and an error when it is
    /// present but cannot be read as a number.
    pub fn float(&self, keyword: &str) -> Result<Option<f64>, HeaderError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(value) => value.as_f64().map(Some).ok_or_else(|| HeaderError::NotNumeric {
                keyword: keyword.to_string(),
                value: format!("{value:?}"),
            }),
        }
    }

    /// Numeric value of a mandatory keyword.
    pub fn require_float(&self, keyword: &str) -> Result<f64, HeaderError> {
        self.float(keyword)?
            .ok_or_else(|| HeaderError::MissingKeyword(keyword.to_string()))
    }

    pub fn text(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(|v| v.as_text())
    }

    /// Pixel scale along the declination-like axis in arcseconds per pixel.
    pub fn pixel_scale_arcsec(&self) -> Result<f64, HeaderError> {
        Ok(self.require_float(PIXEL_SCALE_KEYWORD)?.abs() * 3600.0)
    }

    pub fn cards(&self) -> &[HeaderCard] {
        &self.cards
    }

    /// Drop the WCS cards of axes 3 and above, left over from a cube.
    pub fn retain_celestial_axes(&mut self) {
        self.cards.retain(|c| !is_extra_axis_keyword(&c.keyword));
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
