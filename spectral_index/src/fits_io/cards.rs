//! Card-level header access through cfitsio.
//!
//! The safe `fitsio` API reads and writes keywords by name. Copying a header
//! wholesale needs the card count, positional reads, and the logical and
//! commentary writers, which are only reachable through `fitsio::sys`.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

use fitsio::errors::check_status;
use fitsio::{sys, FitsFile};

/// Buffer length of one FITS card including the terminating NUL.
const CARD_BUFFER: usize = 81;

/// One header card as cfitsio reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCard {
    pub keyword: String,
    /// Value field exactly as written, quotes included
    pub value: String,
    pub comment: String,
}

/// Read every card of the current HDU in file order.
pub fn read_cards(fptr: &mut FitsFile) -> fitsio::errors::Result<Vec<RawCard>> {
    let mut status: c_int = 0;
    let mut count: c_int = 0;
    let mut more: c_int = 0;
    unsafe {
        sys::ffghsp(fptr.as_raw(), &mut count, &mut more, &mut status);
    }
    check_status(status)?;

    let mut cards = Vec::with_capacity(count.max(0) as usize);
    for index in 1..=count {
        let mut keyword = [0 as c_char; CARD_BUFFER];
        let mut value = [0 as c_char; CARD_BUFFER];
        let mut comment = [0 as c_char; CARD_BUFFER];
        unsafe {
            sys::ffgkyn(
                fptr.as_raw(),
                index,
                keyword.as_mut_ptr(),
                value.as_mut_ptr(),
                comment.as_mut_ptr(),
                &mut status,
            );
        }
        check_status(status)?;
        cards.push(RawCard {
            keyword: buffer_to_string(&keyword),
            value: buffer_to_string(&value),
            comment: buffer_to_string(&comment),
        });
    }
    Ok(cards)
}

/// Append a logical (`T`/`F`) keyword to the current HDU.
pub fn write_logical(fptr: &mut FitsFile, keyword: &str, value: bool) -> fitsio::errors::Result<()> {
    let keyword = to_c_string(keyword)?;
    let mut status: c_int = 0;
    unsafe {
        sys::ffpkyl(
            fptr.as_raw(),
            keyword.as_ptr(),
            c_int::from(value),
            std::ptr::null(),
            &mut status,
        );
    }
    check_status(status)
}

/// Append a commentary card.
///
/// `HISTORY` and `COMMENT` go through cfitsio's own writers, which wrap long
/// text over several cards. Any other keyword, including a blank one, is
/// written as a single raw record truncated to the 80 column card width.
pub fn write_commentary(fptr: &mut FitsFile, keyword: &str, text: &str) -> fitsio::errors::Result<()> {
    let mut status: c_int = 0;
    match keyword {
        "HISTORY" => {
            let text = to_c_string(text)?;
            unsafe {
                sys::ffphis(fptr.as_raw(), text.as_ptr(), &mut status);
            }
        }
        "COMMENT" => {
            let text = to_c_string(text)?;
            unsafe {
                sys::ffpcom(fptr.as_raw(), text.as_ptr(), &mut status);
            }
        }
        _ => {
            let record: String = format!("{keyword:<8}{text}").chars().take(CARD_BUFFER - 1).collect();
            let record = to_c_string(&record)?;
            unsafe {
                sys::ffprec(fptr.as_raw(), record.as_ptr(), &mut status);
            }
        }
    }
    check_status(status)
}

fn buffer_to_string(buffer: &[c_char; CARD_BUFFER]) -> String {
    // cfitsio always NUL-terminates within the buffer
    unsafe { CStr::from_ptr(buffer.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

fn to_c_string(text: &str) -> fitsio::errors::Result<CString> {
    CString::new(text).map_err(fitsio::errors::Error::from)
}
