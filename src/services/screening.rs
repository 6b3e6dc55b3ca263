//! Automated checks on verification photos before an admin sees them.

use image::{ImageFormat, ImageReader};
use std::io::Cursor;

use crate::models::verification::DocumentKind;

/// Smallest accepted photo, in either orientation.
pub const MIN_LONG_EDGE: u32 = 320;
pub const MIN_SHORT_EDGE: u32 = 240;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScreeningError {
    #[error("{0} is not a JPEG, PNG or WebP image")]
    UnsupportedFormat(DocumentKind),

    #[error("{kind} could not be decoded: {detail}")]
    Unreadable { kind: DocumentKind, detail: String },

    #[error("{kind} is {width}x{height}, below the {MIN_LONG_EDGE}x{MIN_SHORT_EDGE} minimum")]
    TooSmall {
        kind: DocumentKind,
        width: u32,
        height: u32,
    },
}

/// Sniff the upload format from its magic bytes.
pub fn detect_format(kind: DocumentKind, bytes: &[u8]) -> Result<ImageFormat, ScreeningError> {
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP)) => Ok(format),
        _ => Err(ScreeningError::UnsupportedFormat(kind)),
    }
}

/// Decode the header of a photo and check its resolution.
/// Returns `(width, height)` on success.
pub fn screen_document(kind: DocumentKind, bytes: &[u8]) -> Result<(u32, u32), ScreeningError> {
    let format = detect_format(kind, bytes)?;

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| ScreeningError::Unreadable {
            kind,
            detail: e.to_string(),
        })?;

    let (long, short) = if width >= height {
        (width, height)
    } else {
        (height, width)
    };
    if long < MIN_LONG_EDGE || short < MIN_SHORT_EDGE {
        return Err(ScreeningError::TooSmall {
            kind,
            width,
            height,
        });
    }

    Ok((width, height))
}
