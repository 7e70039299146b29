use thiserror::Error;

use crate::image_pipeline::frame::FourCc;

/// Status code reported for frames whose pixel layout cannot be wrapped
/// (only uncompressed packed 32-bit formats are accepted).
pub const UNSUPPORTED_PIXEL_FORMAT_CODE: i32 = -95014;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Unsupported pixel format: {0} (only packed 32-bit ARGB/BGRA)")]
    UnsupportedPixelFormat(FourCc),

    #[error("Failed to allocate {0} bytes for image canvas")]
    ResourceExhausted(usize),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid row stride: {bytes_per_row} bytes for width {width} ({reason})")]
    InvalidStride {
        width: usize,
        bytes_per_row: usize,
        reason: &'static str,
    },

    #[error("Rotation angle must be finite, got {0}")]
    InvalidAngle(f64),

    #[error("Pixel buffer is locked by {0} reader(s)")]
    BufferLocked(usize),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConversionError {
    /// Numeric status for callers that still speak status codes.
    ///
    /// Only the unsupported-format case carries a documented sentinel; every
    /// other failure maps to `-1`.
    pub fn code(&self) -> i32 {
        match self {
            ConversionError::UnsupportedPixelFormat(_) => UNSUPPORTED_PIXEL_FORMAT_CODE,
            _ => -1,
        }
    }

    /// Whether the failure only concerns the frame at hand, so a stream
    /// consumer should drop that frame and keep going.
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            ConversionError::UnsupportedPixelFormat(_)
                | ConversionError::InvalidDimensions(..)
                | ConversionError::InvalidStride { .. }
                | ConversionError::BufferLocked(_)
                | ConversionError::ResourceExhausted(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
