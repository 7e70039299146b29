//! Pixel buffer to display image conversion.
//!
//! Only the two packed 32-bit layouts can be wrapped without reformatting:
//!
//! | Frame format | Byte order | Alpha            |
//! |--------------|------------|------------------|
//! | ARGB         | 32 big     | none, skip first |
//! | BGRA         | 32 little  | none, skip first |
//!
//! Everything else is rejected before the frame is locked.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::convert::types::{BackingStrategy, ConversionConfig};
use crate::image_pipeline::display::{AlphaInfo, BitmapInfo, ByteOrder, DisplayImage, ImageBacking};
use crate::image_pipeline::frame::{PixelBuffer, PixelFormat};

const BYTES_PER_PIXEL: usize = 4;

pub trait FrameConverter {
    fn convert_frame(&self, frame: &PixelBuffer) -> Result<DisplayImage>;
}

/// Bitmap info matching a frame's pixel format.
pub fn bitmap_info_for(format: PixelFormat) -> Result<BitmapInfo> {
    match format {
        PixelFormat::Argb32 => Ok(BitmapInfo::new(ByteOrder::Big32, AlphaInfo::NoneSkipFirst)),
        PixelFormat::Bgra32 => Ok(BitmapInfo::new(ByteOrder::Little32, AlphaInfo::NoneSkipFirst)),
        PixelFormat::Unsupported(code) => Err(ConversionError::UnsupportedPixelFormat(code)),
    }
}

/// Converts frames with the default configuration (retain, no copy).
pub fn convert_to_display_image(frame: &PixelBuffer) -> Result<DisplayImage> {
    FrameImageConverter::default().convert(frame)
}

#[derive(Debug, Clone, Default)]
pub struct FrameImageConverter {
    config: ConversionConfig,
}

impl FrameImageConverter {
    pub fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    fn validate_geometry(&self, frame: &PixelBuffer, data_len: usize) -> Result<()> {
        let (width, height) = (frame.width(), frame.height());
        let bytes_per_row = frame.bytes_per_row();

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        if self.config.validate_dimensions {
            if let Some(max) = self.config.max_dimension {
                if width > max || height > max {
                    warn!("Frame dimensions {}x{} exceed maximum {}", width, height, max);
                    return Err(ConversionError::InvalidDimensions(width, height));
                }
            }
        }

        let min_row = width
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or(ConversionError::InvalidDimensions(width, height))?;
        if bytes_per_row < min_row {
            return Err(ConversionError::InvalidStride {
                width,
                bytes_per_row,
                reason: "shorter than width * 4",
            });
        }

        match bytes_per_row.checked_mul(height) {
            Some(needed) if needed <= data_len => Ok(()),
            _ => Err(ConversionError::InvalidStride {
                width,
                bytes_per_row,
                reason: "backing memory shorter than bytes_per_row * height",
            }),
        }
    }

    #[instrument(
        skip(self, frame),
        fields(width = frame.width(), height = frame.height(), format = %frame.pixel_format().fourcc())
    )]
    pub fn convert(&self, frame: &PixelBuffer) -> Result<DisplayImage> {
        let bitmap_info = bitmap_info_for(frame.pixel_format())?;

        let lock = frame.lock_base_address();
        self.validate_geometry(frame, lock.len())?;

        let backing = match self.config.backing {
            BackingStrategy::Retain => ImageBacking::Retained(Arc::new(lock.retain())),
            BackingStrategy::Copy => {
                let len = frame.bytes_per_row() * frame.height();
                let mut copy = Vec::new();
                copy.try_reserve_exact(len)
                    .map_err(|_| ConversionError::ResourceExhausted(len))?;
                copy.extend_from_slice(&lock[..len]);
                ImageBacking::Copied(Arc::from(copy))
            }
        };
        drop(lock);

        debug!(backing = ?self.config.backing, "Frame wrapped as display image");

        Ok(DisplayImage::from_parts(
            frame.width(),
            frame.height(),
            frame.bytes_per_row(),
            bitmap_info,
            backing,
        ))
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}

impl FrameConverter for FrameImageConverter {
    fn convert_frame(&self, frame: &PixelBuffer) -> Result<DisplayImage> {
        self.convert(frame)
    }
}
