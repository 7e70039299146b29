//! Frame conversion module
//!
//! Wraps captured pixel buffers as display images without reformatting.

mod converter;
pub mod types;

pub use converter::{FrameConverter, FrameImageConverter, bitmap_info_for, convert_to_display_image};
pub use types::{BackingStrategy, ConversionConfig, ConversionConfigBuilder};
