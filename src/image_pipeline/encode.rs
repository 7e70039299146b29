//! Still image encoding module
//!
//! Writes display images as TIFF or PNG for still-capture persistence.

mod png_writer;
mod standard_tiff_writer;
pub mod types;
mod writer;

pub use png_writer::PngWriter;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{EncodeConfig, EncodeConfigBuilder, TiffCompression};
pub use writer::ImageWriter;
