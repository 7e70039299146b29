use std::io::Write;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::display::DisplayImage;
use crate::image_pipeline::encode::types::EncodeConfig;
use crate::image_pipeline::encode::writer::{ImageWriter, keeps_alpha, rgb_bytes};

/// PNG output for previews and sharing. TIFF compression settings are ignored.
pub struct PngWriter;

impl ImageWriter for PngWriter {
    fn write_image(&self, image: &DisplayImage, output: &mut dyn Write, config: &EncodeConfig) -> Result<()> {
        debug!("Encoding PNG image: {}x{}", image.width(), image.height());

        let (width, height) = (image.width() as u32, image.height() as u32);
        let encoder = PngEncoder::new(output);
        let result = if keeps_alpha(image, config) {
            let rgba = image.to_rgba_image();
            encoder.write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
        } else {
            encoder.write_image(&rgb_bytes(image), width, height, ExtendedColorType::Rgb8)
        };
        result.map_err(|e| ConversionError::EncodeError(e.to_string()))
    }
}
