use std::io::{Cursor, Write};

use tiff::encoder::colortype::{RGB8, RGBA8};
use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder};
use tiff::tags::Predictor;
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::display::DisplayImage;
use crate::image_pipeline::encode::types::{EncodeConfig, TiffCompression};
use crate::image_pipeline::encode::writer::{ImageWriter, keeps_alpha, rgb_bytes};

pub struct StandardTiffWriter;

impl ImageWriter for StandardTiffWriter {
    fn write_image(&self, image: &DisplayImage, output: &mut dyn Write, config: &EncodeConfig) -> Result<()> {
        debug!("Encoding TIFF image: {}x{}", image.width(), image.height());

        let mut buffer = Vec::new();

        let compression = match config.compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| ConversionError::EncodeError(e.to_string()))?
            .with_compression(compression);

        if let Some(predictor_val) = config.predictor {
            let predictor = match predictor_val {
                2 => Predictor::Horizontal,
                _ => Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        let (width, height) = (image.width() as u32, image.height() as u32);
        if keeps_alpha(image, config) {
            let rgba = image.to_rgba_image();
            encoder
                .write_image::<RGBA8>(width, height, rgba.as_raw())
                .map_err(|e| ConversionError::EncodeError(e.to_string()))?;
        } else {
            encoder
                .write_image::<RGB8>(width, height, &rgb_bytes(image))
                .map_err(|e| ConversionError::EncodeError(e.to_string()))?;
        }

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}
