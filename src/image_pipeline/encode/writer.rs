use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::display::{AlphaInfo, DisplayImage};
use crate::image_pipeline::encode::types::EncodeConfig;

pub trait ImageWriter {
    fn write_image(&self, image: &DisplayImage, output: &mut dyn Write, config: &EncodeConfig) -> Result<()>;
}

/// Whether the encoded file should carry an alpha channel.
pub(crate) fn keeps_alpha(image: &DisplayImage, config: &EncodeConfig) -> bool {
    !(config.strip_opaque_alpha && image.bitmap_info().alpha_info == AlphaInfo::NoneSkipFirst)
}

/// Tightly packed RGB bytes, dropping the alpha channel.
pub(crate) fn rgb_bytes(image: &DisplayImage) -> Vec<u8> {
    image
        .to_rgba_image()
        .pixels()
        .flat_map(|p| [p[0], p[1], p[2]])
        .collect()
}
