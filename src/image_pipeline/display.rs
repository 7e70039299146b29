//! Display image module
//!
//! Owned images handed to preview and still-capture consumers.

mod display_image;
pub mod types;

pub use display_image::{BITS_PER_COMPONENT, BITS_PER_PIXEL, DisplayImage, ImageBacking};
pub use types::{AlphaInfo, BitmapInfo, ByteOrder, ColorSpace};
