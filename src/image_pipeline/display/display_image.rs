//! Immutable display image and its pixel backing.

use std::fmt;
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::image_pipeline::display::types::{AlphaInfo, BitmapInfo, ByteOrder, ColorSpace};
use crate::image_pipeline::frame::RetainedLock;

pub const BITS_PER_COMPONENT: u32 = 8;
pub const BITS_PER_PIXEL: u32 = 32;
const BYTES_PER_PIXEL: usize = 4;

/// Where a display image's pixels live.
///
/// Both variants are cheap to clone. A retained frame is unlocked and
/// released when the last image sharing it is dropped.
#[derive(Clone)]
pub enum ImageBacking {
    /// Source frame kept alive and read-locked for the image's lifetime
    Retained(Arc<RetainedLock>),
    /// Bytes copied out of the source frame, or rendered
    Copied(Arc<[u8]>),
}

impl fmt::Debug for ImageBacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageBacking::Retained(lock) => write!(f, "ImageBacking::Retained({:?})", lock),
            ImageBacking::Copied(data) => write!(f, "ImageBacking::Copied({} bytes)", data.len()),
        }
    }
}

/// Displayable 8-bit-per-component RGB image, independent of the frame
/// callback that produced it.
#[derive(Debug, Clone)]
pub struct DisplayImage {
    width: usize,
    height: usize,
    bytes_per_row: usize,
    bitmap_info: BitmapInfo,
    color_space: ColorSpace,
    backing: ImageBacking,
}

impl DisplayImage {
    pub(crate) fn from_parts(
        width: usize,
        height: usize,
        bytes_per_row: usize,
        bitmap_info: BitmapInfo,
        backing: ImageBacking,
    ) -> Self {
        Self {
            width,
            height,
            bytes_per_row,
            bitmap_info,
            color_space: ColorSpace::DeviceRgb,
            backing,
        }
    }

    /// Copies an `image` buffer into a display image with straight alpha.
    pub fn from_rgba_image(source: &RgbaImage) -> Self {
        let (width, height) = source.dimensions();
        Self::from_parts(
            width as usize,
            height as usize,
            width as usize * BYTES_PER_PIXEL,
            BitmapInfo::new(ByteOrder::Default, AlphaInfo::Last),
            ImageBacking::Copied(Arc::from(source.as_raw().as_slice())),
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn bits_per_component(&self) -> u32 {
        BITS_PER_COMPONENT
    }

    pub fn bits_per_pixel(&self) -> u32 {
        BITS_PER_PIXEL
    }

    pub fn bitmap_info(&self) -> BitmapInfo {
        self.bitmap_info
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn backing(&self) -> &ImageBacking {
        &self.backing
    }

    /// True when the pixels live in a retained source frame.
    pub fn is_retained(&self) -> bool {
        matches!(self.backing, ImageBacking::Retained(_))
    }

    /// Runs `f` with the raw pixel bytes, rows `bytes_per_row` apart.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        match &self.backing {
            ImageBacking::Retained(lock) => {
                let memory = lock.buffer().read_memory();
                f(&memory)
            }
            ImageBacking::Copied(data) => f(data),
        }
    }

    /// Straight-alpha RGBA value at (x, y), `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba<u8>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y * self.bytes_per_row + x * BYTES_PER_PIXEL;
        self.with_bytes(|bytes| {
            bytes
                .get(offset..offset + BYTES_PER_PIXEL)
                .map(|px| self.bitmap_info.decode([px[0], px[1], px[2], px[3]]))
        })
    }

    /// Decodes every pixel into a tightly packed straight-alpha RGBA buffer.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let row_len = self.width * BYTES_PER_PIXEL;
        let mut out = Vec::with_capacity(row_len * self.height);
        self.with_bytes(|bytes| {
            for row in bytes.chunks(self.bytes_per_row).take(self.height) {
                for px in row[..row_len].chunks_exact(BYTES_PER_PIXEL) {
                    out.extend_from_slice(
                        &self.bitmap_info.decode([px[0], px[1], px[2], px[3]]).0,
                    );
                }
            }
        });
        // Width and height come from a validated frame or canvas, so the
        // length always matches.
        RgbaImage::from_raw(self.width as u32, self.height as u32, out)
            .unwrap_or_else(|| RgbaImage::new(self.width as u32, self.height as u32))
    }
}
