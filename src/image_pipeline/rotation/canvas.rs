//! Offscreen RGBA drawing surface.
//!
//! Device pixels use a top-left origin. Images are drawn the way a Quartz
//! context draws them: the first image row lands at the rectangle's maximum
//! y, so callers flip the CTM to get an upright result.

use std::sync::Arc;

use image::Rgba;
use tracing::trace;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::display::{AlphaInfo, BitmapInfo, ByteOrder, DisplayImage, ImageBacking};
use crate::image_pipeline::rotation::transform::{AffineTransform, Point, Rect};

const BYTES_PER_PIXEL: usize = 4;
/// Samples per axis when antialiasing is allowed.
const AA_GRID: usize = 4;

const CANVAS_BITMAP_INFO: BitmapInfo = BitmapInfo::new(ByteOrder::Default, AlphaInfo::PremultipliedLast);

pub struct BitmapCanvas {
    width: usize,
    height: usize,
    data: Vec<u8>,
    ctm: AffineTransform,
    allows_antialiasing: bool,
}

impl BitmapCanvas {
    /// Allocates a fully transparent canvas with antialiasing disabled.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(ConversionError::ResourceExhausted(usize::MAX))?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| ConversionError::ResourceExhausted(len))?;
        data.resize(len, 0);

        trace!(width, height, "Canvas allocated");
        Ok(Self {
            width,
            height,
            data,
            ctm: AffineTransform::IDENTITY,
            allows_antialiasing: false,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn ctm(&self) -> AffineTransform {
        self.ctm
    }

    pub fn allows_antialiasing(&self) -> bool {
        self.allows_antialiasing
    }

    pub fn set_allows_antialiasing(&mut self, allow: bool) {
        self.allows_antialiasing = allow;
    }

    pub fn translate_ctm(&mut self, tx: f64, ty: f64) {
        self.ctm = self.ctm.translated(tx, ty);
    }

    pub fn rotate_ctm(&mut self, radians: f64) {
        self.ctm = self.ctm.rotated(radians);
    }

    pub fn scale_ctm(&mut self, sx: f64, sy: f64) {
        self.ctm = self.ctm.scaled(sx, sy);
    }

    /// Composites `image` (source-over) into `rect`, given in user space.
    pub fn draw_image(&mut self, rect: Rect, image: &DisplayImage) {
        let Some(inverse) = self.ctm.invert() else {
            return;
        };
        if rect.size.width <= 0.0 || rect.size.height <= 0.0 {
            return;
        }
        let source = image.to_rgba_image();
        let (src_w, src_h) = (image.width() as f64, image.height() as f64);

        let sample = |device: Point| -> Option<Rgba<u8>> {
            let user = inverse.apply(device);
            let u = (user.x - rect.min_x()) * src_w / rect.size.width;
            let v = (rect.max_y() - user.y) * src_h / rect.size.height;
            if u < 0.0 || v < 0.0 || u >= src_w || v >= src_h {
                return None;
            }
            Some(*source.get_pixel(u as u32, v as u32))
        };

        for y in 0..self.height {
            for x in 0..self.width {
                let src = if self.allows_antialiasing {
                    supersample(x, y, &sample)
                } else {
                    sample(Point::new(x as f64 + 0.5, y as f64 + 0.5))
                };
                if let Some(src) = src {
                    self.blend(x, y, src);
                }
            }
        }
    }

    fn blend(&mut self, x: usize, y: usize, src: Rgba<u8>) {
        let offset = (y * self.width + x) * BYTES_PER_PIXEL;
        let dst = &mut self.data[offset..offset + BYTES_PER_PIXEL];
        let src = CANVAS_BITMAP_INFO.encode(src);
        let inv_alpha = 255 - src[3] as u16;
        for i in 0..BYTES_PER_PIXEL {
            dst[i] = (src[i] as u16 + (dst[i] as u16 * inv_alpha + 127) / 255).min(255) as u8;
        }
    }

    /// Straight-alpha RGBA at (x, y).
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba<u8>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * BYTES_PER_PIXEL;
        let px = &self.data[offset..offset + BYTES_PER_PIXEL];
        Some(CANVAS_BITMAP_INFO.decode([px[0], px[1], px[2], px[3]]))
    }

    pub fn into_image(self) -> DisplayImage {
        DisplayImage::from_parts(
            self.width,
            self.height,
            self.width * BYTES_PER_PIXEL,
            CANVAS_BITMAP_INFO,
            ImageBacking::Copied(Arc::from(self.data)),
        )
    }
}

/// Averages an `AA_GRID` x `AA_GRID` grid of samples inside one device pixel;
/// uncovered samples count as transparent.
fn supersample<F>(x: usize, y: usize, sample: &F) -> Option<Rgba<u8>>
where
    F: Fn(Point) -> Option<Rgba<u8>>,
{
    let mut sums = [0u32; 4];
    let mut covered = 0u32;
    let step = 1.0 / AA_GRID as f64;
    for sy in 0..AA_GRID {
        for sx in 0..AA_GRID {
            let p = Point::new(
                x as f64 + (sx as f64 + 0.5) * step,
                y as f64 + (sy as f64 + 0.5) * step,
            );
            if let Some(Rgba([r, g, b, a])) = sample(p) {
                let a = a as u32;
                sums[0] += r as u32 * a;
                sums[1] += g as u32 * a;
                sums[2] += b as u32 * a;
                sums[3] += a;
                covered += 1;
            }
        }
    }
    if covered == 0 || sums[3] == 0 {
        return None;
    }
    let total = (AA_GRID * AA_GRID) as u32;
    let alpha = sums[3] / total;
    Some(Rgba([
        (sums[0] / sums[3]) as u8,
        (sums[1] / sums[3]) as u8,
        (sums[2] / sums[3]) as u8,
        alpha as u8,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn opaque_square(side: u32) -> DisplayImage {
        DisplayImage::from_rgba_image(&RgbaImage::from_pixel(side, side, Rgba([10, 200, 30, 255])))
    }

    #[test]
    fn test_new_canvas_is_transparent_and_aliased() {
        let canvas = BitmapCanvas::new(3, 2).unwrap();
        assert!(!canvas.allows_antialiasing());
        assert_eq!(canvas.pixel(2, 1), Some(Rgba([0, 0, 0, 0])));
        assert_eq!(canvas.ctm(), AffineTransform::IDENTITY);
    }

    #[test]
    fn test_oversized_canvas_is_resource_exhausted() {
        let result = BitmapCanvas::new(usize::MAX / 2, 3);
        assert!(matches!(result, Err(ConversionError::ResourceExhausted(_))));
    }

    #[test]
    fn test_unflipped_draw_is_upside_down() {
        let mut source = RgbaImage::from_pixel(1, 2, Rgba([0, 0, 255, 255]));
        source.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let image = DisplayImage::from_rgba_image(&source);

        let mut canvas = BitmapCanvas::new(1, 2).unwrap();
        canvas.draw_image(Rect::new(0.0, 0.0, 1.0, 2.0), &image);
        assert_eq!(canvas.pixel(0, 0), Some(Rgba([0, 0, 255, 255])));
        assert_eq!(canvas.pixel(0, 1), Some(Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_aliased_edges_are_binary() {
        let image = opaque_square(8);
        let mut canvas = BitmapCanvas::new(12, 12).unwrap();
        canvas.translate_ctm(6.0, 6.0);
        canvas.rotate_ctm(0.5);
        canvas.draw_image(Rect::new(-4.0, -4.0, 8.0, 8.0), &image);

        let rendered = canvas.into_image().to_rgba_image();
        assert!(rendered.pixels().all(|p| p[3] == 0 || p[3] == 255));
        assert!(rendered.pixels().any(|p| p[3] == 255));
    }

    #[test]
    fn test_antialiased_edges_have_partial_alpha() {
        let image = opaque_square(8);
        let mut canvas = BitmapCanvas::new(12, 12).unwrap();
        canvas.set_allows_antialiasing(true);
        canvas.translate_ctm(6.0, 6.0);
        canvas.rotate_ctm(0.5);
        canvas.draw_image(Rect::new(-4.0, -4.0, 8.0, 8.0), &image);

        let rendered = canvas.into_image().to_rgba_image();
        assert!(rendered.pixels().any(|p| p[3] > 0 && p[3] < 255));
    }
}
