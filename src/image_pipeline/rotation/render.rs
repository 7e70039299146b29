use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::display::DisplayImage;
use crate::image_pipeline::rotation::canvas::BitmapCanvas;
use crate::image_pipeline::rotation::transform::{AffineTransform, Rect, Size, degrees_to_radians};

/// Bounding box of a `size` rectangle rotated about its center.
///
/// A non-finite angle yields a NaN size.
pub fn compute_rotated_bounds(size: Size, degrees_clockwise: f64) -> Size {
    let rotation = AffineTransform::rotation(degrees_to_radians(degrees_clockwise));
    let rect = Rect::new(0.0, 0.0, size.width, size.height);
    rect.apply(&rotation).size
}

/// Whole-pixel canvas extent. Rounds so that right-angle rotations, whose
/// bounds carry tiny trigonometric noise, keep exact dimensions.
fn pixel_extent(length: f64) -> usize {
    (length.round() as usize).max(1)
}

/// Renders `image` rotated clockwise by `degrees_clockwise` onto a fresh
/// transparent canvas sized to the rotated bounds.
///
/// Antialiasing stays disabled, so edge pixels are either fully covered or
/// fully transparent. A NaN or infinite angle fails with
/// [`ConversionError::InvalidAngle`].
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn render_rotated(image: &DisplayImage, degrees_clockwise: f64) -> Result<DisplayImage> {
    if !degrees_clockwise.is_finite() {
        return Err(ConversionError::InvalidAngle(degrees_clockwise));
    }
    let (width, height) = (image.width() as f64, image.height() as f64);
    let bounds = compute_rotated_bounds(Size::new(width, height), degrees_clockwise);

    let mut canvas = BitmapCanvas::new(pixel_extent(bounds.width), pixel_extent(bounds.height))?;
    let (canvas_w, canvas_h) = (canvas.width() as f64, canvas.height() as f64);

    canvas.translate_ctm(canvas_w / 2.0, canvas_h / 2.0);
    canvas.rotate_ctm(degrees_to_radians(degrees_clockwise));
    // Images draw bottom-up; flip so row 0 ends up on top.
    canvas.scale_ctm(1.0, -1.0);
    canvas.draw_image(Rect::new(-width / 2.0, -height / 2.0, width, height), image);

    debug!(
        canvas_width = canvas.width(),
        canvas_height = canvas.height(),
        "Rotated image rendered"
    );
    Ok(canvas.into_image())
}
