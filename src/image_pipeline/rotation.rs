//! Rotation module
//!
//! Affine geometry, an offscreen canvas, and rendering of display images at
//! arbitrary angles.

pub mod canvas;
mod render;
pub mod transform;

pub use canvas::BitmapCanvas;
pub use render::{compute_rotated_bounds, render_rotated};
pub use transform::{AffineTransform, Point, Rect, Size, degrees_to_radians};
