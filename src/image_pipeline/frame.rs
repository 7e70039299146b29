//! Captured frame module
//!
//! Frames arrive from the capture subsystem as reference-counted pixel
//! buffers whose memory must be locked before it is read.

mod buffer;
pub mod types;

pub use buffer::{BaseAddressLock, PixelBuffer, RetainedLock};
pub use types::{FourCc, PixelFormat};
