//! Pipeline conversions module
//!
//! This module contains orchestration for the two consumers of converted
//! frames: live preview and still capture.

mod preview;
mod still_capture;


pub use preview::PreviewPipeline;
pub use still_capture::StillCapturePipeline;
