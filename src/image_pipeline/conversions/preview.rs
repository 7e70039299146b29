use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::image_pipeline::convert::{ConversionConfig, FrameConverter, FrameImageConverter};
use crate::image_pipeline::display::DisplayImage;
use crate::image_pipeline::frame::PixelBuffer;

/// Live preview path: one frame at a time, bad frames are skipped.
pub struct PreviewPipeline<C: FrameConverter> {
    converter: C,
    processed: AtomicU64,
    dropped: AtomicU64,
}

impl PreviewPipeline<FrameImageConverter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self::with_custom(FrameImageConverter::new(config))
    }
}

impl<C: FrameConverter> PreviewPipeline<C> {
    pub fn with_custom(converter: C) -> Self {
        Self {
            converter,
            processed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Converts one frame for display. Returns `None` when the frame had to
    /// be dropped; the caller simply waits for the next one.
    pub fn process_frame(&self, frame: &PixelBuffer) -> Option<DisplayImage> {
        match self.converter.convert_frame(frame) {
            Ok(image) => {
                self.processed.fetch_add(1, Ordering::Relaxed);
                Some(image)
            }
            Err(e) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if e.is_frame_local() {
                    debug!(error = %e, dropped, "Dropping preview frame");
                } else {
                    warn!(error = %e, dropped, "Dropping preview frame");
                }
                None
            }
        }
    }

    pub fn processed_frames(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }
}
