use std::io::Write;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::image_pipeline::capture::{CaptureObservation, CaptureObservers};
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::convert::{ConversionConfig, FrameConverter, FrameImageConverter};
use crate::image_pipeline::display::DisplayImage;
use crate::image_pipeline::encode::{EncodeConfig, ImageWriter, StandardTiffWriter};
use crate::image_pipeline::frame::PixelBuffer;
use crate::image_pipeline::rotation::render_rotated;

pub struct StillCapturePipeline<C: FrameConverter, W: ImageWriter> {
    converter: C,
    writer: W,
    config: EncodeConfig,
    observers: Arc<CaptureObservers>,
}

impl StillCapturePipeline<FrameImageConverter, StandardTiffWriter> {
    pub fn new(conversion: ConversionConfig, config: EncodeConfig) -> Self {
        Self::with_custom(FrameImageConverter::new(conversion), StandardTiffWriter, config)
    }
}

/// Reports the end of a capture on every exit path.
struct CapturingFlag<'a>(&'a CaptureObservers);

impl<'a> CapturingFlag<'a> {
    fn raise(observers: &'a CaptureObservers) -> Self {
        observers.notify(CaptureObservation::CapturingStillImage, true);
        Self(observers)
    }
}

impl Drop for CapturingFlag<'_> {
    fn drop(&mut self) {
        self.0.notify(CaptureObservation::CapturingStillImage, false);
    }
}

fn needs_rotation(degrees: f64) -> bool {
    degrees.rem_euclid(360.0) != 0.0
}

impl<C: FrameConverter, W: ImageWriter> StillCapturePipeline<C, W> {
    pub fn with_custom(converter: C, writer: W, config: EncodeConfig) -> Self {
        Self {
            converter,
            writer,
            config,
            observers: Arc::new(CaptureObservers::new()),
        }
    }

    /// Shares an existing registry, e.g. one the UI already listens on.
    pub fn with_observers(mut self, observers: Arc<CaptureObservers>) -> Self {
        self.observers = observers;
        self
    }

    /// Converts `frame`, rotates it clockwise by `degrees`, and encodes the
    /// result into `output`. Failures are returned to the caller, never
    /// swallowed: a failed still capture must be reported to the user.
    #[instrument(skip(self, frame, output), fields(width = frame.width(), height = frame.height()))]
    pub fn capture(&self, frame: &PixelBuffer, degrees: f64, output: &mut dyn Write) -> Result<DisplayImage> {
        let _capturing = CapturingFlag::raise(&self.observers);
        info!("Starting still capture");

        let image = {
            let _span = tracing::info_span!("convert_frame").entered();
            self.converter.convert_frame(frame)?
        };

        let image = if needs_rotation(degrees) {
            let _span = tracing::info_span!("rotate", degrees).entered();
            render_rotated(&image, degrees)?
        } else {
            image
        };

        {
            let _span = tracing::info_span!("encode_image").entered();
            self.writer.write_image(&image, output, &self.config)?;
        }

        info!(
            width = image.width(),
            height = image.height(),
            "Still capture complete"
        );
        Ok(image)
    }

    pub fn observers(&self) -> &Arc<CaptureObservers> {
        &self.observers
    }

    pub fn config(&self) -> &EncodeConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EncodeConfig) {
        self.config = config;
    }
}
