use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, bail};
use frame_image_rs::image_pipeline::{
    BackingStrategy, ConversionConfig, EncodeConfig, PixelBuffer, PixelFormat, PreviewPipeline,
    StillCapturePipeline, TiffCompression,
};
use frame_image_rs::logger;

use tracing::{error, info};

const FRAME_WIDTH: usize = 640;
const FRAME_HEIGHT: usize = 480;

/// Fills a BGRA frame with a horizontal/vertical gradient and a white border.
fn synthetic_frame(width: usize, height: usize) -> anyhow::Result<PixelBuffer> {
    let frame = PixelBuffer::new(PixelFormat::Bgra32, width, height)?;
    let bytes_per_row = frame.bytes_per_row();
    frame.write_base_address(|bytes| {
        for y in 0..height {
            for x in 0..width {
                let offset = y * bytes_per_row + x * 4;
                let border = x < 8 || y < 8 || x >= width - 8 || y >= height - 8;
                let px = if border {
                    [255, 255, 255, 255]
                } else {
                    [(y * 255 / height) as u8, 64, (x * 255 / width) as u8, 255]
                };
                bytes[offset..offset + 4].copy_from_slice(&px);
            }
        }
    })?;
    Ok(frame)
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let mut args = std::env::args().skip(1);
    let degrees: f64 = match args.next() {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid rotation in degrees: {arg}"))?,
        None => 90.0,
    };
    let output_path = args.next().unwrap_or_else(|| "capture.tiff".to_string());
    if args.next().is_some() {
        bail!("usage: frame_image [DEGREES] [OUTPUT.tiff]");
    }

    info!("Starting frame_image...");

    let frame = synthetic_frame(FRAME_WIDTH, FRAME_HEIGHT)?;

    let preview = PreviewPipeline::new(ConversionConfig::default());
    if let Some(image) = preview.process_frame(&frame) {
        info!(width = image.width(), height = image.height(), "Preview frame ready");
    }

    let pipeline = StillCapturePipeline::new(
        ConversionConfig::builder().backing(BackingStrategy::Copy).build(),
        EncodeConfig::builder()
            .compression(TiffCompression::Lzw)
            .predictor(Some(2))
            .build(),
    );
    info!("Compression: {:?}", pipeline.config().compression);
    info!("Rotation: {} degrees", degrees);

    let file = File::create(&output_path)
        .with_context(|| format!("cannot create {output_path}"))?;
    let mut output = BufWriter::new(file);

    let image = match pipeline.capture(&frame, degrees, &mut output) {
        Ok(image) => image,
        Err(e) => {
            error!("Capture failed: {}", e);
            return Err(e.into());
        }
    };
    output.flush()?;

    info!(
        width = image.width(),
        height = image.height(),
        output = %output_path,
        "Capture saved"
    );
    Ok(())
}
