use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use frame_image_rs::image_pipeline::{
    CaptureObservation, CaptureObservers, ConversionConfig, EncodeConfig, FourCc, PixelBuffer, PixelFormat,
    PreviewPipeline, StillCapturePipeline, TiffCompression,
};
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};

fn marked_frame(width: usize, height: usize) -> PixelBuffer {
    // BGRA, red pixel in the top-left corner, grey elsewhere
    let frame = PixelBuffer::new(PixelFormat::Bgra32, width, height).unwrap();
    frame
        .write_base_address(|bytes| {
            for px in bytes.chunks_exact_mut(4) {
                px.copy_from_slice(&[128, 128, 128, 255]);
            }
            bytes[..4].copy_from_slice(&[0, 0, 255, 255]);
        })
        .unwrap();
    frame
}

#[test]
fn test_capture_to_tiff_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.tiff");

    let observers = Arc::new(CaptureObservers::new());
    let flashes = Arc::new(AtomicUsize::new(0));
    let counter = flashes.clone();
    observers.register(CaptureObservation::CapturingStillImage, move |_, capturing| {
        if capturing {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let pipeline = StillCapturePipeline::new(
        ConversionConfig::default(),
        EncodeConfig::builder()
            .compression(TiffCompression::DeflateBalanced)
            .build(),
    )
    .with_observers(observers);

    let frame = marked_frame(6, 4);
    {
        let mut file = File::create(&path).unwrap();
        let image = pipeline.capture(&frame, 90.0, &mut file).unwrap();
        assert_eq!(image.dimensions(), (4, 6));
    }
    assert_eq!(flashes.load(Ordering::SeqCst), 1);

    // The rotated image is a fresh render, so the source frame is free again.
    assert_eq!(frame.lock_count(), 0);

    let mut decoder = Decoder::new(BufReader::new(File::open(&path).unwrap())).unwrap();
    assert_eq!(decoder.dimensions().unwrap(), (4, 6));
    assert_eq!(decoder.colortype().unwrap(), ColorType::RGBA(8));
    let DecodingResult::U8(data) = decoder.read_image().unwrap() else {
        panic!("expected 8-bit samples");
    };

    // Clockwise quarter turn moves the top-left corner to the top-right.
    let top_right = (4 - 1) * 4;
    assert_eq!(&data[top_right..top_right + 4], &[255, 0, 0, 255]);
    assert_eq!(&data[..4], &[128, 128, 128, 255]);
}

#[test]
fn test_preview_stream_survives_bad_frames() {
    let pipeline = PreviewPipeline::new(ConversionConfig::default());
    let mut shown = Vec::new();

    let frames = vec![
        marked_frame(4, 4),
        PixelBuffer::new(PixelFormat::from_fourcc(FourCc::NV12_VIDEO_RANGE), 4, 4).unwrap(),
        PixelBuffer::from_bytes(PixelFormat::Argb32, 4, 4, 8, vec![0; 32]),
        marked_frame(8, 2),
    ];

    for frame in &frames {
        if let Some(image) = pipeline.process_frame(frame) {
            shown.push(image.dimensions());
        }
    }

    assert_eq!(shown, vec![(4, 4), (8, 2)]);
    assert_eq!(pipeline.dropped_frames(), 2);
    assert!(frames.iter().all(|f| f.lock_count() == 0));
}
