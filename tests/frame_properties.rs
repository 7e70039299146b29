use frame_image_rs::image_pipeline::{
    BackingStrategy, ConversionConfig, ConversionError, FourCc, FrameImageConverter, PixelBuffer,
    PixelFormat, Size, compute_rotated_bounds, convert_to_display_image, render_rotated,
};
use image::Rgba;
use proptest::prelude::*;

fn packed_format() -> impl Strategy<Value = PixelFormat> {
    prop_oneof![Just(PixelFormat::Argb32), Just(PixelFormat::Bgra32)]
}

fn backing() -> impl Strategy<Value = BackingStrategy> {
    prop_oneof![Just(BackingStrategy::Retain), Just(BackingStrategy::Copy)]
}

/// Memory bytes for one pixel of `color` in `format`.
fn pixel_bytes(format: PixelFormat, [r, g, b]: [u8; 3]) -> [u8; 4] {
    match format {
        PixelFormat::Argb32 => [0xff, r, g, b],
        PixelFormat::Bgra32 => [b, g, r, 0xff],
        PixelFormat::Unsupported(_) => unreachable!(),
    }
}

fn solid_frame(format: PixelFormat, width: usize, height: usize, padding: usize, color: [u8; 3]) -> PixelBuffer {
    let frame = PixelBuffer::with_stride(format, width, height, width * 4 + padding).unwrap();
    let stride = frame.bytes_per_row();
    let px = pixel_bytes(format, color);
    frame
        .write_base_address(|bytes| {
            for row in bytes.chunks_exact_mut(stride) {
                for (x, chunk) in row.chunks_exact_mut(4).enumerate() {
                    if x < width {
                        chunk.copy_from_slice(&px);
                    } else {
                        // row padding
                        chunk.fill(0xab);
                    }
                }
            }
        })
        .unwrap();
    frame
}

fn converter(strategy: BackingStrategy) -> FrameImageConverter {
    FrameImageConverter::new(ConversionConfig::builder().backing(strategy).build())
}

proptest! {
    #[test]
    fn prop_packed_frames_keep_dimensions(
        format in packed_format(),
        strategy in backing(),
        width in 1usize..48,
        height in 1usize..48,
        padding in 0usize..4,
    ) {
        let frame = solid_frame(format, width, height, padding * 4, [0, 0, 0]);
        let image = converter(strategy).convert(&frame).unwrap();
        prop_assert_eq!(image.dimensions(), (width, height));
        prop_assert_eq!(image.bytes_per_row(), frame.bytes_per_row());
    }

    #[test]
    fn prop_other_formats_are_rejected(code in any::<u32>(), width in 1usize..16, height in 1usize..16) {
        prop_assume!(code != FourCc::ARGB32.0 && code != FourCc::BGRA32.0);
        let frame = PixelBuffer::new(PixelFormat::from_fourcc(FourCc(code)), width, height).unwrap();

        let result = convert_to_display_image(&frame);
        prop_assert!(matches!(result, Err(ConversionError::UnsupportedPixelFormat(c)) if c == FourCc(code)));
        prop_assert_eq!(frame.lock_count(), 0);
        prop_assert_eq!(frame.retain_count(), 1);
    }

    #[test]
    fn prop_solid_color_survives_conversion(
        format in packed_format(),
        strategy in backing(),
        color in any::<[u8; 3]>(),
        width in 1usize..24,
        height in 1usize..24,
    ) {
        let frame = solid_frame(format, width, height, 8, color);
        let image = converter(strategy).convert(&frame).unwrap();
        let expected = Rgba([color[0], color[1], color[2], 255]);

        let rgba = image.to_rgba_image();
        prop_assert!(rgba.pixels().all(|p| *p == expected));
    }

    #[test]
    fn prop_image_outlives_released_frame(
        format in packed_format(),
        strategy in backing(),
        color in any::<[u8; 3]>(),
        width in 1usize..24,
        height in 1usize..24,
    ) {
        let frame = solid_frame(format, width, height, 0, color);
        let image = converter(strategy).convert(&frame).unwrap();

        // Copy-backed images let the producer reuse the buffer right away;
        // retained ones refuse it.
        let reused = frame.write_base_address(|bytes| bytes.fill(0));
        prop_assert_eq!(reused.is_ok(), strategy == BackingStrategy::Copy);
        drop(frame);

        let expected = Rgba([color[0], color[1], color[2], 255]);
        for y in 0..height {
            for x in 0..width {
                prop_assert_eq!(image.pixel(x, y), Some(expected));
            }
        }
    }

    #[test]
    fn prop_right_angle_turns_restore_image(
        width in 1usize..20,
        height in 1usize..20,
        quarter in 0u32..4,
        color in any::<[u8; 3]>(),
    ) {
        let frame = solid_frame(PixelFormat::Bgra32, width, height, 0, color);
        let image = convert_to_display_image(&frame).unwrap();

        let first = 90.0 * quarter as f64;
        let once = render_rotated(&image, first).unwrap();
        let twice = render_rotated(&once, 360.0 - first).unwrap();

        prop_assert_eq!(twice.dimensions(), image.dimensions());
        prop_assert_eq!(twice.to_rgba_image(), image.to_rgba_image());
    }

    #[test]
    fn prop_rotated_edges_are_binary(degrees in -360.0f64..360.0, width in 2usize..24, height in 2usize..24) {
        let frame = solid_frame(PixelFormat::Argb32, width, height, 0, [200, 10, 90]);
        let image = convert_to_display_image(&frame).unwrap();
        let rotated = render_rotated(&image, degrees).unwrap();

        let rgba = rotated.to_rgba_image();
        prop_assert!(rgba.pixels().all(|p| p[3] == 0 || p[3] == 255));
    }

    #[test]
    fn prop_bounds_contain_source_area(w in 1.0f64..500.0, h in 1.0f64..500.0, degrees in -720.0f64..720.0) {
        let bounds = compute_rotated_bounds(Size::new(w, h), degrees);
        prop_assert!(bounds.width * bounds.height >= w * h - 1e-6);
        prop_assert!(bounds.width <= w + h + 1e-9);
        prop_assert!(bounds.height <= w + h + 1e-9);
    }
}

#[test]
fn test_rotated_bounds_examples() {
    let size = compute_rotated_bounds(Size::new(100.0, 200.0), 0.0);
    assert!((size.width - 100.0).abs() < 1e-9 && (size.height - 200.0).abs() < 1e-9);

    let size = compute_rotated_bounds(Size::new(100.0, 100.0), 45.0);
    assert!((size.width - 141.421356).abs() < 1e-5);
    assert!((size.height - 141.421356).abs() < 1e-5);
}
