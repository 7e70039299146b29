//! Frame to image pipeline module
//!
//! This module turns captured camera frames into displayable images, with
//! separate modules for frame access, conversion, rotation, encoding and the
//! preview/still-capture orchestration built on top.

pub mod capture;
pub mod common;
pub mod conversions;
pub mod convert;
pub mod display;
pub mod encode;
pub mod frame;
pub mod rotation;

pub use common::{
    ConversionError,
    Result,
    UNSUPPORTED_PIXEL_FORMAT_CODE,
};

pub use frame::{
    FourCc,
    PixelBuffer,
    PixelFormat,
};

pub use display::{
    AlphaInfo,
    BitmapInfo,
    ByteOrder,
    ColorSpace,
    DisplayImage,
    ImageBacking,
};

pub use convert::{
    BackingStrategy,
    ConversionConfig,
    ConversionConfigBuilder,
    FrameConverter,
    FrameImageConverter,
    convert_to_display_image,
};

pub use rotation::{
    Size,
    compute_rotated_bounds,
    degrees_to_radians,
    render_rotated,
};

pub use encode::{
    EncodeConfig,
    ImageWriter,
    PngWriter,
    StandardTiffWriter,
    TiffCompression,
};

pub use capture::{
    CaptureObservation,
    CaptureObservers,
    ObserverId,
};

pub use conversions::{
    PreviewPipeline,
    StillCapturePipeline,
};
