//! Pixel format tags for captured frames

use std::fmt;

/// Four-character pixel format code as reported by the capture subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub u32);

impl FourCc {
    /// Packed 32-bit ARGB. Historically tagged with the plain value 32.
    pub const ARGB32: FourCc = FourCc(0x0000_0020);
    /// Packed 32-bit BGRA.
    pub const BGRA32: FourCc = FourCc::from_bytes(*b"BGRA");
    /// Bi-planar 4:2:0 YCbCr, video range. Common camera default, not packed.
    pub const NV12_VIDEO_RANGE: FourCc = FourCc::from_bytes(*b"420v");
    /// Bi-planar 4:2:0 YCbCr, full range.
    pub const NV12_FULL_RANGE: FourCc = FourCc::from_bytes(*b"420f");

    pub const fn from_bytes(code: [u8; 4]) -> Self {
        FourCc(u32::from_be_bytes(code))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            write!(f, "'{}'", String::from_utf8_lossy(&bytes))
        } else {
            write!(f, "0x{:08x}", self.0)
        }
    }
}

/// Pixel layout of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Packed 32-bit, bytes in memory: A R G B
    Argb32,
    /// Packed 32-bit, bytes in memory: B G R A
    Bgra32,
    /// Anything else (planar, compressed, 16-bit...)
    Unsupported(FourCc),
}

impl PixelFormat {
    pub fn from_fourcc(code: FourCc) -> Self {
        match code {
            FourCc::ARGB32 => PixelFormat::Argb32,
            FourCc::BGRA32 => PixelFormat::Bgra32,
            other => PixelFormat::Unsupported(other),
        }
    }

    pub fn fourcc(&self) -> FourCc {
        match self {
            PixelFormat::Argb32 => FourCc::ARGB32,
            PixelFormat::Bgra32 => FourCc::BGRA32,
            PixelFormat::Unsupported(code) => *code,
        }
    }
}

impl From<FourCc> for PixelFormat {
    fn from(code: FourCc) -> Self {
        PixelFormat::from_fourcc(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_mapping() {
        assert_eq!(PixelFormat::from_fourcc(FourCc(32)), PixelFormat::Argb32);
        assert_eq!(PixelFormat::from_fourcc(FourCc::from_bytes(*b"BGRA")), PixelFormat::Bgra32);
        assert_eq!(
            PixelFormat::from_fourcc(FourCc::NV12_VIDEO_RANGE),
            PixelFormat::Unsupported(FourCc::NV12_VIDEO_RANGE)
        );
        assert_eq!(PixelFormat::Bgra32.fourcc(), FourCc::BGRA32);
    }

    #[test]
    fn test_fourcc_display() {
        assert_eq!(FourCc::BGRA32.to_string(), "'BGRA'");
        assert_eq!(FourCc::ARGB32.to_string(), "0x00000020");
    }
}
