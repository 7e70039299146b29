//! Bitmap layout descriptors

use image::Rgba;

/// Color space of a display image. Device RGB is the only one produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    #[default]
    DeviceRgb,
}

/// How a 32-bit pixel is laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Components stored in the order the alpha info names them.
    Default,
    /// 32-bit big-endian word, same as `Default` for 8-bit components.
    Big32,
    /// 32-bit little-endian word: components appear reversed in memory.
    Little32,
}

/// Position and meaning of the fourth component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaInfo {
    /// X R G B, the X byte is ignored and pixels are opaque
    NoneSkipFirst,
    /// R G B A with color components premultiplied by alpha
    PremultipliedLast,
    /// R G B A, straight alpha
    Last,
}

/// Byte order plus alpha info, together enough to decode one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapInfo {
    pub byte_order: ByteOrder,
    pub alpha_info: AlphaInfo,
}

impl BitmapInfo {
    pub const fn new(byte_order: ByteOrder, alpha_info: AlphaInfo) -> Self {
        Self {
            byte_order,
            alpha_info,
        }
    }

    /// Decodes the four bytes of one pixel into straight RGBA.
    pub fn decode(&self, bytes: [u8; 4]) -> Rgba<u8> {
        let [c0, c1, c2, c3] = match self.byte_order {
            ByteOrder::Default | ByteOrder::Big32 => bytes,
            ByteOrder::Little32 => [bytes[3], bytes[2], bytes[1], bytes[0]],
        };
        match self.alpha_info {
            AlphaInfo::NoneSkipFirst => Rgba([c1, c2, c3, u8::MAX]),
            AlphaInfo::Last => Rgba([c0, c1, c2, c3]),
            AlphaInfo::PremultipliedLast => Rgba([
                unpremultiply(c0, c3),
                unpremultiply(c1, c3),
                unpremultiply(c2, c3),
                c3,
            ]),
        }
    }

    /// Encodes straight RGBA into the four bytes of one pixel.
    pub fn encode(&self, pixel: Rgba<u8>) -> [u8; 4] {
        let [r, g, b, a] = pixel.0;
        let components = match self.alpha_info {
            AlphaInfo::NoneSkipFirst => [u8::MAX, r, g, b],
            AlphaInfo::Last => [r, g, b, a],
            AlphaInfo::PremultipliedLast => [
                premultiply(r, a),
                premultiply(g, a),
                premultiply(b, a),
                a,
            ],
        };
        match self.byte_order {
            ByteOrder::Default | ByteOrder::Big32 => components,
            ByteOrder::Little32 => [components[3], components[2], components[1], components[0]],
        }
    }
}

fn premultiply(c: u8, a: u8) -> u8 {
    ((c as u16 * a as u16 + 127) / 255) as u8
}

fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    ((c as u16 * 255 + a as u16 / 2) / a as u16).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_skip_first() {
        let info = BitmapInfo::new(ByteOrder::Big32, AlphaInfo::NoneSkipFirst);
        assert_eq!(info.decode([0x00, 10, 20, 30]), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_little_endian_skip_first() {
        let info = BitmapInfo::new(ByteOrder::Little32, AlphaInfo::NoneSkipFirst);
        // B G R A in memory
        assert_eq!(info.decode([30, 20, 10, 0x00]), Rgba([10, 20, 30, 255]));
        assert_eq!(info.encode(Rgba([10, 20, 30, 255])), [30, 20, 10, 255]);
    }

    #[test]
    fn test_premultiplied_transparent_is_zero() {
        let info = BitmapInfo::new(ByteOrder::Default, AlphaInfo::PremultipliedLast);
        assert_eq!(info.encode(Rgba([200, 100, 50, 0])), [0, 0, 0, 0]);
        assert_eq!(info.decode([0, 0, 0, 0]), Rgba([0, 0, 0, 0]));
        assert_eq!(info.decode([200, 100, 50, 255]), Rgba([200, 100, 50, 255]));
    }
}
