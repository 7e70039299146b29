//! Still image encoding configuration types

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level (good speed/size balance)
    DeflateFast,
    /// Deflate compression - best compression (slower)
    DeflateBest,
    /// Deflate compression - balanced
    DeflateBalanced,
}

/// Configuration for encoding display images
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    /// Compression method to use
    pub compression: TiffCompression,
    /// Predictor value for compression (2 for horizontal differencing)
    pub predictor: Option<u16>,
    /// Drop the alpha channel for images that are opaque by layout
    pub strip_opaque_alpha: bool,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            compression: TiffCompression::None,
            predictor: None,
            strip_opaque_alpha: true,
        }
    }
}

impl EncodeConfig {
    pub fn builder() -> EncodeConfigBuilder {
        EncodeConfigBuilder::default()
    }
}

/// Builder for EncodeConfig
#[derive(Default)]
pub struct EncodeConfigBuilder {
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
    strip_opaque_alpha: Option<bool>,
}

impl EncodeConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn strip_opaque_alpha(mut self, strip: bool) -> Self {
        self.strip_opaque_alpha = Some(strip);
        self
    }

    pub fn build(self) -> EncodeConfig {
        let default = EncodeConfig::default();
        EncodeConfig {
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
            strip_opaque_alpha: self.strip_opaque_alpha.unwrap_or(default.strip_opaque_alpha),
        }
    }
}
