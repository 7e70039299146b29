//! Frame conversion configuration types

/// How a display image keeps hold of the frame's pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackingStrategy {
    /// Retain the frame and keep it read-locked until the image is dropped (no copy)
    #[default]
    Retain,
    /// Copy the pixel bytes under a short-lived lock
    Copy,
}

/// Configuration for frame to display image conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// How the produced image references pixel memory
    pub backing: BackingStrategy,
    /// Whether to enforce `max_dimension` before conversion
    pub validate_dimensions: bool,
    /// Largest accepted width or height. `None` accepts any size.
    pub max_dimension: Option<usize>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            backing: BackingStrategy::Retain,
            validate_dimensions: true,
            max_dimension: None,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    backing: Option<BackingStrategy>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
}

impl ConversionConfigBuilder {
    pub fn backing(mut self, backing: BackingStrategy) -> Self {
        self.backing = Some(backing);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            backing: self.backing.unwrap_or(default.backing),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}
