// SPDX-License-Identifier: MPL-2.0
//! Picker session configuration and its validation rules.

use std::fmt;

use super::crop::{CropShape, Dimensions};
use super::media::{ExtensionFilter, MediaTypeFilter};

/// Crop editor options of a single-photo pick.
#[derive(Debug, Clone, PartialEq)]
pub struct CropOptions {
    /// Width / height of the viewport. `None` uses the fixed viewport height.
    pub aspect_ratio: Option<f64>,
    /// How the viewport is drawn.
    pub shape: CropShape,
    /// Viewport height used when no aspect ratio is set.
    /// `None` falls back to the persisted setting.
    pub viewport_height: Option<f64>,
}

impl CropOptions {
    /// Square rectangular crop.
    #[must_use]
    pub fn square() -> Self {
        Self::with_aspect_ratio(1.0)
    }

    #[must_use]
    pub fn with_aspect_ratio(aspect_ratio: f64) -> Self {
        Self {
            aspect_ratio: Some(aspect_ratio),
            shape: CropShape::Rectangle,
            viewport_height: None,
        }
    }

    /// Crop with a fixed viewport height and free aspect ratio.
    #[must_use]
    pub fn free(viewport_height: f64) -> Self {
        Self {
            aspect_ratio: None,
            shape: CropShape::Rectangle,
            viewport_height: Some(viewport_height),
        }
    }

    #[must_use]
    pub fn with_shape(mut self, shape: CropShape) -> Self {
        self.shape = shape;
        self
    }

    /// Viewport size for a given width.
    ///
    /// Height is `width / aspect_ratio` when an aspect ratio is set,
    /// otherwise the configured height or `default_height`.
    #[must_use]
    pub fn viewport(&self, width: f64, default_height: f64) -> Dimensions {
        let height = match self.aspect_ratio {
            Some(ratio) => width / ratio,
            None => self.viewport_height.unwrap_or(default_height),
        };
        Dimensions::new(width, height)
    }
}

/// Immutable configuration of one picker session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PickerConfig {
    /// Media kinds that may be listed.
    pub media_type: MediaTypeFilter,
    pub multi_select: bool,
    /// Upper bound on the selection size in multi-select mode.
    pub max_selection: Option<u32>,
    pub excluded_extensions: ExtensionFilter,
    /// Crop editor options. `Some` enables the editor.
    pub crop: Option<CropOptions>,
}

impl PickerConfig {
    /// Single-select configuration over all media kinds.
    #[must_use]
    pub fn single() -> Self {
        Self::default()
    }

    /// Multi-select configuration with an optional maximum.
    #[must_use]
    pub fn multiple(max_selection: Option<u32>) -> Self {
        Self {
            multi_select: true,
            max_selection,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_media_type(mut self, media_type: MediaTypeFilter) -> Self {
        self.media_type = media_type;
        self
    }

    #[must_use]
    pub fn excluding<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_extensions = ExtensionFilter::new(extensions);
        self
    }

    #[must_use]
    pub fn with_crop(mut self, crop: CropOptions) -> Self {
        self.crop = Some(crop);
        self
    }

    /// Returns `true` if the crop editor is enabled.
    #[must_use]
    pub fn crop_enabled(&self) -> bool {
        self.crop.is_some()
    }

    /// Checks the configuration before a session is opened.
    ///
    /// # Errors
    ///
    /// Returns the first rule the configuration breaks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.multi_select && self.crop.is_some() {
            return Err(ConfigError::CropWithMultiSelect);
        }
        if self.max_selection == Some(0) {
            return Err(ConfigError::ZeroMaxSelection);
        }
        if let Some(crop) = &self.crop {
            if let Some(ratio) = crop.aspect_ratio {
                if !ratio.is_finite() || ratio <= 0.0 {
                    return Err(ConfigError::InvalidAspectRatio(ratio));
                }
            }
            if let Some(height) = crop.viewport_height {
                if !height.is_finite() || height <= 0.0 {
                    return Err(ConfigError::InvalidViewport {
                        width: f64::NAN,
                        height,
                    });
                }
            }
        }
        Ok(())
    }

    /// Maximum selection size effectively enforced.
    ///
    /// Single-select always allows one item; `None` means unbounded.
    #[must_use]
    pub fn effective_max(&self) -> Option<u32> {
        if self.multi_select {
            self.max_selection
        } else {
            Some(1)
        }
    }

    /// Returns `true` if the user may switch between photos and videos.
    ///
    /// Only allowed when every kind is accepted and no crop is requested.
    #[must_use]
    pub fn can_change_media_filter(&self) -> bool {
        self.media_type == MediaTypeFilter::All && !self.crop_enabled()
    }

    /// Selection counter shown in the header, e.g. `"2 / 5 selected"`.
    #[must_use]
    pub fn selection_label(&self, count: usize) -> String {
        match self.max_selection.filter(|_| self.multi_select) {
            Some(max) => format!("{count} / {max} selected"),
            None => format!("{count} selected"),
        }
    }
}

/// Returns `true` if another item may be added to a selection of `count`.
#[must_use]
pub fn can_add_more(count: usize, max: Option<u32>) -> bool {
    match max {
        Some(max) => count < max as usize,
        None => true,
    }
}

/// Reason a [`PickerConfig`] was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The crop editor needs exactly one photo.
    CropWithMultiSelect,
    /// A maximum of zero would make every pick empty.
    ZeroMaxSelection,
    /// Aspect ratio must be finite and strictly positive.
    InvalidAspectRatio(f64),
    /// Viewport sides must be finite and strictly positive.
    InvalidViewport { width: f64, height: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::CropWithMultiSelect => {
                write!(f, "crop cannot be combined with multi-select")
            }
            ConfigError::ZeroMaxSelection => write!(f, "max selection must be at least 1"),
            ConfigError::InvalidAspectRatio(ratio) => {
                write!(f, "invalid crop aspect ratio: {ratio}")
            }
            ConfigError::InvalidViewport { width, height } => {
                write!(f, "invalid crop viewport: {width}x{height}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_single_select() {
        let config = PickerConfig::single();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_max(), Some(1));
        assert!(config.can_change_media_filter());
    }

    #[test]
    fn crop_with_multi_select_is_rejected() {
        let config = PickerConfig::multiple(Some(3)).with_crop(CropOptions::square());
        assert_eq!(config.validate(), Err(ConfigError::CropWithMultiSelect));
    }

    #[test]
    fn zero_max_is_rejected() {
        assert_eq!(
            PickerConfig::multiple(Some(0)).validate(),
            Err(ConfigError::ZeroMaxSelection)
        );
    }

    #[test]
    fn bad_aspect_ratio_is_rejected() {
        for ratio in [0.0, -1.0, f64::INFINITY] {
            let config = PickerConfig::single().with_crop(CropOptions::with_aspect_ratio(ratio));
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidAspectRatio(_))
            ));
        }
    }

    #[test]
    fn bad_viewport_height_is_rejected() {
        let config = PickerConfig::single().with_crop(CropOptions::free(-5.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidViewport { .. })
        ));
    }

    #[test]
    fn viewport_uses_aspect_ratio_then_height() {
        let square = CropOptions::square().viewport(360.0, 300.0);
        assert_eq!(square, Dimensions::new(360.0, 360.0));

        let wide = CropOptions::with_aspect_ratio(16.0 / 9.0).viewport(320.0, 300.0);
        assert!((wide.height - 180.0).abs() < 1e-9);

        let free = CropOptions::free(240.0).viewport(360.0, 300.0);
        assert_eq!(free, Dimensions::new(360.0, 240.0));

        let mut fallback = CropOptions::free(240.0);
        fallback.viewport_height = None;
        assert_eq!(fallback.viewport(360.0, 300.0), Dimensions::new(360.0, 300.0));
    }

    #[test]
    fn media_filter_locked_by_kind_or_crop() {
        let photos = PickerConfig::single().with_media_type(MediaTypeFilter::PhotosOnly);
        assert!(!photos.can_change_media_filter());

        let crop = PickerConfig::single().with_crop(CropOptions::square());
        assert!(!crop.can_change_media_filter());
    }

    #[test]
    fn selection_label_with_and_without_max() {
        assert_eq!(PickerConfig::multiple(Some(5)).selection_label(2), "2 / 5 selected");
        assert_eq!(PickerConfig::multiple(None).selection_label(7), "7 selected");
        assert_eq!(PickerConfig::single().selection_label(1), "1 selected");
    }

    #[test]
    fn can_add_more_respects_max() {
        assert!(can_add_more(100, None));
        assert!(can_add_more(2, Some(3)));
        assert!(!can_add_more(3, Some(3)));
    }
}
