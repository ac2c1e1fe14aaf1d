// SPDX-License-Identifier: MPL-2.0
//! Persisted picker settings, loaded from and saved to a `settings.toml` file.
//!
//! These are tuning knobs shared by every picker session of the process
//! (page size, crop viewport, caches). Per-session behaviour lives in
//! [`PickerConfig`](crate::domain::picker::PickerConfig) instead.
//!
//! # Configuration Sections
//!
//! - `[pagination]` - Page size for library queries
//! - `[crop]` - Crop viewport, display downscale cap and zoom bound
//! - `[media]` - Video thumbnail extraction
//! - `[cache]` - URI and thumbnail cache capacities
//!
//! # Examples
//!
//! ```no_run
//! use gallery_picker::config::{self, PickerSettings};
//!
//! let (mut settings, _warning) = config::load();
//! settings.pagination.page_size = Some(60);
//! config::save(&settings).expect("Failed to save settings");
//! ```

pub mod defaults;
pub mod paths;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// Library pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginationConfig {
    /// Number of assets requested per page.
    #[serde(default = "default_page_size", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// Crop editor settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropConfig {
    /// Crop viewport width in display units.
    #[serde(
        default = "default_viewport_width",
        skip_serializing_if = "Option::is_none"
    )]
    pub viewport_width: Option<f64>,

    /// Crop viewport height when no aspect ratio is given.
    #[serde(
        default = "default_viewport_height",
        skip_serializing_if = "Option::is_none"
    )]
    pub viewport_height: Option<f64>,

    /// Longest display side before an image is downscaled for gestures.
    #[serde(default = "default_display_cap", skip_serializing_if = "Option::is_none")]
    pub display_cap: Option<f64>,

    /// Upper zoom bound.
    #[serde(default = "default_max_scale", skip_serializing_if = "Option::is_none")]
    pub max_scale: Option<f64>,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            display_cap: default_display_cap(),
            max_scale: default_max_scale(),
        }
    }
}

/// Media resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaConfig {
    /// Timestamp of the frame used as video thumbnail, in milliseconds.
    #[serde(
        default = "default_thumbnail_time_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_time_ms: Option<u64>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            thumbnail_time_ms: default_thumbnail_time_ms(),
        }
    }
}

/// In-memory cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Number of resolved local URIs kept.
    #[serde(default = "default_uri_capacity", skip_serializing_if = "Option::is_none")]
    pub uri_capacity: Option<usize>,

    /// Number of generated video thumbnails kept.
    #[serde(
        default = "default_thumbnail_capacity",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_capacity: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            uri_capacity: default_uri_capacity(),
            thumbnail_capacity: default_thumbnail_capacity(),
        }
    }
}

// =============================================================================
// Main Settings Struct (Sectioned)
// =============================================================================

/// Picker settings with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PickerSettings {
    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub crop: CropConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl PickerSettings {
    /// Effective page size, clamped to the supported range.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.pagination
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    /// Effective crop viewport width.
    #[must_use]
    pub fn viewport_width(&self) -> f64 {
        positive_or(self.crop.viewport_width, DEFAULT_VIEWPORT_WIDTH)
    }

    /// Effective crop viewport height for configurations without aspect ratio.
    #[must_use]
    pub fn viewport_height(&self) -> f64 {
        positive_or(self.crop.viewport_height, DEFAULT_VIEWPORT_HEIGHT)
    }

    /// Effective display cap.
    #[must_use]
    pub fn display_cap(&self) -> f64 {
        positive_or(self.crop.display_cap, DEFAULT_DISPLAY_CAP).max(MIN_DISPLAY_CAP)
    }

    /// Effective upper zoom bound.
    #[must_use]
    pub fn max_scale(&self) -> f64 {
        positive_or(self.crop.max_scale, DEFAULT_MAX_SCALE).max(MIN_MAX_SCALE)
    }

    /// Position of the frame extracted for video thumbnails.
    #[must_use]
    pub fn thumbnail_time(&self) -> Duration {
        Duration::from_millis(
            self.media
                .thumbnail_time_ms
                .unwrap_or(DEFAULT_THUMBNAIL_TIME_MS),
        )
    }

    /// Effective local URI cache capacity.
    #[must_use]
    pub fn uri_cache_capacity(&self) -> usize {
        self.cache
            .uri_capacity
            .unwrap_or(DEFAULT_URI_CACHE_CAPACITY)
            .clamp(MIN_CACHE_CAPACITY, MAX_CACHE_CAPACITY)
    }

    /// Effective thumbnail cache capacity.
    #[must_use]
    pub fn thumbnail_cache_capacity(&self) -> usize {
        self.cache
            .thumbnail_capacity
            .unwrap_or(DEFAULT_THUMBNAIL_CACHE_CAPACITY)
            .clamp(MIN_CACHE_CAPACITY, MAX_CACHE_CAPACITY)
    }
}

fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => fallback,
    }
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_page_size() -> Option<u32> {
    Some(DEFAULT_PAGE_SIZE)
}

fn default_viewport_width() -> Option<f64> {
    Some(DEFAULT_VIEWPORT_WIDTH)
}

fn default_viewport_height() -> Option<f64> {
    Some(DEFAULT_VIEWPORT_HEIGHT)
}

fn default_display_cap() -> Option<f64> {
    Some(DEFAULT_DISPLAY_CAP)
}

fn default_max_scale() -> Option<f64> {
    Some(DEFAULT_MAX_SCALE)
}

fn default_thumbnail_time_ms() -> Option<u64> {
    Some(DEFAULT_THUMBNAIL_TIME_MS)
}

fn default_uri_capacity() -> Option<usize> {
    Some(DEFAULT_URI_CACHE_CAPACITY)
}

fn default_thumbnail_capacity() -> Option<usize> {
    Some(DEFAULT_THUMBNAIL_CACHE_CAPACITY)
}

// =============================================================================
// Config Path Resolution
// =============================================================================

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the settings from the default path.
///
/// Returns a tuple of (settings, optional_warning). If loading fails, returns
/// default settings with a warning message explaining what went wrong.
pub fn load() -> (PickerSettings, Option<String>) {
    load_with_override(None)
}

/// Loads the settings from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (PickerSettings, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(settings) => return (settings, None),
                Err(err) => {
                    tracing::warn!(path = %path.display(), "failed to load picker settings: {err}");
                    return (
                        PickerSettings::default(),
                        Some(format!("settings could not be loaded: {err}")),
                    );
                }
            }
        }
    }
    (PickerSettings::default(), None)
}

/// Loads settings from a specific path.
pub fn load_from_path(path: &Path) -> Result<PickerSettings> {
    let content = fs::read_to_string(path)?;
    let settings: PickerSettings = toml::from_str(&content)?;
    Ok(settings)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves the settings to the default path.
pub fn save(settings: &PickerSettings) -> Result<()> {
    save_with_override(settings, None)
}

/// Saves the settings to a custom directory.
pub fn save_with_override(settings: &PickerSettings, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(settings, &path);
    }
    Ok(())
}

/// Saves settings to a specific path.
pub fn save_to_path(settings: &PickerSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(settings).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
