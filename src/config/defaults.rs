// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the picker. Constants are organized by category.
//!
//! # Categories
//!
//! - **Pagination**: Page size for media library queries
//! - **Crop**: Crop viewport, display downscale cap and zoom bounds
//! - **Media**: Video thumbnail frame position
//! - **Cache**: URI and thumbnail cache capacities

// ==========================================================================
// Pagination Defaults
// ==========================================================================

/// Default number of assets requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Minimum page size.
pub const MIN_PAGE_SIZE: u32 = 1;

/// Maximum page size.
pub const MAX_PAGE_SIZE: u32 = 500;

// ==========================================================================
// Crop Defaults
// ==========================================================================

/// Default crop viewport width in display units.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 360.0;

/// Default crop viewport height, used when no aspect ratio is configured.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 300.0;

/// Images larger than this (on their longest side) are downscaled for gestures.
pub const DEFAULT_DISPLAY_CAP: f64 = 1000.0;

/// Smallest accepted display cap.
pub const MIN_DISPLAY_CAP: f64 = 64.0;

/// Default upper zoom bound for the crop editor.
pub const DEFAULT_MAX_SCALE: f64 = 5.0;

/// The upper zoom bound can never go below 1x.
pub const MIN_MAX_SCALE: f64 = 1.0;

// ==========================================================================
// Media Defaults
// ==========================================================================

/// Default timestamp of the frame extracted for video thumbnails (ms).
pub const DEFAULT_THUMBNAIL_TIME_MS: u64 = 1000;

// ==========================================================================
// Cache Defaults
// ==========================================================================

/// Default number of resolved local URIs kept in memory.
pub const DEFAULT_URI_CACHE_CAPACITY: usize = 512;

/// Default number of video thumbnails kept in memory.
pub const DEFAULT_THUMBNAIL_CACHE_CAPACITY: usize = 256;

/// Minimum capacity for either cache.
pub const MIN_CACHE_CAPACITY: usize = 16;

/// Maximum capacity for either cache.
pub const MAX_CACHE_CAPACITY: usize = 8192;
