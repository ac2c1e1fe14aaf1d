// SPDX-License-Identifier: MPL-2.0
//! Media filtering types for the domain layer.
//!
//! # Available Filters
//!
//! - [`MediaTypeFilter`]: Filter by media kind (photos, videos, or all)
//! - [`ExtensionFilter`]: Client-side exclusion by file extension
//! - [`LibraryFilter`]: Media kind + album, the key of a pagination sequence

use super::types::{AlbumId, MediaAsset, MediaKind};
use std::time::Duration;

// =============================================================================
// Media Type Filter
// =============================================================================

/// Filter by media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaTypeFilter {
    /// Photos and videos.
    #[default]
    All,
    /// Photos only.
    PhotosOnly,
    /// Videos only.
    VideosOnly,
}

impl MediaTypeFilter {
    /// Media kinds requested from the index for this filter.
    #[must_use]
    pub fn kinds(&self) -> &'static [MediaKind] {
        match self {
            Self::All => &[MediaKind::Photo, MediaKind::Video],
            Self::PhotosOnly => &[MediaKind::Photo],
            Self::VideosOnly => &[MediaKind::Video],
        }
    }

    /// Returns `true` if this filter matches the given media kind.
    #[must_use]
    pub fn matches_kind(&self, kind: MediaKind) -> bool {
        self.kinds().contains(&kind)
    }

    /// Returns `true` if this filter is active (not `All`).
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::All)
    }
}

// =============================================================================
// Extension Filter
// =============================================================================

/// Case-insensitive list of excluded file extensions.
///
/// The media index cannot filter by extension, so exclusion is applied to
/// every page after it is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionFilter {
    excluded: Vec<String>,
}

impl ExtensionFilter {
    /// Builds a filter from extensions with or without a leading dot.
    #[must_use]
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut excluded: Vec<String> = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        excluded.sort();
        excluded.dedup();
        Self { excluded }
    }

    /// Returns `true` if the file name carries an excluded extension.
    #[must_use]
    pub fn is_excluded(&self, filename: &str) -> bool {
        if self.excluded.is_empty() {
            return false;
        }
        let extension = file_extension(filename);
        self.excluded.iter().any(|excluded| *excluded == extension)
    }

    /// Returns `true` if the asset should be listed.
    #[must_use]
    pub fn allows(&self, asset: &MediaAsset) -> bool {
        !self.is_excluded(&asset.filename)
    }

    /// The normalized excluded extensions.
    #[must_use]
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

// =============================================================================
// Library Filter
// =============================================================================

/// Active library query: media kind plus album (`None` = recents).
///
/// A change of this value invalidates the pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LibraryFilter {
    pub media_type: MediaTypeFilter,
    pub album: Option<AlbumId>,
}

impl LibraryFilter {
    #[must_use]
    pub fn new(media_type: MediaTypeFilter) -> Self {
        Self {
            media_type,
            album: None,
        }
    }
}

// =============================================================================
// File name helpers
// =============================================================================

/// Lower-cased text after the last dot, or an empty string.
#[must_use]
pub fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// MIME type for a file name, `application/octet-stream` when unknown.
#[must_use]
pub fn mime_type_for(filename: &str) -> &'static str {
    match file_extension(filename).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "m4v" => "video/x-m4v",
        "3gp" => "video/3gpp",
        _ => "application/octet-stream",
    }
}

/// Formats a clip length as `m:ss` for video badges.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

// =============================================================================
// Tests
// =============================================================================
