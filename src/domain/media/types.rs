// SPDX-License-Identifier: MPL-2.0
//! Core media library types for the domain layer.
//!
//! These types are read-only views over an external media index: the picker
//! never creates, modifies or deletes the assets they describe.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

use super::filter::{file_extension, mime_type_for};

/// Stable identifier of an asset in the media index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(String);

impl AssetId {
    /// Creates an identifier from its textual form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AssetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Kind of a library asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Still image.
    Photo,
    /// Video clip.
    Video,
}

/// A photo or video entry of the media index.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    /// Stable identifier.
    pub id: AssetId,
    /// Photo or video.
    pub kind: MediaKind,
    /// File name including extension, as reported by the index.
    pub filename: String,
    /// Raw URI reported by the index. Always displayable, possibly slow.
    pub uri: String,
    /// Pixel width as reported by the index (0 when unknown).
    pub width: u32,
    /// Pixel height as reported by the index (0 when unknown).
    pub height: u32,
    /// Clip length. Only set for videos.
    pub duration: Option<Duration>,
    /// Last modification time, used for library ordering.
    pub modified_at: Option<DateTime<Utc>>,
}

impl MediaAsset {
    /// Creates a photo asset with unknown dimensions.
    #[must_use]
    pub fn photo(id: impl Into<AssetId>, filename: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Photo,
            filename: filename.into(),
            uri: uri.into(),
            width: 0,
            height: 0,
            duration: None,
            modified_at: None,
        }
    }

    /// Creates a video asset with the given duration.
    #[must_use]
    pub fn video(
        id: impl Into<AssetId>,
        filename: impl Into<String>,
        uri: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            kind: MediaKind::Video,
            duration: Some(duration),
            ..Self::photo(id, filename, uri)
        }
    }

    /// Sets the pixel dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the modification time.
    #[must_use]
    pub fn with_modified_at(mut self, modified_at: DateTime<Utc>) -> Self {
        self.modified_at = Some(modified_at);
        self
    }

    /// Returns `true` for video assets.
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    /// Lower-cased file extension, empty when the name has none.
    #[must_use]
    pub fn extension(&self) -> String {
        file_extension(&self.filename)
    }

    /// MIME type derived from the file extension.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        mime_type_for(&self.filename)
    }
}

/// Identifier of an album in the media index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlbumId(String);

impl AlbumId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named group of assets supplied by the media index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub asset_count: u32,
}

impl Album {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, asset_count: u32) -> Self {
        Self {
            id: AlbumId::new(id),
            title: title.into(),
            asset_count,
        }
    }
}

/// An asset handed back to the caller of a pick, enriched for immediate use.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedMedia {
    /// The asset as re-fetched from the media index.
    pub asset: MediaAsset,
    /// Resolved local URI, when the index could provide one.
    pub local_uri: Option<String>,
    /// MIME type derived from the file name.
    pub mime_type: &'static str,
    /// Output of the crop editor, when the pick went through it.
    pub cropped_uri: Option<String>,
}

impl PickedMedia {
    /// URI the caller should use: cropped output first, then local, then raw.
    #[must_use]
    pub fn uri(&self) -> &str {
        self.cropped_uri
            .as_deref()
            .or(self.local_uri.as_deref())
            .unwrap_or(&self.asset.uri)
    }
}
