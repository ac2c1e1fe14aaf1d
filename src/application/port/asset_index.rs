// SPDX-License-Identifier: MPL-2.0
//! Media index port definition.
//!
//! The media index is the external, read-only store of photos and videos.
//! It pages assets newest first and cannot filter by file extension.

use crate::domain::media::{Album, AlbumId, AssetId, MediaAsset, MediaTypeFilter};
use async_trait::async_trait;
use std::fmt;

// =============================================================================
// IndexError
// =============================================================================

/// Errors reported by the media index.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexError {
    /// Library access was refused by the user or revoked.
    PermissionDenied,

    /// The index could not serve the request right now.
    Unavailable(String),

    /// No asset or album with this identifier.
    NotFound(String),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::PermissionDenied => write!(f, "Media library access denied"),
            IndexError::Unavailable(msg) => write!(f, "Media library unavailable: {msg}"),
            IndexError::NotFound(id) => write!(f, "Asset not found: {id}"),
        }
    }
}

impl std::error::Error for IndexError {}

// =============================================================================
// Paging types
// =============================================================================

/// Opaque position in the index, returned with each page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor(String);

impl PageCursor {
    #[must_use]
    pub fn new(cursor: impl Into<String>) -> Self {
        Self(cursor.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parameters of one page fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Cursor returned with the previous page; `None` starts from the newest asset.
    pub after: Option<PageCursor>,
    pub page_size: u32,
    pub media_type: MediaTypeFilter,
    /// `None` pages the default "recent" album.
    pub album: Option<AlbumId>,
}

/// One page of assets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssetPage {
    pub assets: Vec<MediaAsset>,
    pub end_cursor: Option<PageCursor>,
    pub has_more: bool,
}

/// Full record of a single asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetInfo {
    pub asset: MediaAsset,
    /// Directly readable URI, when the index can provide one.
    pub local_uri: Option<String>,
}

// =============================================================================
// AssetIndex Trait
// =============================================================================

/// Read-only access to the device media library.
#[async_trait]
pub trait AssetIndex: Send + Sync {
    /// Asks for library access. Returns `true` when granted.
    async fn request_permission(&self) -> bool;

    /// Fetches one page of assets, newest modification time first.
    ///
    /// # Errors
    ///
    /// Returns an error if access is denied or the index is unavailable.
    async fn get_page(&self, request: &PageRequest) -> Result<AssetPage, IndexError>;

    /// Fetches the full record of one asset.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NotFound`] if the asset no longer exists.
    async fn get_asset_info(&self, id: &AssetId) -> Result<AssetInfo, IndexError>;

    /// Lists the albums of the library, smart albums included.
    ///
    /// # Errors
    ///
    /// Returns an error if access is denied or the index is unavailable.
    async fn get_albums(&self) -> Result<Vec<Album>, IndexError>;
}
