// SPDX-License-Identifier: MPL-2.0
//! Album browser entries with cover images.

use crate::application::port::{AssetIndex, IndexError, PageRequest};
use crate::domain::media::{Album, AlbumId, MediaAsset, MediaTypeFilter};
use crate::error::Result;
use crate::media::resolver::MediaUriResolver;
use futures_util::future::join_all;
use std::time::Duration;

/// Title of the synthetic entry that pages the whole library.
pub const RECENTS_TITLE: &str = "Recents";

/// One entry of the album browser.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumCover {
    /// `None` for the "Recents" entry.
    pub album: Option<Album>,
    /// Displayable image of the most recent asset.
    pub cover_uri: String,
    pub cover_is_video: bool,
}

impl AlbumCover {
    #[must_use]
    pub fn title(&self) -> &str {
        self.album.as_ref().map_or(RECENTS_TITLE, |album| album.title.as_str())
    }

    /// Identifier to pass to the paginator (`None` = recents).
    #[must_use]
    pub fn album_id(&self) -> Option<AlbumId> {
        self.album.as_ref().map(|album| album.id.clone())
    }

    /// Asset count reported by the index; unknown for "Recents".
    #[must_use]
    pub fn asset_count(&self) -> Option<u32> {
        self.album.as_ref().map(|album| album.asset_count)
    }
}

/// Lists the albums holding at least one asset of `media_type`, most recent
/// asset as cover, preceded by a "Recents" entry when the library is not empty.
///
/// Albums whose cover cannot be fetched are dropped.
///
/// # Errors
///
/// Returns an error if the album list itself cannot be fetched.
pub async fn list_albums(
    index: &dyn AssetIndex,
    resolver: &MediaUriResolver,
    media_type: MediaTypeFilter,
) -> Result<Vec<AlbumCover>> {
    let albums = index.get_albums().await?;

    let recents = async { latest_asset(index, media_type, None).await.ok().flatten() };
    let covers = join_all(
        albums
            .into_iter()
            .filter(|album| album.asset_count > 0)
            .map(|album| async move {
                match latest_asset(index, media_type, Some(album.id.clone())).await {
                    Ok(Some(asset)) => Some((Some(album), asset)),
                    Ok(None) => None,
                    Err(err) => {
                        tracing::warn!(album = %album.id, error = %err, "album cover lookup failed");
                        None
                    }
                }
            }),
    );
    let (recent, covers) = tokio::join!(recents, covers);

    let mut entries = Vec::with_capacity(covers.len() + 1);
    let recent = recent.map(|asset| (None, asset));
    for (album, asset) in recent.into_iter().chain(covers.into_iter().flatten()) {
        entries.push(AlbumCover {
            cover_uri: cover_uri(resolver, &asset).await,
            cover_is_video: asset.is_video(),
            album,
        });
    }
    Ok(entries)
}

async fn latest_asset(
    index: &dyn AssetIndex,
    media_type: MediaTypeFilter,
    album: Option<AlbumId>,
) -> std::result::Result<Option<MediaAsset>, IndexError> {
    let request = PageRequest {
        after: None,
        page_size: 1,
        media_type,
        album,
    };
    let page = index.get_page(&request).await?;
    Ok(page.assets.into_iter().next())
}

async fn cover_uri(resolver: &MediaUriResolver, asset: &MediaAsset) -> String {
    if asset.is_video() {
        resolver.frame_or_raw(&asset.uri, Duration::ZERO).await
    } else {
        asset.uri.clone()
    }
}
