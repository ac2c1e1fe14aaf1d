// SPDX-License-Identifier: MPL-2.0
//! Displayable URI resolution for library assets.
//!
//! Photos resolve to their local URI, videos to a decoded frame. Every path
//! ends in a URI the caller can show: failures fall back to the raw asset URI.

use crate::application::port::{AssetIndex, ThumbnailService};
use crate::config::PickerSettings;
use crate::domain::media::{AssetId, MediaAsset, MediaKind};
use crate::media::cache::{AsyncCache, CacheStats};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

/// Resolves assets to displayable URIs, memoized per asset id.
///
/// Both caches live as long as the resolver, which is meant to be created
/// once per process and shared between sessions.
pub struct MediaUriResolver {
    index: Arc<dyn AssetIndex>,
    thumbnails: Arc<dyn ThumbnailService>,
    local_uris: AsyncCache<AssetId, String>,
    video_frames: AsyncCache<AssetId, String>,
    frame_time: Duration,
}

impl MediaUriResolver {
    #[must_use]
    pub fn new(
        index: Arc<dyn AssetIndex>,
        thumbnails: Arc<dyn ThumbnailService>,
        settings: &PickerSettings,
    ) -> Self {
        Self {
            index,
            thumbnails,
            local_uris: AsyncCache::new("local_uri", settings.uri_cache_capacity()),
            video_frames: AsyncCache::new("video_thumbnail", settings.thumbnail_cache_capacity()),
            frame_time: settings.thumbnail_time(),
        }
    }

    /// Display URI for any asset: local URI for photos, a frame for videos.
    ///
    /// Returns `None` only when the asset carries no URI at all.
    pub async fn resolve(&self, asset: &MediaAsset) -> Option<String> {
        let uri = match asset.kind {
            MediaKind::Photo => self.local_uri(asset).await,
            MediaKind::Video => self.video_thumbnail(asset).await,
        };
        (!uri.is_empty()).then_some(uri)
    }

    /// Local URI of the asset, or its raw URI when the index cannot provide one.
    ///
    /// The fallback is cached as well: the first resolution wins.
    pub async fn local_uri(&self, asset: &MediaAsset) -> String {
        let result = self
            .local_uris
            .get_or_try_resolve(asset.id.clone(), move || async move {
                let uri = match self.index.get_asset_info(&asset.id).await {
                    Ok(info) => info.local_uri.unwrap_or_else(|| asset.uri.clone()),
                    Err(err) => {
                        tracing::warn!(asset = %asset.id, error = %err, "local URI lookup failed, using raw URI");
                        asset.uri.clone()
                    }
                };
                Ok::<_, Infallible>(uri)
            })
            .await;

        match result {
            Ok(uri) => uri,
            Err(never) => match never {},
        }
    }

    /// Frame of a video at the configured time.
    ///
    /// On extraction failure the raw URI is returned and nothing is cached,
    /// so a later call retries.
    pub async fn video_thumbnail(&self, asset: &MediaAsset) -> String {
        let result = self
            .video_frames
            .get_or_try_resolve(asset.id.clone(), move || async move {
                let source = self.local_uri(asset).await;
                self.thumbnails.get_frame(&source, self.frame_time).await
            })
            .await;

        match result {
            Ok(uri) => uri,
            Err(err) => {
                tracing::warn!(asset = %asset.id, error = %err, "video thumbnail failed, using raw URI");
                asset.uri.clone()
            }
        }
    }

    /// Uncached frame of `uri` at `at`, falling back to `uri` itself.
    pub async fn frame_or_raw(&self, uri: &str, at: Duration) -> String {
        match self.thumbnails.get_frame(uri, at).await {
            Ok(frame) => frame,
            Err(err) => {
                tracing::debug!(%uri, error = %err, "frame extraction failed, using raw URI");
                uri.to_string()
            }
        }
    }

    /// Drops both caches.
    pub fn clear(&self) {
        self.local_uris.clear();
        self.video_frames.clear();
    }

    #[must_use]
    pub fn local_uri_stats(&self) -> CacheStats {
        self.local_uris.stats()
    }

    #[must_use]
    pub fn thumbnail_stats(&self) -> CacheStats {
        self.video_frames.stats()
    }
}

impl std::fmt::Debug for MediaUriResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaUriResolver")
            .field("local_uris", &self.local_uris)
            .field("video_frames", &self.video_frames)
            .field("frame_time", &self.frame_time)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeIndex, FakeThumbnails};

    fn resolver(index: &Arc<FakeIndex>, thumbnails: &Arc<FakeThumbnails>) -> MediaUriResolver {
        MediaUriResolver::new(
            Arc::clone(index) as Arc<dyn AssetIndex>,
            Arc::clone(thumbnails) as Arc<dyn ThumbnailService>,
            &PickerSettings::default(),
        )
    }

    #[tokio::test]
    async fn photo_resolves_to_local_uri_once() {
        let photo = MediaAsset::photo("p1", "a.jpg", "ph://p1");
        let index = Arc::new(FakeIndex::with_assets(vec![photo.clone()]));
        let thumbs = Arc::new(FakeThumbnails::default());
        let resolver = resolver(&index, &thumbs);

        assert_eq!(resolver.resolve(&photo).await.as_deref(), Some("file:///local/p1"));
        assert_eq!(resolver.resolve(&photo).await.as_deref(), Some("file:///local/p1"));
        assert_eq!(index.info_calls(), 1);
    }

    #[tokio::test]
    async fn failed_local_lookup_caches_raw_uri() {
        let photo = MediaAsset::photo("gone", "a.jpg", "ph://gone");
        let index = Arc::new(FakeIndex::default());
        let thumbs = Arc::new(FakeThumbnails::default());
        let resolver = resolver(&index, &thumbs);

        assert_eq!(resolver.local_uri(&photo).await, "ph://gone");
        assert_eq!(resolver.local_uri(&photo).await, "ph://gone");
        assert_eq!(index.info_calls(), 1);
    }

    #[tokio::test]
    async fn video_uses_frame_from_local_uri() {
        let video = MediaAsset::video("v1", "clip.mp4", "ph://v1", Duration::from_secs(3));
        let index = Arc::new(FakeIndex::with_assets(vec![video.clone()]));
        let thumbs = Arc::new(FakeThumbnails::default());
        let resolver = resolver(&index, &thumbs);

        let uri = resolver.resolve(&video).await;
        assert_eq!(uri.as_deref(), Some("thumb://file:///local/v1@1000"));
        resolver.resolve(&video).await;
        assert_eq!(thumbs.calls(), 1);
    }

    #[tokio::test]
    async fn thumbnail_failure_falls_back_without_caching() {
        let video = MediaAsset::video("v1", "clip.mp4", "ph://v1", Duration::from_secs(3));
        let index = Arc::new(FakeIndex::with_assets(vec![video.clone()]));
        let thumbs = Arc::new(FakeThumbnails::failing());
        let resolver = resolver(&index, &thumbs);

        assert_eq!(resolver.video_thumbnail(&video).await, "ph://v1");
        assert_eq!(resolver.video_thumbnail(&video).await, "ph://v1");
        assert_eq!(thumbs.calls(), 2);
    }

    #[tokio::test]
    async fn clear_forces_new_lookups() {
        let photo = MediaAsset::photo("p1", "a.jpg", "ph://p1");
        let index = Arc::new(FakeIndex::with_assets(vec![photo.clone()]));
        let thumbs = Arc::new(FakeThumbnails::default());
        let resolver = resolver(&index, &thumbs);

        resolver.local_uri(&photo).await;
        resolver.clear();
        resolver.local_uri(&photo).await;
        assert_eq!(index.info_calls(), 2);
    }

    #[tokio::test]
    async fn empty_uri_resolves_to_none() {
        let photo = MediaAsset::photo("p1", "a.jpg", "");
        let index = Arc::new(FakeIndex::default());
        let thumbs = Arc::new(FakeThumbnails::default());
        let resolver = resolver(&index, &thumbs);

        assert_eq!(resolver.resolve(&photo).await, None);
    }
}
