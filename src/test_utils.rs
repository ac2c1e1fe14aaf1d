// SPDX-License-Identifier: MPL-2.0
//! In-memory port implementations shared by unit tests.
//!
//! The fakes record how they were called so tests can assert on caching and
//! single-flight behavior without touching the file system.

use crate::application::port::{
    AssetIndex, AssetInfo, AssetPage, CropRequest, EditError, ImageEditor, IndexError, PageCursor,
    PageRequest, ThumbnailError, ThumbnailService,
};
use crate::domain::media::{Album, AssetId, MediaAsset};
use crate::media::lock_unpoisoned;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// `count` photos with ids `p0..`, listed newest first.
pub fn numbered_photos(count: usize, extension: &str) -> Vec<MediaAsset> {
    (0..count)
        .map(|i| MediaAsset::photo(format!("p{i}"), format!("photo{i}.{extension}"), format!("ph://p{i}")))
        .collect()
}

// =============================================================================
// FakeIndex
// =============================================================================

/// Media library kept in a `Vec`, paged with offset cursors.
#[derive(Debug, Default)]
pub struct FakeIndex {
    assets: Vec<MediaAsset>,
    albums: Vec<(Album, Vec<AssetId>)>,
    denied: AtomicBool,
    repeat_last: AtomicBool,
    page_delay: Mutex<Option<Duration>>,
    next_failure: Mutex<Option<IndexError>>,
    last_request: Mutex<Option<PageRequest>>,
    page_calls: AtomicUsize,
    info_calls: AtomicUsize,
}

impl FakeIndex {
    pub fn with_assets(assets: Vec<MediaAsset>) -> Self {
        Self {
            assets,
            ..Self::default()
        }
    }

    /// Adds an album holding `ids`; its count is the number of ids.
    pub fn with_album(mut self, id: &str, title: &str, ids: &[&str]) -> Self {
        let members: Vec<AssetId> = ids.iter().map(|id| AssetId::new(*id)).collect();
        let count = u32::try_from(members.len()).unwrap_or(u32::MAX);
        self.albums.push((Album::new(id, title, count), members));
        self
    }

    pub fn deny_permission(&self) {
        self.denied.store(true, Ordering::SeqCst);
    }

    /// The next non-first page starts with the last asset of the page before.
    pub fn repeat_last_asset_on_next_page(&self) {
        self.repeat_last.store(true, Ordering::SeqCst);
    }

    pub fn set_page_delay(&self, delay: Duration) {
        *lock_unpoisoned(&self.page_delay) = Some(delay);
    }

    pub fn fail_next_page(&self, error: IndexError) {
        *lock_unpoisoned(&self.next_failure) = Some(error);
    }

    pub fn last_request(&self) -> Option<PageRequest> {
        lock_unpoisoned(&self.last_request).clone()
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    fn matching(&self, request: &PageRequest) -> Vec<&MediaAsset> {
        let members = request.album.as_ref().and_then(|album| {
            self.albums
                .iter()
                .find(|(a, _)| a.id == *album)
                .map(|(_, ids)| ids)
        });
        self.assets
            .iter()
            .filter(|asset| request.media_type.matches_kind(asset.kind))
            .filter(|asset| match (&request.album, members) {
                (None, _) => true,
                (Some(_), Some(ids)) => ids.contains(&asset.id),
                (Some(_), None) => false,
            })
            .collect()
    }
}

#[async_trait]
impl AssetIndex for FakeIndex {
    async fn request_permission(&self) -> bool {
        !self.denied.load(Ordering::SeqCst)
    }

    async fn get_page(&self, request: &PageRequest) -> Result<AssetPage, IndexError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        *lock_unpoisoned(&self.last_request) = Some(request.clone());

        let delay = *lock_unpoisoned(&self.page_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = lock_unpoisoned(&self.next_failure).take() {
            return Err(error);
        }
        if self.denied.load(Ordering::SeqCst) {
            return Err(IndexError::PermissionDenied);
        }

        let offset = request
            .after
            .as_ref()
            .map_or(Ok(0), |cursor| cursor.as_str().parse::<usize>())
            .map_err(|err| IndexError::Unavailable(err.to_string()))?;
        let matching = self.matching(request);
        let end = (offset + request.page_size as usize).min(matching.len());
        let start = offset.min(end);

        let mut assets: Vec<MediaAsset> = matching[start..end].iter().map(|a| (*a).clone()).collect();
        if start > 0 && self.repeat_last.swap(false, Ordering::SeqCst) {
            assets.insert(0, matching[start - 1].clone());
        }

        Ok(AssetPage {
            assets,
            end_cursor: Some(PageCursor::new(end.to_string())),
            has_more: end < matching.len(),
        })
    }

    async fn get_asset_info(&self, id: &AssetId) -> Result<AssetInfo, IndexError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        let asset = self
            .assets
            .iter()
            .find(|asset| asset.id == *id)
            .ok_or_else(|| IndexError::NotFound(id.to_string()))?;
        Ok(AssetInfo {
            asset: asset.clone(),
            local_uri: Some(format!("file:///local/{id}")),
        })
    }

    async fn get_albums(&self) -> Result<Vec<Album>, IndexError> {
        Ok(self.albums.iter().map(|(album, _)| album.clone()).collect())
    }
}

// =============================================================================
// FakeThumbnails
// =============================================================================

/// Returns `thumb://{uri}@{millis}` or always fails.
#[derive(Debug, Default)]
pub struct FakeThumbnails {
    failing: bool,
    calls: AtomicUsize,
}

impl FakeThumbnails {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThumbnailService for FakeThumbnails {
    async fn get_frame(&self, uri: &str, at: Duration) -> Result<String, ThumbnailError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(ThumbnailError::Failed("no decoder".into()));
        }
        Ok(format!("thumb://{uri}@{}", at.as_millis()))
    }
}

// =============================================================================
// FakeEditor
// =============================================================================

/// Reports fixed dimensions and numbers its crop outputs from 1.
#[derive(Debug, Default)]
pub struct FakeEditor {
    dimensions: (u32, u32),
    crop_failure: Mutex<Option<EditError>>,
    crops: Mutex<Vec<(String, CropRequest)>>,
    dimension_calls: AtomicUsize,
    dimension_delay: Mutex<Option<Duration>>,
    crop_delay: Mutex<Option<Duration>>,
}

impl FakeEditor {
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            dimensions: (width, height),
            ..Self::default()
        }
    }

    /// Every following crop fails with `error`.
    pub fn fail_crops(&self, error: EditError) {
        *lock_unpoisoned(&self.crop_failure) = Some(error);
    }

    pub fn set_dimension_delay(&self, delay: Duration) {
        *lock_unpoisoned(&self.dimension_delay) = Some(delay);
    }

    pub fn set_crop_delay(&self, delay: Duration) {
        *lock_unpoisoned(&self.crop_delay) = Some(delay);
    }

    pub fn last_crop(&self) -> Option<(String, CropRequest)> {
        lock_unpoisoned(&self.crops).last().cloned()
    }

    pub fn crop_count(&self) -> usize {
        lock_unpoisoned(&self.crops).len()
    }

    pub fn dimension_calls(&self) -> usize {
        self.dimension_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageEditor for FakeEditor {
    async fn dimensions(&self, _uri: &str) -> Result<(u32, u32), EditError> {
        self.dimension_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *lock_unpoisoned(&self.dimension_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let (width, height) = self.dimensions;
        if width == 0 || height == 0 {
            return Err(EditError::InvalidDimensions { width, height });
        }
        Ok(self.dimensions)
    }

    async fn crop(&self, uri: &str, request: &CropRequest) -> Result<String, EditError> {
        let delay = *lock_unpoisoned(&self.crop_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = lock_unpoisoned(&self.crop_failure).clone() {
            return Err(error);
        }
        let mut crops = lock_unpoisoned(&self.crops);
        crops.push((uri.to_string(), *request));
        Ok(format!("file:///cropped/{}.jpg", crops.len()))
    }
}
