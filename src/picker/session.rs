// SPDX-License-Identifier: MPL-2.0
//! One live picker session.
//!
//! # States
//!
//! ```text
//! Browsing ◄──────► Cropping        (exactly one photo selected, crop enabled,
//!    │                 │             image loaded)
//!    ├─ validate() ────┴──► Validated
//!    └─ close() / drop ────► Cancelled
//! ```
//!
//! The pending result is resolved exactly once: with the picked assets on
//! validation, with `None` on close or when the session is dropped.

use crate::application::port::{AssetIndex, CropRequest, ImageEditor};
use crate::domain::crop::{CropShape, Dimensions};
use crate::domain::media::{AlbumId, AssetId, MediaAsset, MediaKind, MediaTypeFilter, PickedMedia};
use crate::domain::picker::PickerConfig;
use crate::editor::{CropTransform, CropTransformEngine, RenderTransform};
use crate::error::{Error, Result};
use crate::media::cache::lock_unpoisoned;
use crate::media::{
    list_albums, resolve_assets, AlbumCover, AssetPaginator, MediaUriResolver, PageLoad,
    PaginatorSnapshot, SelectionManager, ToggleOutcome,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Value a pick resolves to: the picked assets, or `None` when cancelled.
pub type PickResult = Option<Vec<PickedMedia>>;

/// Phase of a picker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Browsing,
    Cropping,
    Validated,
    Cancelled,
}

impl SessionPhase {
    /// Returns `true` once the result has been delivered.
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Validated | Self::Cancelled)
    }
}

/// Future resolving to the outcome of a pick.
///
/// Resolves to `None` if the session is closed or dropped without validation.
#[derive(Debug)]
pub struct PendingPick {
    receiver: oneshot::Receiver<PickResult>,
}

impl Future for PendingPick {
    type Output = PickResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.ok().flatten())
    }
}

/// Collaborators shared between the picker and its sessions.
pub(crate) struct SessionServices {
    pub(crate) index: Arc<dyn AssetIndex>,
    pub(crate) editor: Arc<dyn ImageEditor>,
    pub(crate) resolver: Arc<MediaUriResolver>,
    pub(crate) active: Arc<AtomicBool>,
}

struct SessionState {
    phase: SessionPhase,
    selection: SelectionManager,
    /// Present when the crop editor is enabled.
    crop: Option<CropTransformEngine>,
    /// The single selected photo the editor is loaded with.
    crop_target: Option<MediaAsset>,
    /// An editor load for the current epoch has not finished yet.
    crop_loading: bool,
    /// Bumped whenever a pending editor load becomes stale.
    crop_epoch: u64,
    validating: bool,
    result: Option<oneshot::Sender<PickResult>>,
}

impl SessionState {
    fn ensure_open(&self) -> Result<()> {
        if self.phase.is_finished() {
            Err(Error::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn unload_crop(&mut self) {
        self.crop_epoch += 1;
        self.crop_target = None;
        self.crop_loading = false;
        if let Some(engine) = &mut self.crop {
            engine.reset();
        }
        if self.phase == SessionPhase::Cropping {
            self.phase = SessionPhase::Browsing;
        }
    }
}

/// Browsing, selection and crop state of one pick.
pub struct PickerSession {
    config: PickerConfig,
    index: Arc<dyn AssetIndex>,
    editor: Arc<dyn ImageEditor>,
    resolver: Arc<MediaUriResolver>,
    active: Arc<AtomicBool>,
    paginator: AssetPaginator,
    state: Mutex<SessionState>,
}

impl PickerSession {
    pub(crate) fn open(
        config: PickerConfig,
        services: SessionServices,
        paginator: AssetPaginator,
        crop: Option<CropTransformEngine>,
    ) -> (Self, PendingPick) {
        let (sender, receiver) = oneshot::channel();
        let state = SessionState {
            phase: SessionPhase::Browsing,
            selection: SelectionManager::from_config(&config),
            crop,
            crop_target: None,
            crop_loading: false,
            crop_epoch: 0,
            validating: false,
            result: Some(sender),
        };
        let session = Self {
            config,
            index: services.index,
            editor: services.editor,
            resolver: services.resolver,
            active: services.active,
            paginator,
            state: Mutex::new(state),
        };
        (session, PendingPick { receiver })
    }

    #[must_use]
    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        lock_unpoisoned(&self.state).phase
    }

    // =========================================================================
    // Browsing
    // =========================================================================

    /// Requests library access and loads the first page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] after close or validation, or the
    /// page fetch error.
    pub async fn start(&self) -> Result<PageLoad> {
        self.ensure_open()?;
        self.paginator.start().await
    }

    /// Loads the next page of the active filter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] after close or validation, or the
    /// page fetch error. A failed fetch can be retried.
    pub async fn load_next_page(&self) -> Result<PageLoad> {
        self.ensure_open()?;
        self.paginator.load_next_page(false).await
    }

    /// Reloads the active filter from its first page.
    ///
    /// # Errors
    ///
    /// Same as [`load_next_page`](Self::load_next_page).
    pub async fn refresh(&self) -> Result<PageLoad> {
        self.ensure_open()?;
        self.paginator.load_next_page(true).await
    }

    /// Switches between photos and videos.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FilterLocked`] unless every media kind is allowed and
    /// crop is disabled.
    pub async fn set_media_filter(&self, filter: MediaTypeFilter) -> Result<PageLoad> {
        self.ensure_open()?;
        if !self.config.can_change_media_filter() {
            return Err(Error::FilterLocked);
        }
        self.paginator.set_media_type(filter).await
    }

    /// Switches to an album (`None` = recents). The selection is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] or the page fetch error.
    pub async fn select_album(&self, album: Option<AlbumId>) -> Result<PageLoad> {
        self.ensure_open()?;
        self.paginator.set_album(album).await
    }

    /// Album browser entries for the active media filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the album list cannot be fetched.
    pub async fn albums(&self) -> Result<Vec<AlbumCover>> {
        self.ensure_open()?;
        let media_type = self.paginator.filter().media_type;
        list_albums(self.index.as_ref(), &self.resolver, media_type).await
    }

    #[must_use]
    pub fn snapshot(&self) -> PaginatorSnapshot {
        self.paginator.snapshot()
    }

    #[must_use]
    pub fn items(&self) -> Vec<MediaAsset> {
        self.paginator.items()
    }

    /// Display URI for a long-press preview. Does not touch the selection.
    pub async fn preview_uri(&self, asset: &MediaAsset) -> Option<String> {
        self.resolver.resolve(asset).await
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Toggles an asset. With crop enabled and exactly one photo selected,
    /// the crop editor is loaded with that photo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] after close or validation.
    pub async fn toggle(&self, id: &AssetId) -> Result<ToggleOutcome> {
        let (outcome, pending) = {
            let mut state = lock_unpoisoned(&self.state);
            state.ensure_open()?;
            if state.validating {
                return Ok(ToggleOutcome::Rejected);
            }
            let outcome = state.selection.toggle(id);
            if !outcome.changed() || state.crop.is_none() {
                return Ok(outcome);
            }
            state.unload_crop();
            let pending = state.selection.single().cloned().map(|single| (single, state.crop_epoch));
            state.crop_loading = pending.is_some();
            (outcome, pending)
        };

        if let Some((single, epoch)) = pending {
            self.load_crop_target(&single, epoch).await;
        }
        Ok(outcome)
    }

    /// Loads the editor with the single selected photo.
    ///
    /// Whatever the outcome, the pending load is settled for `epoch`: on
    /// failure or for a video no crop target remains and validation returns
    /// the asset uncropped.
    async fn load_crop_target(&self, id: &AssetId, epoch: u64) {
        let prepared = self.prepare_crop_image(id).await;

        let mut state = lock_unpoisoned(&self.state);
        if state.crop_epoch != epoch || state.phase.is_finished() {
            tracing::debug!(asset = %id, "discarding stale crop image");
            return;
        }
        state.crop_loading = false;
        let Some((asset, uri, dimensions)) = prepared else {
            return;
        };
        let loaded = state
            .crop
            .as_mut()
            .map(|engine| engine.initialize(uri, dimensions));
        match loaded {
            Some(Ok(_)) => {
                state.crop_target = Some(asset);
                state.phase = SessionPhase::Cropping;
            }
            Some(Err(err)) => tracing::error!(asset = %id, error = %err, "crop editor rejected image"),
            None => {}
        }
    }

    /// Looks up the photo, its display URI and its natural size.
    async fn prepare_crop_image(&self, id: &AssetId) -> Option<(MediaAsset, String, (u32, u32))> {
        let asset = match self.paginator.find(id) {
            Some(asset) => asset,
            None => match self.index.get_asset_info(id).await {
                Ok(info) => info.asset,
                Err(err) => {
                    tracing::warn!(asset = %id, error = %err, "selected asset not found for crop");
                    return None;
                }
            },
        };
        if asset.kind != MediaKind::Photo {
            tracing::debug!(asset = %id, "crop editor skipped for video");
            return None;
        }

        let Some(uri) = self.resolver.resolve(&asset).await else {
            tracing::warn!(asset = %id, "no displayable URI for crop");
            return None;
        };
        match self.editor.dimensions(&uri).await {
            Ok(dimensions) => Some((asset, uri, dimensions)),
            Err(err) => {
                tracing::error!(asset = %id, error = %err, "failed to read image size for crop");
                None
            }
        }
    }

    #[must_use]
    pub fn is_selected(&self, id: &AssetId) -> bool {
        lock_unpoisoned(&self.state).selection.is_selected(id)
    }

    #[must_use]
    pub fn selected_ids(&self) -> Vec<AssetId> {
        lock_unpoisoned(&self.state).selection.ids().to_vec()
    }

    #[must_use]
    pub fn selection_count(&self) -> usize {
        lock_unpoisoned(&self.state).selection.len()
    }

    /// Header counter, e.g. `"2 / 5 selected"`.
    #[must_use]
    pub fn selection_label(&self) -> String {
        self.config.selection_label(self.selection_count())
    }

    /// Returns `true` if [`validate`](Self::validate) would deliver a result.
    #[must_use]
    pub fn can_validate(&self) -> bool {
        let state = lock_unpoisoned(&self.state);
        if state.phase.is_finished() || state.validating || state.crop_loading || state.selection.is_empty() {
            return false;
        }
        match (&state.crop_target, &state.crop) {
            (Some(_), Some(engine)) => engine.is_ready(),
            _ => true,
        }
    }

    // =========================================================================
    // Crop editor
    // =========================================================================

    /// Viewport size and shape, when the crop editor is enabled.
    #[must_use]
    pub fn crop_viewport(&self) -> Option<(Dimensions, CropShape)> {
        let state = lock_unpoisoned(&self.state);
        state.crop.as_ref().map(|engine| (engine.viewport(), engine.shape()))
    }

    #[must_use]
    pub fn crop_transform(&self) -> Option<CropTransform> {
        self.with_engine(|engine| engine.transform())
    }

    #[must_use]
    pub fn render_transform(&self) -> Option<RenderTransform> {
        self.with_engine(|engine| engine.render_transform())
    }

    pub fn on_pan_start(&self) {
        self.with_engine(|engine| {
            engine.on_pan_start();
            Some(())
        });
    }

    pub fn on_pan_update(&self, dx: f64, dy: f64) -> Option<CropTransform> {
        self.with_engine(|engine| engine.on_pan_update(dx, dy))
    }

    pub fn on_pan_end(&self) {
        self.with_engine(|engine| {
            engine.on_pan_end();
            Some(())
        });
    }

    pub fn on_pinch_start(&self) {
        self.with_engine(|engine| {
            engine.on_pinch_start();
            Some(())
        });
    }

    pub fn on_pinch_update(&self, factor: f64) -> Option<CropTransform> {
        self.with_engine(|engine| engine.on_pinch_update(factor))
    }

    pub fn on_pinch_end(&self) {
        self.with_engine(|engine| {
            engine.on_pinch_end();
            Some(())
        });
    }

    fn with_engine<T>(&self, f: impl FnOnce(&mut CropTransformEngine) -> Option<T>) -> Option<T> {
        let mut state = lock_unpoisoned(&self.state);
        if state.phase != SessionPhase::Cropping {
            return None;
        }
        state.crop.as_mut().and_then(f)
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Delivers the selection to the pending pick.
    ///
    /// With the crop editor loaded, the single photo is cropped first and
    /// returned with its cropped URI. Returns `Ok(false)` without doing
    /// anything when nothing is selected or a validation is already running.
    ///
    /// # Errors
    ///
    /// - [`Error::CropNotReady`] while the crop image is still loading
    /// - the encoder error if the crop fails; selection and transform are kept
    ///   so the caller can retry
    /// - [`Error::SessionClosed`] if the session was closed meanwhile
    pub async fn validate(&self) -> Result<bool> {
        let (ids, crop_job, crop_target) = {
            let mut state = lock_unpoisoned(&self.state);
            state.ensure_open()?;
            if state.validating || state.selection.is_empty() {
                return Ok(false);
            }
            if state.crop_loading {
                return Err(Error::CropNotReady);
            }
            let ids = state.selection.ids().to_vec();
            let crop_job = match (&state.crop_target, &state.crop) {
                (Some(_), Some(engine)) => Some(engine.crop_job().ok_or(Error::CropNotReady)?),
                _ => None,
            };
            state.validating = true;
            (ids, crop_job, state.crop_target.clone())
        };

        let cropped_uri = match crop_job {
            Some((uri, request)) => match self.crop(&uri, &request).await {
                Ok(output) => Some(output),
                Err(err) => {
                    lock_unpoisoned(&self.state).validating = false;
                    return Err(err);
                }
            },
            None => None,
        };

        let mut picked = resolve_assets(&ids, self.index.as_ref()).await;
        if let Some(cropped) = cropped_uri {
            if picked.is_empty() {
                if let Some(asset) = crop_target {
                    picked.push(PickedMedia {
                        mime_type: asset.mime_type(),
                        asset,
                        local_uri: None,
                        cropped_uri: None,
                    });
                }
            }
            let mime_type = self.editor.output_mime_type();
            for item in &mut picked {
                item.cropped_uri = Some(cropped.clone());
                item.mime_type = mime_type;
            }
        }

        let mut state = lock_unpoisoned(&self.state);
        state.validating = false;
        if state.phase.is_finished() {
            tracing::debug!("session closed during validation, result discarded");
            return Err(Error::SessionClosed);
        }
        state.phase = SessionPhase::Validated;
        tracing::info!(count = picked.len(), "pick validated");
        self.deliver(&mut state, Some(picked));
        Ok(true)
    }

    async fn crop(&self, uri: &str, request: &CropRequest) -> Result<String> {
        self.editor.crop(uri, request).await.map_err(|err| {
            tracing::error!(%uri, error = %err, "crop encode failed");
            Error::from(err)
        })
    }

    /// Cancels the pick: clears selection and crop state and resolves the
    /// pending pick with `None`. Does nothing once finished.
    pub fn close(&self) {
        let mut state = lock_unpoisoned(&self.state);
        self.cancel(&mut state);
    }

    fn cancel(&self, state: &mut SessionState) {
        if state.phase.is_finished() {
            return;
        }
        state.unload_crop();
        state.selection.clear();
        state.phase = SessionPhase::Cancelled;
        self.paginator.invalidate();
        tracing::info!("pick cancelled");
        self.deliver(state, None);
    }

    fn deliver(&self, state: &mut SessionState, result: PickResult) {
        if let Some(sender) = state.result.take() {
            // The caller may have stopped waiting; nothing to do then.
            let _ = sender.send(result);
            self.active.store(false, Ordering::Release);
        }
    }

    fn ensure_open(&self) -> Result<()> {
        lock_unpoisoned(&self.state).ensure_open()
    }
}

impl Drop for PickerSession {
    fn drop(&mut self) {
        let mut state = lock_unpoisoned(&self.state);
        self.cancel(&mut state);
    }
}

impl std::fmt::Debug for PickerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock_unpoisoned(&self.state);
        f.debug_struct("PickerSession")
            .field("config", &self.config)
            .field("phase", &state.phase)
            .field("selected", &state.selection.len())
            .field("paginator", &self.paginator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::{EditError, ThumbnailService};
    use crate::config::PickerSettings;
    use crate::domain::picker::CropOptions;
    use crate::picker::GalleryPicker;
    use crate::test_utils::{numbered_photos, FakeEditor, FakeIndex, FakeThumbnails};
    use std::time::Duration;

    struct Harness {
        picker: GalleryPicker,
        index: Arc<FakeIndex>,
        editor: Arc<FakeEditor>,
    }

    fn harness(assets: Vec<MediaAsset>) -> Harness {
        harness_with_editor(assets, FakeEditor::with_dimensions(1200, 1600))
    }

    fn harness_with_editor(assets: Vec<MediaAsset>, editor: FakeEditor) -> Harness {
        let index = Arc::new(FakeIndex::with_assets(assets));
        let editor = Arc::new(editor);
        let picker = GalleryPicker::new(
            Arc::clone(&index) as Arc<dyn AssetIndex>,
            Arc::new(FakeThumbnails::default()) as Arc<dyn ThumbnailService>,
            Arc::clone(&editor) as Arc<dyn ImageEditor>,
            PickerSettings::default(),
        );
        Harness { picker, index, editor }
    }

    fn with_video(mut assets: Vec<MediaAsset>) -> Vec<MediaAsset> {
        assets.push(MediaAsset::video("v1", "clip.mp4", "ph://v1", Duration::from_secs(5)));
        assets
    }

    fn id(value: &str) -> AssetId {
        AssetId::new(value)
    }

    #[tokio::test]
    async fn multi_select_validation_delivers_in_selection_order() {
        let h = harness(numbered_photos(5, "jpg"));
        let (session, pending) = h.picker.pick(PickerConfig::multiple(Some(3))).unwrap();
        session.start().await.unwrap();

        session.toggle(&id("p3")).await.unwrap();
        session.toggle(&id("p1")).await.unwrap();
        assert_eq!(session.selection_label(), "2 / 3 selected");
        assert!(session.can_validate());

        assert!(session.validate().await.unwrap());
        assert_eq!(session.phase(), SessionPhase::Validated);

        let picked = pending.await.unwrap();
        let ids: Vec<_> = picked.iter().map(|p| p.asset.id.as_str()).collect();
        assert_eq!(ids, ["p3", "p1"]);
        assert!(picked.iter().all(|p| p.cropped_uri.is_none()));
        assert!(!h.picker.is_session_active());
    }

    #[tokio::test]
    async fn validate_with_empty_selection_does_nothing() {
        let h = harness(numbered_photos(2, "jpg"));
        let (session, _pending) = h.picker.pick(PickerConfig::single()).unwrap();
        assert!(!session.validate().await.unwrap());
        assert_eq!(session.phase(), SessionPhase::Browsing);
    }

    #[tokio::test]
    async fn close_resolves_none_and_rejects_further_use() {
        let h = harness(numbered_photos(2, "jpg"));
        let (session, pending) = h.picker.pick(PickerConfig::multiple(None)).unwrap();
        session.start().await.unwrap();
        session.toggle(&id("p0")).await.unwrap();

        session.close();
        assert_eq!(pending.await, None);
        assert_eq!(session.selection_count(), 0);
        assert_eq!(session.phase(), SessionPhase::Cancelled);
        assert_eq!(session.toggle(&id("p1")).await, Err(Error::SessionClosed));
        assert_eq!(session.load_next_page().await, Err(Error::SessionClosed));

        session.close();
        assert!(!h.picker.is_session_active());
    }

    #[tokio::test]
    async fn dropping_session_cancels_pick() {
        let h = harness(numbered_photos(1, "jpg"));
        let (session, pending) = h.picker.pick(PickerConfig::single()).unwrap();
        drop(session);
        assert_eq!(pending.await, None);
        assert!(!h.picker.is_session_active());
    }

    #[tokio::test]
    async fn only_one_session_at_a_time() {
        let h = harness(numbered_photos(1, "jpg"));
        let (session, _pending) = h.picker.pick(PickerConfig::single()).unwrap();
        assert!(matches!(h.picker.pick(PickerConfig::single()), Err(Error::SessionActive)));

        session.close();
        assert!(h.picker.pick(PickerConfig::single()).is_ok());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_opening() {
        let h = harness(Vec::new());
        let config = PickerConfig::multiple(None).with_crop(CropOptions::square());
        assert!(matches!(h.picker.pick(config), Err(Error::InvalidConfig(_))));
        assert!(!h.picker.is_session_active());
    }

    #[tokio::test]
    async fn media_filter_is_locked_with_crop() {
        let h = harness(numbered_photos(1, "jpg"));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, _pending) = h.picker.pick(config).unwrap();
        assert_eq!(
            session.set_media_filter(MediaTypeFilter::VideosOnly).await,
            Err(Error::FilterLocked)
        );
    }

    #[tokio::test]
    async fn media_filter_change_keeps_selection() {
        let h = harness(with_video(numbered_photos(2, "jpg")));
        let (session, _pending) = h.picker.pick(PickerConfig::multiple(None)).unwrap();
        session.start().await.unwrap();
        session.toggle(&id("p0")).await.unwrap();

        session.set_media_filter(MediaTypeFilter::VideosOnly).await.unwrap();
        let ids: Vec<_> = session.items().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, [id("v1")]);
        assert!(session.is_selected(&id("p0")));
    }

    #[tokio::test]
    async fn single_photo_selection_loads_crop_editor() {
        let h = harness(numbered_photos(3, "jpg"));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, pending) = h.picker.pick(config).unwrap();
        session.start().await.unwrap();

        assert!(session.crop_transform().is_none());
        session.toggle(&id("p1")).await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Cropping);

        session.on_pan_start();
        let moved = session.on_pan_update(0.0, -40.0).unwrap();
        session.on_pan_end();
        assert_eq!(moved.translate.y, -40.0);

        assert!(session.validate().await.unwrap());
        let picked = pending.await.unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].cropped_uri.as_deref(), Some("file:///cropped/1.jpg"));
        assert_eq!(picked[0].uri(), "file:///cropped/1.jpg");

        let (source, request) = h.editor.last_crop().unwrap();
        assert_eq!(source, "file:///local/p1");
        assert_eq!(request.output_size.0, request.output_size.1);
        assert!(request.region.origin_y > 0.0);
    }

    #[tokio::test]
    async fn deselecting_returns_to_browsing() {
        let h = harness(numbered_photos(2, "jpg"));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, _pending) = h.picker.pick(config).unwrap();
        session.start().await.unwrap();

        session.toggle(&id("p0")).await.unwrap();
        session.toggle(&id("p0")).await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Browsing);
        assert!(session.render_transform().is_none());
        assert!(!session.can_validate());
    }

    #[tokio::test]
    async fn selected_video_is_returned_uncropped() {
        let h = harness(with_video(Vec::new()));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, pending) = h.picker.pick(config).unwrap();
        session.start().await.unwrap();

        session.toggle(&id("v1")).await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Browsing);
        assert!(session.validate().await.unwrap());

        let picked = pending.await.unwrap();
        assert_eq!(picked[0].cropped_uri, None);
        assert_eq!(h.editor.crop_count(), 0);
    }

    #[tokio::test]
    async fn crop_failure_keeps_session_for_retry() {
        let h = harness(numbered_photos(1, "jpg"));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, _pending) = h.picker.pick(config).unwrap();
        session.start().await.unwrap();
        session.toggle(&id("p0")).await.unwrap();

        h.editor.fail_crops(EditError::Encode("disk full".into()));
        let err = session.validate().await.unwrap_err();
        assert!(matches!(err, Error::Edit(EditError::Encode(_))));
        assert_eq!(session.phase(), SessionPhase::Cropping);
        assert!(session.is_selected(&id("p0")));
        assert!(session.can_validate());
    }

    #[tokio::test]
    async fn selection_outside_loaded_pages_is_fetched_for_crop() {
        let h = harness(numbered_photos(3, "jpg"));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, _pending) = h.picker.pick(config).unwrap();

        session.toggle(&id("p2")).await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Cropping);
        assert!(h.index.info_calls() >= 1);
    }

    #[tokio::test]
    async fn undecodable_crop_image_is_returned_uncropped() {
        let h = harness_with_editor(numbered_photos(2, "jpg"), FakeEditor::with_dimensions(0, 0));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, pending) = h.picker.pick(config).unwrap();
        session.start().await.unwrap();

        session.toggle(&id("p0")).await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Browsing);
        assert!(session.render_transform().is_none());
        assert!(session.can_validate());

        assert!(session.validate().await.unwrap());
        let picked = pending.await.unwrap();
        assert_eq!(picked[0].asset.id, id("p0"));
        assert_eq!(picked[0].cropped_uri, None);
        assert_eq!(picked[0].mime_type, "image/jpeg");
        assert_eq!(h.editor.crop_count(), 0);
    }

    #[tokio::test]
    async fn cropped_png_is_reported_as_jpeg() {
        let h = harness(numbered_photos(1, "png"));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, pending) = h.picker.pick(config).unwrap();
        session.start().await.unwrap();

        session.toggle(&id("p0")).await.unwrap();
        assert!(session.validate().await.unwrap());

        let picked = pending.await.unwrap();
        assert_eq!(picked[0].asset.mime_type(), "image/png");
        assert_eq!(picked[0].mime_type, "image/jpeg");
        assert_eq!(picked[0].mime_type, h.editor.output_mime_type());
    }

    #[tokio::test]
    async fn uncropped_png_keeps_its_mime_type() {
        let h = harness(numbered_photos(1, "png"));
        let (session, pending) = h.picker.pick(PickerConfig::single()).unwrap();
        session.start().await.unwrap();

        session.toggle(&id("p0")).await.unwrap();
        assert!(session.validate().await.unwrap());
        assert_eq!(pending.await.unwrap()[0].mime_type, "image/png");
    }

    #[tokio::test]
    async fn validation_waits_for_crop_image() {
        let h = harness(numbered_photos(1, "jpg"));
        h.editor.set_dimension_delay(Duration::from_millis(30));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, _pending) = h.picker.pick(config).unwrap();
        session.start().await.unwrap();

        let p0 = id("p0");
        let (toggled, (ready, validated)) = tokio::join!(session.toggle(&p0), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            (session.can_validate(), session.validate().await)
        });
        toggled.unwrap();
        assert!(!ready);
        assert_eq!(validated, Err(Error::CropNotReady));
        assert_eq!(session.phase(), SessionPhase::Cropping);
        assert!(session.can_validate());
    }

    #[tokio::test]
    async fn close_during_crop_load_discards_the_image() {
        let h = harness(numbered_photos(1, "jpg"));
        h.editor.set_dimension_delay(Duration::from_millis(30));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, pending) = h.picker.pick(config).unwrap();
        session.start().await.unwrap();

        let p0 = id("p0");
        let (toggled, ()) = tokio::join!(session.toggle(&p0), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            session.close();
        });
        toggled.unwrap();
        assert_eq!(h.editor.dimension_calls(), 1);
        assert_eq!(session.phase(), SessionPhase::Cancelled);
        assert!(session.crop_transform().is_none());
        assert!(!session.can_validate());
        assert_eq!(pending.await, None);
        assert!(!h.picker.is_session_active());
    }

    #[tokio::test]
    async fn close_during_crop_encode_discards_the_result() {
        let h = harness(numbered_photos(1, "jpg"));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, pending) = h.picker.pick(config).unwrap();
        session.start().await.unwrap();
        session.toggle(&id("p0")).await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Cropping);

        h.editor.set_crop_delay(Duration::from_millis(30));
        let (validated, ()) = tokio::join!(session.validate(), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            session.close();
        });
        assert_eq!(validated, Err(Error::SessionClosed));
        assert_eq!(h.editor.crop_count(), 1);
        assert_eq!(session.phase(), SessionPhase::Cancelled);
        assert_eq!(pending.await, None);
        assert!(!h.picker.is_session_active());
    }

    #[tokio::test]
    async fn reselecting_during_crop_load_keeps_latest_photo() {
        let h = harness(numbered_photos(2, "jpg"));
        h.editor.set_dimension_delay(Duration::from_millis(30));
        let config = PickerConfig::single().with_crop(CropOptions::square());
        let (session, pending) = h.picker.pick(config).unwrap();
        session.start().await.unwrap();

        let p0 = id("p0");
        let (first, second) = tokio::join!(session.toggle(&p0), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            session.toggle(&id("p1")).await
        });
        assert_eq!(first.unwrap(), ToggleOutcome::Selected);
        assert_eq!(second.unwrap(), ToggleOutcome::Replaced { previous: id("p0") });
        assert_eq!(session.phase(), SessionPhase::Cropping);
        assert_eq!(session.selected_ids(), [id("p1")]);

        assert!(session.validate().await.unwrap());
        let picked = pending.await.unwrap();
        assert_eq!(picked[0].asset.id, id("p1"));
        let (source, _) = h.editor.last_crop().unwrap();
        assert_eq!(source, "file:///local/p1");
    }
}
