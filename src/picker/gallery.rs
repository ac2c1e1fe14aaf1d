// SPDX-License-Identifier: MPL-2.0
//! Process-wide picker entry point.

use crate::application::port::{AssetIndex, ImageEditor, ThumbnailService};
use crate::config::PickerSettings;
use crate::domain::picker::{ConfigError, PickerConfig};
use crate::editor::CropTransformEngine;
use crate::error::{Error, Result};
use crate::media::{AssetPaginator, MediaUriResolver};
use crate::picker::session::{PendingPick, PickerSession, SessionServices};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Owns the collaborators and the URI caches shared by every session.
///
/// At most one session is active at a time.
pub struct GalleryPicker {
    index: Arc<dyn AssetIndex>,
    editor: Arc<dyn ImageEditor>,
    resolver: Arc<MediaUriResolver>,
    settings: PickerSettings,
    active: Arc<AtomicBool>,
}

impl GalleryPicker {
    #[must_use]
    pub fn new(
        index: Arc<dyn AssetIndex>,
        thumbnails: Arc<dyn ThumbnailService>,
        editor: Arc<dyn ImageEditor>,
        settings: PickerSettings,
    ) -> Self {
        let resolver = Arc::new(MediaUriResolver::new(Arc::clone(&index), thumbnails, &settings));
        Self {
            index,
            editor,
            resolver,
            settings,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Opens a picker session for `config`.
    ///
    /// The session starts browsing the "recent" album with an empty selection.
    /// The returned [`PendingPick`] resolves once, when the session is
    /// validated, closed or dropped.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `config` is rejected
    /// - [`Error::SessionActive`] while another session is pending
    pub fn pick(&self, config: PickerConfig) -> Result<(PickerSession, PendingPick)> {
        config.validate()?;
        let crop = match &config.crop {
            Some(options) => {
                let viewport = options.viewport(self.settings.viewport_width(), self.settings.viewport_height());
                if !viewport.is_valid() {
                    return Err(ConfigError::InvalidViewport {
                        width: viewport.width,
                        height: viewport.height,
                    }
                    .into());
                }
                Some(CropTransformEngine::with_settings(viewport, options.shape, &self.settings))
            }
            None => None,
        };

        if self
            .active
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            tracing::warn!("pick requested while another session is active");
            return Err(Error::SessionActive);
        }

        let paginator = AssetPaginator::new(
            Arc::clone(&self.index),
            self.settings.page_size(),
            config.media_type,
            config.excluded_extensions.clone(),
        );
        tracing::info!(
            multi_select = config.multi_select,
            max = ?config.max_selection,
            crop = config.crop_enabled(),
            "picker session opened"
        );

        let services = SessionServices {
            index: Arc::clone(&self.index),
            editor: Arc::clone(&self.editor),
            resolver: Arc::clone(&self.resolver),
            active: Arc::clone(&self.active),
        };
        Ok(PickerSession::open(config, services, paginator, crop))
    }

    /// Returns `true` while a session is pending.
    #[must_use]
    pub fn is_session_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn resolver(&self) -> &MediaUriResolver {
        &self.resolver
    }

    #[must_use]
    pub fn settings(&self) -> &PickerSettings {
        &self.settings
    }

    /// Frees the URI and thumbnail caches.
    pub fn clear_caches(&self) {
        self.resolver.clear();
    }
}

impl std::fmt::Debug for GalleryPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryPicker")
            .field("settings", &self.settings)
            .field("resolver", &self.resolver)
            .field("active", &self.is_session_active())
            .finish_non_exhaustive()
    }
}
