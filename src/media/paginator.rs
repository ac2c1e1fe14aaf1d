// SPDX-License-Identifier: MPL-2.0
//! Cursor-based incremental loading of the media library.
//!
//! # Lifecycle
//!
//! ```text
//! new ──start()──► permission granted ──► first page (reset)
//!                   └─ denied ──────────► Denied (terminal, no fetch)
//!
//! set_media_type / set_album:
//!   filter stored ─► generation bumped ─► items, cursor cleared ─► reset fetch
//! ```
//!
//! A filter change is a first-class transition: the reset is fully applied
//! before the next page is requested, and any page still in flight for the
//! previous filter is discarded when it lands.

use crate::application::port::{AssetIndex, IndexError, PageCursor, PageRequest};
use crate::domain::media::{AlbumId, AssetId, ExtensionFilter, LibraryFilter, MediaAsset, MediaTypeFilter};
use crate::error::Result;
use crate::media::cache::lock_unpoisoned;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Library access as last reported by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LibraryAccess {
    /// Permission not requested yet.
    #[default]
    Unknown,
    Granted,
    /// Browsing is unavailable until the user grants access in settings.
    Denied,
}

/// Why a load request did not fetch anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another page is in flight.
    InFlight,
    /// The index reported no further pages.
    Exhausted,
    /// Library access was denied.
    AccessDenied,
    /// `start()` has not run yet; the initial load will use the new filter.
    NotStarted,
    /// The requested filter is already active.
    Unchanged,
}

/// Outcome of a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLoad {
    /// A page was applied.
    Loaded { added: usize, has_more: bool },
    /// Nothing was requested.
    Skipped(SkipReason),
    /// The page arrived after a filter change and was dropped.
    Discarded,
}

/// Observable state of the paginator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaginatorSnapshot {
    pub items: Vec<MediaAsset>,
    pub is_loading: bool,
    pub has_more: bool,
    pub filter: LibraryFilter,
    pub access: LibraryAccess,
}

#[derive(Debug)]
struct State {
    items: Vec<MediaAsset>,
    seen: HashSet<AssetId>,
    cursor: Option<PageCursor>,
    has_more: bool,
    is_loading: bool,
    filter: LibraryFilter,
    access: LibraryAccess,
    generation: u64,
    started: bool,
}

impl State {
    fn new(filter: LibraryFilter) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: None,
            has_more: true,
            is_loading: false,
            filter,
            access: LibraryAccess::Unknown,
            generation: 0,
            started: false,
        }
    }

    fn reset_pagination(&mut self) {
        self.generation += 1;
        self.items.clear();
        self.seen.clear();
        self.cursor = None;
        self.has_more = true;
        self.is_loading = false;
    }
}

/// Clears the loading flag if a load future is dropped before completing.
struct LoadingGuard<'a> {
    state: &'a Mutex<State>,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock_unpoisoned(self.state);
        if state.generation == self.generation {
            state.is_loading = false;
        }
    }
}

/// Loads library pages for one filter at a time.
pub struct AssetPaginator {
    index: Arc<dyn AssetIndex>,
    page_size: u32,
    exclusions: ExtensionFilter,
    state: Mutex<State>,
}

impl AssetPaginator {
    #[must_use]
    pub fn new(
        index: Arc<dyn AssetIndex>,
        page_size: u32,
        media_type: MediaTypeFilter,
        exclusions: ExtensionFilter,
    ) -> Self {
        Self {
            index,
            page_size: page_size.max(1),
            exclusions,
            state: Mutex::new(State::new(LibraryFilter::new(media_type))),
        }
    }

    /// Requests library access, then loads the first page of the active filter.
    ///
    /// A refused permission is reported as [`SkipReason::AccessDenied`] and
    /// [`LibraryAccess::Denied`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the first page fetch fails.
    pub async fn start(&self) -> Result<PageLoad> {
        let access = lock_unpoisoned(&self.state).access;
        if access != LibraryAccess::Granted {
            let granted = self.index.request_permission().await;
            let mut state = lock_unpoisoned(&self.state);
            state.access = if granted {
                LibraryAccess::Granted
            } else {
                LibraryAccess::Denied
            };
            if !granted {
                tracing::warn!("media library access denied");
                return Ok(PageLoad::Skipped(SkipReason::AccessDenied));
            }
        }

        lock_unpoisoned(&self.state).started = true;
        self.load_next_page(true).await
    }

    /// Fetches the next page, or the first page of the active filter when
    /// `reset` is set.
    ///
    /// A reset replaces `items`; otherwise new, non-excluded, not yet listed
    /// assets are appended. `has_more` always mirrors the index response.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after logging it. Items, cursor and `has_more`
    /// are left untouched, so calling again retries.
    pub async fn load_next_page(&self, reset: bool) -> Result<PageLoad> {
        let (request, generation) = {
            let mut state = lock_unpoisoned(&self.state);
            if state.access == LibraryAccess::Denied {
                return Ok(PageLoad::Skipped(SkipReason::AccessDenied));
            }
            if state.is_loading {
                return Ok(PageLoad::Skipped(SkipReason::InFlight));
            }
            if !reset && !state.has_more {
                return Ok(PageLoad::Skipped(SkipReason::Exhausted));
            }
            state.is_loading = true;
            let request = PageRequest {
                after: if reset { None } else { state.cursor.clone() },
                page_size: self.page_size,
                media_type: state.filter.media_type,
                album: state.filter.album.clone(),
            };
            (request, state.generation)
        };

        let _guard = LoadingGuard {
            state: &self.state,
            generation,
        };
        let response = self.index.get_page(&request).await;

        let mut state = lock_unpoisoned(&self.state);
        if state.generation != generation {
            tracing::debug!(generation, current = state.generation, "discarding page for stale filter");
            return Ok(PageLoad::Discarded);
        }
        state.is_loading = false;

        let page = match response {
            Ok(page) => page,
            Err(err) => {
                tracing::error!(error = %err, reset, "failed to load media page");
                if err == IndexError::PermissionDenied {
                    state.access = LibraryAccess::Denied;
                }
                return Err(err.into());
            }
        };

        if reset {
            state.items.clear();
            state.seen.clear();
        }

        let mut added = 0;
        for asset in page.assets {
            if !self.exclusions.allows(&asset) {
                continue;
            }
            if state.seen.insert(asset.id.clone()) {
                state.items.push(asset);
                added += 1;
            }
        }
        state.cursor = page.end_cursor;
        state.has_more = page.has_more;

        tracing::debug!(added, total = state.items.len(), has_more = state.has_more, "media page loaded");
        Ok(PageLoad::Loaded {
            added,
            has_more: state.has_more,
        })
    }

    /// Switches the media kind filter and reloads from the start.
    ///
    /// # Errors
    ///
    /// Returns the fetch error of the reset page.
    pub async fn set_media_type(&self, media_type: MediaTypeFilter) -> Result<PageLoad> {
        let mut filter = self.filter();
        filter.media_type = media_type;
        self.set_filter(filter).await
    }

    /// Switches the album (`None` = recents) and reloads from the start.
    ///
    /// # Errors
    ///
    /// Returns the fetch error of the reset page.
    pub async fn set_album(&self, album: Option<AlbumId>) -> Result<PageLoad> {
        let mut filter = self.filter();
        filter.album = album;
        self.set_filter(filter).await
    }

    /// Applies a new filter: pagination is reset before the first page of
    /// the new filter is requested. Before [`start`](Self::start) the filter
    /// is only stored.
    ///
    /// # Errors
    ///
    /// Returns the fetch error of the reset page.
    pub async fn set_filter(&self, filter: LibraryFilter) -> Result<PageLoad> {
        {
            let mut state = lock_unpoisoned(&self.state);
            if state.filter == filter {
                return Ok(PageLoad::Skipped(SkipReason::Unchanged));
            }
            state.filter = filter;
            state.reset_pagination();
            if !state.started {
                return Ok(PageLoad::Skipped(SkipReason::NotStarted));
            }
        }
        self.load_next_page(true).await
    }

    /// Drops all loaded pages and discards any page in flight.
    pub fn invalidate(&self) {
        lock_unpoisoned(&self.state).reset_pagination();
    }

    // =========================================================================
    // Observable state
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> PaginatorSnapshot {
        let state = lock_unpoisoned(&self.state);
        PaginatorSnapshot {
            items: state.items.clone(),
            is_loading: state.is_loading,
            has_more: state.has_more,
            filter: state.filter.clone(),
            access: state.access,
        }
    }

    #[must_use]
    pub fn items(&self) -> Vec<MediaAsset> {
        lock_unpoisoned(&self.state).items.clone()
    }

    /// Returns a listed asset by id.
    #[must_use]
    pub fn find(&self, id: &AssetId) -> Option<MediaAsset> {
        let state = lock_unpoisoned(&self.state);
        state.items.iter().find(|asset| asset.id == *id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.state).items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        lock_unpoisoned(&self.state).is_loading
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        lock_unpoisoned(&self.state).has_more
    }

    #[must_use]
    pub fn access(&self) -> LibraryAccess {
        lock_unpoisoned(&self.state).access
    }

    #[must_use]
    pub fn filter(&self) -> LibraryFilter {
        lock_unpoisoned(&self.state).filter.clone()
    }
}

impl std::fmt::Debug for AssetPaginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock_unpoisoned(&self.state);
        f.debug_struct("AssetPaginator")
            .field("page_size", &self.page_size)
            .field("exclusions", &self.exclusions)
            .field("items", &state.items.len())
            .field("has_more", &state.has_more)
            .field("is_loading", &state.is_loading)
            .field("filter", &state.filter)
            .finish_non_exhaustive()
    }
}
