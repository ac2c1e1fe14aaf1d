// SPDX-License-Identifier: MPL-2.0
//! Library browsing services.
//!
//! These services sit on top of the [`crate::application::port`] traits and
//! hold the state of a picker session's browsing phase:
//!
//! - [`paginator`]: cursor pagination with kind, album and extension filters
//! - [`selection`]: single/multi-select rules and selected asset resolution
//! - [`resolver`]: displayable URIs with memoized local URIs and video frames
//! - [`albums`]: album browser entries with covers
//! - [`cache`]: the LRU single-flight cache behind the resolver

pub mod albums;
pub mod cache;
pub mod paginator;
pub mod resolver;
pub mod selection;

// Re-export commonly used types
pub use albums::{list_albums, AlbumCover, RECENTS_TITLE};
pub use cache::{AsyncCache, CacheStats};
pub(crate) use cache::lock_unpoisoned;
pub use paginator::{AssetPaginator, LibraryAccess, PageLoad, PaginatorSnapshot, SkipReason};
pub use resolver::MediaUriResolver;
pub use selection::{resolve_assets, SelectionManager, ToggleOutcome};
