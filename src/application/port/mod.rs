// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//! These traits use only domain types, ensuring the picker logic remains
//! independent of the platform media store and image codecs.
//!
//! # Available Ports
//!
//! - [`asset_index`]: Paged, read-only access to the media library
//! - [`thumbnail`]: Video frame extraction
//! - [`image_editor`]: Image probing and crop/encode
//!
//! # Design Notes
//!
//! - All traits use domain types only
//! - Traits are `Send + Sync` and shared as `Arc<dyn Trait>`
//! - Methods are `async` (via `async_trait`) and return domain error types

pub mod asset_index;
pub mod image_editor;
pub mod thumbnail;

// Re-export main types for convenience
pub use asset_index::{AssetIndex, AssetInfo, AssetPage, IndexError, PageCursor, PageRequest};
pub use image_editor::{CropRequest, EditError, ImageEditor};
pub use thumbnail::{ThumbnailError, ThumbnailService};
