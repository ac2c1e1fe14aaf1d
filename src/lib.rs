// SPDX-License-Identifier: MPL-2.0
//! `gallery_picker` is a headless device-media picker.
//!
//! It browses a media library through cursor pagination, applies kind, album
//! and extension filters, enforces single or multi-select rules and, for a
//! single photo, drives a pan/pinch crop editor whose result is encoded at
//! the source's natural resolution.
//!
//! Platform services are reached through the traits in
//! [`application::port`]; [`infrastructure`] provides file-system and
//! `image` crate implementations of them.
//!
//! ```no_run
//! use gallery_picker::config::PickerSettings;
//! use gallery_picker::domain::picker::{CropOptions, PickerConfig};
//! use gallery_picker::infrastructure::{FsMediaLibrary, ImageRsEditor, UnsupportedThumbnails};
//! use gallery_picker::picker::GalleryPicker;
//! use std::sync::Arc;
//!
//! # async fn run() -> gallery_picker::error::Result<()> {
//! let picker = GalleryPicker::new(
//!     Arc::new(FsMediaLibrary::new("/home/me/Pictures")),
//!     Arc::new(UnsupportedThumbnails),
//!     Arc::new(ImageRsEditor::new("/tmp/crops")),
//!     PickerSettings::default(),
//! );
//! let (session, pending) = picker.pick(PickerConfig::single().with_crop(CropOptions::square()))?;
//! session.start().await?;
//! # drop(session);
//! let _picked = pending.await;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/gallery_picker/0.1.0")]

pub mod application;
pub mod config;
pub mod domain;
pub mod editor;
pub mod error;
pub mod infrastructure;
pub mod media;
pub mod picker;

#[cfg(test)]
pub(crate) mod test_utils;
