// SPDX-License-Identifier: MPL-2.0
//! Picker orchestration.
//!
//! [`GalleryPicker`] is created once per process. Each call to
//! [`GalleryPicker::pick`] opens a [`PickerSession`] (browse, select,
//! optionally crop) and returns a [`PendingPick`] future that resolves with
//! the picked assets, or `None` when the session is cancelled.
//!
//! # Example
//!
//! ```ignore
//! let picker = GalleryPicker::new(index, thumbnails, editor, PickerSettings::default());
//! let (session, pending) = picker.pick(PickerConfig::single().with_crop(CropOptions::square()))?;
//!
//! session.start().await?;
//! let first = session.items()[0].id.clone();
//! session.toggle(&first).await?;
//! session.on_pinch_start();
//! session.on_pinch_update(1.5);
//! session.on_pinch_end();
//! session.validate().await?;
//!
//! let picked = pending.await; // Some(vec![..]) with a cropped URI
//! ```

mod gallery;
mod session;

pub use gallery::GalleryPicker;
pub use session::{PendingPick, PickResult, PickerSession, SessionPhase};
