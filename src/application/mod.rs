// SPDX-License-Identifier: MPL-2.0
//! Application layer - Collaborator interfaces.
//!
//! This module contains the ports of the Clean Architecture:
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports
//! - The picker services in [`crate::media`], [`crate::editor`] and
//!   [`crate::picker`] only talk to collaborators through these ports
//!
//! # Example
//!
//! ```ignore
//! use gallery_picker::application::port::AssetIndex;
//! use gallery_picker::infrastructure::FsMediaLibrary;
//! use std::sync::Arc;
//!
//! let index: Arc<dyn AssetIndex> = Arc::new(FsMediaLibrary::new("/photos"));
//! ```

pub mod port;
