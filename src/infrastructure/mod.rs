// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! This module contains concrete implementations of the port traits defined in
//! `application::port`, backed by the local file system and the `image` crate.
//!
//! # Available Adapters
//!
//! - [`fs_library`]: Directory-backed media index (implements [`AssetIndex`])
//! - [`image_editor`]: Crop and JPEG encode (implements [`ImageEditor`])
//! - [`thumbnails`]: Placeholder frame extractor (implements [`ThumbnailService`])
//!
//! [`AssetIndex`]: crate::application::port::AssetIndex
//! [`ImageEditor`]: crate::application::port::ImageEditor
//! [`ThumbnailService`]: crate::application::port::ThumbnailService

pub mod fs_library;
pub mod image_editor;
pub mod thumbnails;

pub use fs_library::FsMediaLibrary;
pub use image_editor::ImageRsEditor;
pub use thumbnails::UnsupportedThumbnails;

use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file://";

/// Formats a local path as a `file://` URI.
#[must_use]
pub fn uri_from_path(path: &Path) -> String {
    format!("{FILE_SCHEME}{}", path.display())
}

/// Extracts the local path of a `file://` URI. Other strings are taken as
/// plain paths.
#[must_use]
pub fn path_from_uri(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix(FILE_SCHEME).unwrap_or(uri))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_uri_round_trips_absolute_path() {
        let path = Path::new("/tmp/photos/a.jpg");
        assert_eq!(uri_from_path(path), "file:///tmp/photos/a.jpg");
        assert_eq!(path_from_uri("file:///tmp/photos/a.jpg"), path);
    }

    #[test]
    fn plain_path_is_accepted() {
        assert_eq!(path_from_uri("/tmp/a.png"), Path::new("/tmp/a.png"));
    }
}
