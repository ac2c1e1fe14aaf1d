// SPDX-License-Identifier: MPL-2.0
//! Video frame extraction port definition.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Errors that can occur while extracting a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ThumbnailError {
    /// No frame extraction backend is available.
    Unsupported,

    /// The backend failed on this input.
    Failed(String),
}

impl fmt::Display for ThumbnailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThumbnailError::Unsupported => write!(f, "Thumbnail generation not supported"),
            ThumbnailError::Failed(msg) => write!(f, "Thumbnail generation failed: {msg}"),
        }
    }
}

impl std::error::Error for ThumbnailError {}

/// Extracts a still frame from a video.
#[async_trait]
pub trait ThumbnailService: Send + Sync {
    /// Decodes the frame at `at` and returns the URI of the written image.
    ///
    /// # Errors
    ///
    /// Returns an error if the video cannot be decoded.
    async fn get_frame(&self, uri: &str, at: Duration) -> Result<String, ThumbnailError>;
}
