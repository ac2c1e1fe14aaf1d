// SPDX-License-Identifier: MPL-2.0
//! Frame extraction adapter for builds without a video decoder.

use crate::application::port::{ThumbnailError, ThumbnailService};
use async_trait::async_trait;
use std::time::Duration;

/// Thumbnail service that never produces a frame.
///
/// Callers fall back to the raw video URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedThumbnails;

#[async_trait]
impl ThumbnailService for UnsupportedThumbnails {
    async fn get_frame(&self, uri: &str, at: Duration) -> Result<String, ThumbnailError> {
        tracing::trace!(uri, at_ms = at.as_millis(), "frame extraction unavailable");
        Err(ThumbnailError::Unsupported)
    }
}
