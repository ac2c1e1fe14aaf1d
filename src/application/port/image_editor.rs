// SPDX-License-Identifier: MPL-2.0
//! Image probing and crop/encode port definition.
//!
//! The picker never decodes pixels itself: it asks this port for the natural
//! size of an image and hands it the final rectangle to cut out.

use crate::domain::crop::{CropRegion, CropShape};
use async_trait::async_trait;
use std::fmt;

// =============================================================================
// EditError
// =============================================================================

/// Errors that can occur while probing or cropping an image.
#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    /// The image reports zero or unusable dimensions.
    InvalidDimensions {
        width: u32,
        height: u32,
    },

    /// The source could not be decoded.
    Decode(String),

    /// The output could not be encoded.
    Encode(String),

    /// The source or destination could not be accessed.
    Io(String),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::InvalidDimensions { width, height } => {
                write!(f, "Invalid image dimensions: {width}x{height}")
            }
            EditError::Decode(msg) => write!(f, "Failed to decode image: {msg}"),
            EditError::Encode(msg) => write!(f, "Failed to encode image: {msg}"),
            EditError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for EditError {}

// =============================================================================
// CropRequest
// =============================================================================

/// Crop job handed to the encoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRequest {
    /// Rectangle in the source's natural pixel space.
    pub region: CropRegion,
    /// Exact output size in pixels.
    pub output_size: (u32, u32),
    /// Viewport shape the user cropped with.
    pub shape: CropShape,
}

impl CropRequest {
    /// Builds a request whose output size is the rounded region size.
    #[must_use]
    pub fn new(region: CropRegion, shape: CropShape) -> Self {
        Self {
            region,
            output_size: region.output_size(),
            shape,
        }
    }
}

// =============================================================================
// ImageEditor Trait
// =============================================================================

/// Measures and crops images referenced by URI.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Returns the natural `(width, height)` of the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be read.
    async fn dimensions(&self, uri: &str) -> Result<(u32, u32), EditError>;

    /// Cuts `request.region` out of the image, resizes it to
    /// `request.output_size` and returns the URI of the encoded result.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding, cropping or encoding fails.
    async fn crop(&self, uri: &str, request: &CropRequest) -> Result<String, EditError>;

    /// MIME type of the images written by [`crop`](Self::crop).
    fn output_mime_type(&self) -> &'static str {
        "image/jpeg"
    }
}
