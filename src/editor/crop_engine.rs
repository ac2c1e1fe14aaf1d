// SPDX-License-Identifier: MPL-2.0
//! Gesture-driven crop transform with a permanent coverage guarantee.
//!
//! # Phases
//!
//! ```text
//! Uninitialized ──initialize(uri, natural size)──► Ready
//!       ▲                                            │
//!       └───────────────────reset()──────────────────┘
//! ```
//!
//! In the ready phase, pan and pinch updates are pure arithmetic: no I/O and
//! no allocation. The image is manipulated in display space (downscaled when
//! larger than the display cap) and the final crop is reprojected onto the
//! natural image through the dimension ratio.

use crate::application::port::{CropRequest, EditError, ImageEditor};
use crate::config::PickerSettings;
use crate::domain::crop::{
    crop_region, fit_to_display, min_scale, render_offset, CropRegion, CropShape, Dimensions,
    DisplayFit, Position,
};
use crate::editor::gesture::{CropTransform, GestureBounds, PanTracker, PinchTracker};
use crate::error::{Error, Result};

/// Phase of the crop editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// No image loaded yet.
    Uninitialized,
    /// Image loaded, gestures accepted.
    Ready,
}

/// Values an input layer needs to draw the image behind the viewport.
///
/// `offset` assumes the renderer scales around the image's center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    pub offset: Position,
    pub scale: f64,
    /// Size of the image at scale 1, in display units.
    pub display: Dimensions,
}

#[derive(Debug, Clone)]
struct LoadedImage {
    source_uri: String,
    natural: Dimensions,
    fit: DisplayFit,
    bounds: GestureBounds,
    transform: CropTransform,
    pan: PanTracker,
    pinch: PinchTracker,
}

/// Crop editor state for one photo.
#[derive(Debug, Clone)]
pub struct CropTransformEngine {
    viewport: Dimensions,
    shape: CropShape,
    display_cap: f64,
    max_scale: f64,
    image: Option<LoadedImage>,
}

impl CropTransformEngine {
    /// Creates an uninitialized engine for a viewport of `viewport` display units.
    #[must_use]
    pub fn new(viewport: Dimensions, shape: CropShape, display_cap: f64, max_scale: f64) -> Self {
        Self {
            viewport,
            shape,
            display_cap,
            max_scale,
            image: None,
        }
    }

    /// Creates an engine using the display cap and max scale from `settings`.
    #[must_use]
    pub fn with_settings(viewport: Dimensions, shape: CropShape, settings: &PickerSettings) -> Self {
        Self::new(viewport, shape, settings.display_cap(), settings.max_scale())
    }

    /// Loads an image of `natural` size and resets the transform to minimum
    /// zoom, top-left aligned.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidDimensions`] for an empty or degenerate size.
    pub fn initialize(
        &mut self,
        source_uri: impl Into<String>,
        natural: (u32, u32),
    ) -> std::result::Result<CropTransform, EditError> {
        let (width, height) = natural;
        if width == 0 || height == 0 {
            return Err(EditError::InvalidDimensions { width, height });
        }

        let natural = Dimensions::from(natural);
        let fit = fit_to_display(natural, self.display_cap);
        let min = min_scale(fit.display, self.viewport);
        let transform = CropTransform::initial(min);

        self.image = Some(LoadedImage {
            source_uri: source_uri.into(),
            natural,
            fit,
            bounds: GestureBounds {
                display: fit.display,
                viewport: self.viewport,
                max_scale: self.max_scale,
            },
            transform,
            pan: PanTracker::default(),
            pinch: PinchTracker::default(),
        });
        Ok(transform)
    }

    /// Reads the natural size of `source_uri` with `editor`, then initializes.
    ///
    /// # Errors
    ///
    /// Returns an error if the image size cannot be read or it has no pixels.
    pub async fn load(&mut self, editor: &dyn ImageEditor, source_uri: &str) -> Result<CropTransform> {
        let natural = editor.dimensions(source_uri).await?;
        Ok(self.initialize(source_uri, natural)?)
    }

    /// Drops the loaded image.
    pub fn reset(&mut self) {
        self.image = None;
    }

    #[must_use]
    pub fn phase(&self) -> EnginePhase {
        if self.image.is_some() {
            EnginePhase::Ready
        } else {
            EnginePhase::Uninitialized
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.image.is_some()
    }

    #[must_use]
    pub fn viewport(&self) -> Dimensions {
        self.viewport
    }

    #[must_use]
    pub fn shape(&self) -> CropShape {
        self.shape
    }

    #[must_use]
    pub fn source_uri(&self) -> Option<&str> {
        self.image.as_ref().map(|image| image.source_uri.as_str())
    }

    /// Current transform, `None` before initialization.
    #[must_use]
    pub fn transform(&self) -> Option<CropTransform> {
        self.image.as_ref().map(|image| image.transform)
    }

    /// `natural / display` ratio of the loaded image.
    #[must_use]
    pub fn dimension_ratio(&self) -> Option<f64> {
        self.image.as_ref().map(|image| image.fit.dimension_ratio)
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    pub fn on_pan_start(&mut self) {
        if let Some(image) = &mut self.image {
            image.pan.begin(&image.transform);
        }
    }

    /// Applies the total pan translation since the gesture started.
    ///
    /// Returns the committed transform, or `None` when not ready.
    pub fn on_pan_update(&mut self, dx: f64, dy: f64) -> Option<CropTransform> {
        let image = self.image.as_mut()?;
        image.transform = image.pan.update(&image.transform, dx, dy, &image.bounds);
        Some(image.transform)
    }

    pub fn on_pan_end(&mut self) {
        if let Some(image) = &mut self.image {
            image.pan.end();
        }
    }

    pub fn on_pinch_start(&mut self) {
        if let Some(image) = &mut self.image {
            image.pinch.begin(&image.transform);
        }
    }

    /// Applies the total pinch factor since the gesture started.
    ///
    /// Returns the committed transform, or `None` when not ready.
    pub fn on_pinch_update(&mut self, factor: f64) -> Option<CropTransform> {
        let image = self.image.as_mut()?;
        image.transform = image.pinch.update(&image.transform, factor, &image.bounds);
        Some(image.transform)
    }

    pub fn on_pinch_end(&mut self) {
        if let Some(image) = &mut self.image {
            image.pinch.end();
        }
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Offset and scale for a renderer that scales around the image center.
    #[must_use]
    pub fn render_transform(&self) -> Option<RenderTransform> {
        let image = self.image.as_ref()?;
        let scale = image.transform.scale;
        Some(RenderTransform {
            offset: render_offset(image.transform.translate, image.fit.display, scale),
            scale,
            display: image.fit.display,
        })
    }

    /// Visible viewport window in the natural image's pixel space.
    #[must_use]
    pub fn crop_region(&self) -> Option<CropRegion> {
        let image = self.image.as_ref()?;
        let ratio = image.fit.dimension_ratio;
        Some(crop_region(
            image.transform.translate.scaled(ratio),
            image.transform.scale,
            image.natural,
            self.viewport.scaled(ratio),
        ))
    }

    /// Source URI and crop job for the encoder.
    #[must_use]
    pub fn crop_job(&self) -> Option<(String, CropRequest)> {
        let region = self.crop_region()?;
        let uri = self.source_uri()?.to_string();
        Some((uri, CropRequest::new(region, self.shape)))
    }

    /// Crops the original image to the current viewport window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CropNotReady`] before initialization, or the encoder
    /// error.
    pub async fn get_cropped_image(&self, editor: &dyn ImageEditor) -> Result<String> {
        let (uri, request) = self.crop_job().ok_or(Error::CropNotReady)?;
        let output = editor.crop(&uri, &request).await.map_err(|err| {
            tracing::error!(%uri, error = %err, "crop encode failed");
            Error::from(err)
        })?;
        Ok(output)
    }
}
