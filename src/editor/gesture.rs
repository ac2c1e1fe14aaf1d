// SPDX-License-Identifier: MPL-2.0
//! Pan and pinch gesture trackers.
//!
//! A tracker remembers the transform at gesture start; every update is
//! applied to that snapshot rather than accumulated frame by frame, so a
//! gesture that returns to its origin restores the starting transform.
//! Pan and pinch keep separate snapshots and may run at the same time.

use crate::domain::crop::{clamp_scale, constrain_position, Dimensions, Position};

/// Live transform of the crop editor, in display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropTransform {
    /// Offset of the image's top-left corner relative to the viewport.
    pub translate: Position,
    pub scale: f64,
    /// Smallest scale that still covers the viewport.
    pub min_scale: f64,
}

impl CropTransform {
    /// Transform with minimum zoom and the image's top-left corner aligned.
    #[must_use]
    pub fn initial(min_scale: f64) -> Self {
        Self {
            translate: Position::ORIGIN,
            scale: min_scale,
            min_scale,
        }
    }
}

/// Fixed geometry a gesture is constrained against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureBounds {
    pub display: Dimensions,
    pub viewport: Dimensions,
    pub max_scale: f64,
}

/// Tracks a pan gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanTracker {
    start: Option<Position>,
}

impl PanTracker {
    pub fn begin(&mut self, current: &CropTransform) {
        self.start = Some(current.translate);
    }

    /// Applies the total pan distance since `begin`, using the current scale.
    ///
    /// An update without `begin` starts the gesture at the current transform.
    /// Non-finite deltas are ignored.
    pub fn update(&mut self, current: &CropTransform, dx: f64, dy: f64, bounds: &GestureBounds) -> CropTransform {
        if !dx.is_finite() || !dy.is_finite() {
            return *current;
        }
        let start = *self.start.get_or_insert(current.translate);
        let translate = constrain_position(start.offset(dx, dy), current.scale, bounds.display, bounds.viewport);
        CropTransform {
            translate,
            ..*current
        }
    }

    pub fn end(&mut self) {
        self.start = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }
}

/// Tracks a pinch gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PinchTracker {
    start: Option<(f64, Position)>,
}

impl PinchTracker {
    pub fn begin(&mut self, current: &CropTransform) {
        self.start = Some((current.scale, current.translate));
    }

    /// Applies the total pinch factor since `begin`.
    ///
    /// The scale is clamped to `[min_scale, max_scale]`, then the starting
    /// offset is re-constrained for the new scale. Factors that are not
    /// finite and strictly positive are ignored.
    pub fn update(&mut self, current: &CropTransform, factor: f64, bounds: &GestureBounds) -> CropTransform {
        if !factor.is_finite() || factor <= 0.0 {
            return *current;
        }
        let (start_scale, start_translate) = *self.start.get_or_insert((current.scale, current.translate));
        let scale = clamp_scale(start_scale * factor, current.min_scale, bounds.max_scale);
        let translate = constrain_position(start_translate, scale, bounds.display, bounds.viewport);
        CropTransform {
            translate,
            scale,
            min_scale: current.min_scale,
        }
    }

    pub fn end(&mut self) {
        self.start = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }
}
