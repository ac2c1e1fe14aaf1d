// SPDX-License-Identifier: MPL-2.0
//! Closed-form crop geometry.
//!
//! All functions here are pure and allocation-free so they can run on every
//! gesture frame. Two coordinate spaces are involved:
//!
//! - **display space**: the possibly downscaled copy the user manipulates,
//!   with the origin at the image's top-left corner at scale 1
//! - **natural space**: the original asset's pixel grid
//!
//! The coverage invariant is: for a viewport of `vw × vh` and an image of
//! `dw × dh` drawn at `scale` and offset `(x, y)`,
//! `vw - dw * scale <= x <= 0` and `vh - dh * scale <= y <= 0`.

/// Width and height in a given coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Longest side.
    #[must_use]
    pub fn max_side(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Returns `true` if both sides are finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Both sides multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(f64::from(width), f64::from(height))
    }
}

/// A 2D offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Shape of the crop viewport.
///
/// The shape only affects how the viewport is drawn; the output is always
/// the bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropShape {
    #[default]
    Rectangle,
    Circle,
}

/// A crop rectangle in natural (original pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CropRegion {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRegion {
    /// Output pixel size for the encoder: the region size rounded, at least 1×1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn output_size(&self) -> (u32, u32) {
        let round = |v: f64| v.round().max(1.0) as u32;
        (round(self.width), round(self.height))
    }

    /// Integer pixel bounds `(x, y, width, height)` clipped to `bounds`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_bounds(&self, bounds: (u32, u32)) -> (u32, u32, u32, u32) {
        let (max_w, max_h) = bounds;
        let x = (self.origin_x.round().max(0.0) as u32).min(max_w.saturating_sub(1));
        let y = (self.origin_y.round().max(0.0) as u32).min(max_h.saturating_sub(1));
        let w = (self.width.round().max(1.0) as u32).min(max_w - x);
        let h = (self.height.round().max(1.0) as u32).min(max_h - y);
        (x, y, w, h)
    }
}

/// Result of fitting natural dimensions under the display cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayFit {
    /// Dimensions used for on-screen manipulation.
    pub display: Dimensions,
    /// `natural / display`; 1 when no downscale happened.
    pub dimension_ratio: f64,
}

/// Downscales `natural` so its longest side does not exceed `cap`.
#[must_use]
pub fn fit_to_display(natural: Dimensions, cap: f64) -> DisplayFit {
    let max_side = natural.max_side();
    if cap > 0.0 && max_side > cap {
        let display_ratio = cap / max_side;
        DisplayFit {
            display: natural.scaled(display_ratio),
            dimension_ratio: 1.0 / display_ratio,
        }
    } else {
        DisplayFit {
            display: natural,
            dimension_ratio: 1.0,
        }
    }
}

/// Smallest scale at which the image covers the viewport on both axes.
#[must_use]
pub fn min_scale(display: Dimensions, viewport: Dimensions) -> f64 {
    (viewport.width / display.width).max(viewport.height / display.height)
}

/// Clamps `scale` into `[min, max]`. Non-finite input yields `min`.
///
/// When `max < min` the lower bound wins, so coverage is never lost.
#[must_use]
pub fn clamp_scale(scale: f64, min: f64, max: f64) -> f64 {
    if !scale.is_finite() {
        return min;
    }
    scale.min(max).max(min)
}

/// Clamps a proposed offset so the scaled image keeps covering the viewport.
#[must_use]
pub fn constrain_position(
    proposed: Position,
    scale: f64,
    display: Dimensions,
    viewport: Dimensions,
) -> Position {
    Position::new(
        constrain_axis(proposed.x, display.width * scale, viewport.width),
        constrain_axis(proposed.y, display.height * scale, viewport.height),
    )
}

fn constrain_axis(value: f64, scaled: f64, viewport: f64) -> f64 {
    let lower = (viewport - scaled).min(0.0);
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(lower, 0.0)
}

/// Reprojects the viewport window onto the natural image.
///
/// `natural_position` is the display translate multiplied by the dimension
/// ratio, and `crop_natural` is the viewport size in natural units.
/// The origin is additionally clamped to the natural size and the width and
/// height to zero or more, so out-of-range transforms never yield a negative
/// region.
#[must_use]
pub fn crop_region(
    natural_position: Position,
    scale: f64,
    natural: Dimensions,
    crop_natural: Dimensions,
) -> CropRegion {
    let origin_x = (-natural_position.x / scale).max(0.0).min(natural.width);
    let origin_y = (-natural_position.y / scale).max(0.0).min(natural.height);
    let width = (crop_natural.width / scale).min(natural.width - origin_x).max(0.0);
    let height = (crop_natural.height / scale).min(natural.height - origin_y).max(0.0);

    CropRegion {
        origin_x,
        origin_y,
        width,
        height,
    }
}

/// On-screen offset that makes a center-origin scale look top-left anchored.
#[must_use]
pub fn render_offset(translate: Position, display: Dimensions, scale: f64) -> Position {
    Position::new(
        translate.x + display.width * (scale - 1.0) / 2.0,
        translate.y + display.height * (scale - 1.0) / 2.0,
    )
}
