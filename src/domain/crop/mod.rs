// SPDX-License-Identifier: MPL-2.0
//! Crop geometry types.
//!
//! See [`geometry`] for the coverage invariant and the coordinate spaces.

pub mod geometry;

pub use geometry::{
    clamp_scale, constrain_position, crop_region, fit_to_display, min_scale, render_offset,
    CropRegion, CropShape, Dimensions, DisplayFit, Position,
};
