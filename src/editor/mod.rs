// SPDX-License-Identifier: MPL-2.0
//! Crop editor.
//!
//! [`CropTransformEngine`] holds the live pan/zoom transform of one photo
//! behind a fixed-size viewport and turns it into a pixel-accurate crop of
//! the original image. Gesture snapshots live in [`gesture`].

pub mod crop_engine;
pub mod gesture;

pub use crop_engine::{CropTransformEngine, EnginePhase, RenderTransform};
pub use gesture::{CropTransform, GestureBounds, PanTracker, PinchTracker};
