// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core picker rules with no I/O.
//!
//! This module contains pure domain types, value objects, and business rules.
//! Nothing here talks to the media index, the file system or an encoder, so
//! every rule can be tested in isolation.
//!
//! # Modules
//!
//! - [`media`]: Library types ([`MediaAsset`](media::MediaAsset), [`Album`](media::Album),
//!   [`MediaTypeFilter`](media::MediaTypeFilter), [`ExtensionFilter`](media::ExtensionFilter))
//! - [`crop`]: Crop geometry ([`Dimensions`](crop::Dimensions), [`CropRegion`](crop::CropRegion),
//!   coverage constraint and crop-region calculators)
//! - [`picker`]: Session configuration ([`PickerConfig`](picker::PickerConfig),
//!   [`ConfigError`](picker::ConfigError))

pub mod crop;
pub mod media;
pub mod picker;
