// SPDX-License-Identifier: MPL-2.0
//! Crop encoder backed by the `image` crate.
//!
//! Cropped files are written as JPEG into a dedicated output directory and
//! returned as `file://` URIs.

use crate::application::port::{CropRequest, EditError, ImageEditor};
use crate::infrastructure::{path_from_uri, uri_from_path};
use async_trait::async_trait;
use image_rs::imageops::FilterType;
use image_rs::GenericImageView;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Writes cropped images under `output_dir`.
#[derive(Debug)]
pub struct ImageRsEditor {
    output_dir: PathBuf,
    counter: AtomicU64,
}

impl ImageRsEditor {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            counter: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn next_output_path(&self) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.output_dir.join(format!("crop-{}-{n}.jpg", std::process::id()))
    }
}

#[async_trait]
impl ImageEditor for ImageRsEditor {
    async fn dimensions(&self, uri: &str) -> Result<(u32, u32), EditError> {
        let path = path_from_uri(uri);
        let (width, height) = tokio::task::spawn_blocking(move || image_rs::image_dimensions(&path))
            .await
            .map_err(|err| EditError::Io(err.to_string()))?
            .map_err(decode_error)?;
        if width == 0 || height == 0 {
            return Err(EditError::InvalidDimensions { width, height });
        }
        Ok((width, height))
    }

    async fn crop(&self, uri: &str, request: &CropRequest) -> Result<String, EditError> {
        let source = path_from_uri(uri);
        let output = self.next_output_path();
        let request = *request;
        tokio::task::spawn_blocking(move || crop_to_file(&source, &output, &request))
            .await
            .map_err(|err| EditError::Io(err.to_string()))?
    }
}

/// Cuts `request.region` out of `source`, resizes it to the exact output
/// size and saves it as JPEG.
fn crop_to_file(source: &Path, output: &Path, request: &CropRequest) -> Result<String, EditError> {
    let img = image_rs::open(source).map_err(decode_error)?;
    let (img_width, img_height) = img.dimensions();
    if img_width == 0 || img_height == 0 {
        return Err(EditError::InvalidDimensions {
            width: img_width,
            height: img_height,
        });
    }

    let (x, y, width, height) = request.region.pixel_bounds((img_width, img_height));
    let (out_width, out_height) = request.output_size;
    let mut cropped = img.crop_imm(x, y, width, height);
    if (width, height) != (out_width, out_height) {
        cropped = cropped.resize_exact(out_width.max(1), out_height.max(1), FilterType::Lanczos3);
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|err| EditError::Io(err.to_string()))?;
    }
    cropped
        .to_rgb8()
        .save_with_format(output, image_rs::ImageFormat::Jpeg)
        .map_err(|err| EditError::Encode(err.to_string()))?;

    tracing::debug!(
        source = %source.display(),
        output = %output.display(),
        x, y, width, height,
        "image cropped"
    );
    Ok(uri_from_path(output))
}

fn decode_error(err: image_rs::ImageError) -> EditError {
    match err {
        image_rs::ImageError::IoError(io) => EditError::Io(io.to_string()),
        other => EditError::Decode(other.to_string()),
    }
}
