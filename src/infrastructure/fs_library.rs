// SPDX-License-Identifier: MPL-2.0
//! Directory-backed media index.
//!
//! Media files directly under the root and under its immediate
//! subdirectories form the library; each subdirectory is an album. Asset ids
//! are paths relative to the root, with `/` separators.

use crate::application::port::{
    AssetIndex, AssetInfo, AssetPage, IndexError, PageCursor, PageRequest,
};
use crate::domain::media::{mime_type_for, Album, AlbumId, AssetId, MediaAsset, MediaKind};
use crate::infrastructure::uri_from_path;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Media index over a local directory.
#[derive(Debug, Clone)]
pub struct FsMediaLibrary {
    root: PathBuf,
}

#[derive(Debug, Clone)]
struct Entry {
    asset: MediaAsset,
    album: Option<String>,
    modified: SystemTime,
}

impl FsMediaLibrary {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn blocking<T, F>(&self, job: F) -> Result<T, IndexError>
    where
        T: Send + 'static,
        F: FnOnce(PathBuf) -> Result<T, IndexError> + Send + 'static,
    {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || job(root))
            .await
            .map_err(|err| IndexError::Unavailable(err.to_string()))?
    }
}

#[async_trait]
impl AssetIndex for FsMediaLibrary {
    async fn request_permission(&self) -> bool {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || std::fs::read_dir(root).is_ok())
            .await
            .unwrap_or(false)
    }

    async fn get_page(&self, request: &PageRequest) -> Result<AssetPage, IndexError> {
        let request = request.clone();
        self.blocking(move |root| {
            let offset = match &request.after {
                Some(cursor) => cursor
                    .as_str()
                    .parse::<usize>()
                    .map_err(|_| IndexError::Unavailable(format!("invalid cursor: {}", cursor.as_str())))?,
                None => 0,
            };

            let album = request.album.as_ref().map(AlbumId::as_str);
            let matching: Vec<Entry> = scan_library(&root)?
                .into_iter()
                .filter(|entry| request.media_type.matches_kind(entry.asset.kind))
                .filter(|entry| album.is_none() || entry.album.as_deref() == album)
                .collect();

            let page_size = request.page_size.max(1) as usize;
            let end = (offset + page_size).min(matching.len());
            let assets: Vec<MediaAsset> = matching
                .get(offset..end)
                .unwrap_or_default()
                .iter()
                .map(|entry| entry.asset.clone())
                .collect();

            Ok(AssetPage {
                assets,
                end_cursor: Some(PageCursor::new(end.to_string())),
                has_more: end < matching.len(),
            })
        })
        .await
    }

    async fn get_asset_info(&self, id: &AssetId) -> Result<AssetInfo, IndexError> {
        let id = id.clone();
        self.blocking(move |root| {
            let path = resolve_id(&root, &id)?;
            let entry = read_entry(&root, &path)
                .ok_or_else(|| IndexError::NotFound(id.to_string()))?;
            let mut asset = entry.asset;
            if asset.kind == MediaKind::Photo {
                if let Ok((width, height)) = image_rs::image_dimensions(&path) {
                    asset = asset.with_dimensions(width, height);
                }
            }
            Ok(AssetInfo {
                local_uri: Some(uri_from_path(&path)),
                asset,
            })
        })
        .await
    }

    async fn get_albums(&self) -> Result<Vec<Album>, IndexError> {
        self.blocking(|root| {
            let mut counts: Vec<(String, u32)> = Vec::new();
            for entry in scan_library(&root)? {
                let Some(album) = entry.album else { continue };
                match counts.iter_mut().find(|(name, _)| *name == album) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((album, 1)),
                }
            }
            for dir in subdirectories(&root)? {
                if !counts.iter().any(|(name, _)| *name == dir) {
                    counts.push((dir, 0));
                }
            }
            counts.sort_by(|a, b| a.0.cmp(&b.0));
            Ok(counts
                .into_iter()
                .map(|(name, count)| Album::new(name.clone(), name, count))
                .collect())
        })
        .await
    }
}

/// Lists every media file of the library, newest first.
fn scan_library(root: &Path) -> Result<Vec<Entry>, IndexError> {
    let mut entries = Vec::new();
    collect_dir(root, root, &mut entries)?;
    for dir in subdirectories(root)? {
        collect_dir(root, &root.join(dir), &mut entries)?;
    }
    entries.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.asset.id.cmp(&b.asset.id))
    });
    Ok(entries)
}

fn collect_dir(root: &Path, dir: &Path, entries: &mut Vec<Entry>) -> Result<(), IndexError> {
    for item in std::fs::read_dir(dir).map_err(io_error)? {
        let path = item.map_err(io_error)?.path();
        if path.is_file() {
            if let Some(entry) = read_entry(root, &path) {
                entries.push(entry);
            }
        }
    }
    Ok(())
}

fn subdirectories(root: &Path) -> Result<Vec<String>, IndexError> {
    let mut dirs = Vec::new();
    for item in std::fs::read_dir(root).map_err(io_error)? {
        let path = item.map_err(io_error)?.path();
        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !name.starts_with('.') {
                    dirs.push(name.to_string());
                }
            }
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Builds the entry for a media file, `None` for anything else.
fn read_entry(root: &Path, path: &Path) -> Option<Entry> {
    let filename = path.file_name()?.to_str()?.to_string();
    let kind = match mime_type_for(&filename).split('/').next() {
        Some("image") => MediaKind::Photo,
        Some("video") => MediaKind::Video,
        _ => return None,
    };

    let relative = path.strip_prefix(root).ok()?;
    let id = relative
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/");
    let album = match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_str().map(str::to_string),
        _ => None,
    };

    let modified = path
        .metadata()
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let uri = uri_from_path(path);
    let mut asset = match kind {
        MediaKind::Photo => MediaAsset::photo(id, filename, uri),
        // Clip length needs a demuxer; reported as zero.
        MediaKind::Video => MediaAsset::video(id, filename, uri, std::time::Duration::ZERO),
    };
    asset = asset.with_modified_at(DateTime::<Utc>::from(modified));

    Some(Entry {
        asset,
        album,
        modified,
    })
}

/// Maps an asset id back to a path under `root`, rejecting escapes.
fn resolve_id(root: &Path, id: &AssetId) -> Result<PathBuf, IndexError> {
    let relative = Path::new(id.as_str());
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if id.as_str().is_empty() || escapes {
        return Err(IndexError::NotFound(id.to_string()));
    }
    let path = root.join(relative);
    if path.is_file() {
        Ok(path)
    } else {
        Err(IndexError::NotFound(id.to_string()))
    }
}

fn io_error(err: std::io::Error) -> IndexError {
    if err.kind() == std::io::ErrorKind::PermissionDenied {
        IndexError::PermissionDenied
    } else {
        IndexError::Unavailable(err.to_string())
    }
}
