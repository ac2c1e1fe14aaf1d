// SPDX-License-Identifier: MPL-2.0
use crate::application::port::{EditError, IndexError, ThumbnailError};
use crate::domain::picker::ConfigError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Io(String),
    Config(String),
    /// A picker configuration was rejected when the session was opened.
    InvalidConfig(ConfigError),
    /// `pick()` was called while another session is still pending.
    SessionActive,
    /// The session was already validated or cancelled.
    SessionClosed,
    /// The configuration does not allow changing the media filter.
    FilterLocked,
    /// Media library access was refused by the user.
    PermissionDenied,
    /// Validation needs a crop but the crop editor has no image loaded yet.
    CropNotReady,
    Index(IndexError),
    Thumbnail(ThumbnailError),
    Edit(EditError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::InvalidConfig(e) => write!(f, "Invalid picker configuration: {}", e),
            Error::SessionActive => write!(f, "A picker session is already open"),
            Error::SessionClosed => write!(f, "The picker session is closed"),
            Error::FilterLocked => write!(f, "The media filter is fixed by the configuration"),
            Error::PermissionDenied => write!(f, "Media library access denied"),
            Error::CropNotReady => write!(f, "The crop editor has no image loaded"),
            Error::Index(e) => write!(f, "Media library error: {}", e),
            Error::Thumbnail(e) => write!(f, "Thumbnail error: {}", e),
            Error::Edit(e) => write!(f, "Image edit error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::InvalidConfig(err)
    }
}

impl From<IndexError> for Error {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::PermissionDenied => Error::PermissionDenied,
            other => Error::Index(other),
        }
    }
}

impl From<ThumbnailError> for Error {
    fn from(err: ThumbnailError) -> Self {
        Error::Thumbnail(err)
    }
}

impl From<EditError> for Error {
    fn from(err: EditError) -> Self {
        Error::Edit(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
