use std::{io, path::StripPrefixError};

use serde::{Deserialize, Serialize};
use sqlx::{migrate::MigrateError, Error as SqlxError};
use tempfile::PersistError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum NotelinksError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Link store error: {0}")]
    Store(String),
}

impl NotelinksError {
    /// Errors that only affect the note being processed. The scan logs these and moves on;
    /// everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NotelinksError::Io(_)
                | NotelinksError::NotFound(_)
                | NotelinksError::PermissionDenied
                | NotelinksError::Serialization(_)
        )
    }
}

impl From<StripPrefixError> for NotelinksError {
    fn from(src: StripPrefixError) -> NotelinksError {
        NotelinksError::NotFound(format!("Strip prefix failed for path. Error: {src}"))
    }
}

impl From<toml::de::Error> for NotelinksError {
    fn from(src: toml::de::Error) -> NotelinksError {
        NotelinksError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<serde_yaml::Error> for NotelinksError {
    fn from(src: serde_yaml::Error) -> NotelinksError {
        NotelinksError::Serialization(format!("Yaml deserialization error: {src}"))
    }
}

impl From<io::Error> for NotelinksError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => NotelinksError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => NotelinksError::PermissionDenied,
            io::ErrorKind::InvalidData => NotelinksError::Serialization(format!("{x}")),
            _ => NotelinksError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<walkdir::Error> for NotelinksError {
    fn from(x: walkdir::Error) -> Self {
        let path = x.path().map(|p| p.to_path_buf());
        match x.into_io_error() {
            Some(io_error) => io_error.into(),
            None => NotelinksError::Io(format!("filesystem loop detected at {path:?}")),
        }
    }
}

impl From<PersistError> for NotelinksError {
    fn from(x: PersistError) -> Self {
        NotelinksError::Io(format!(
            "could not replace {:?} with rewritten content: {}",
            x.file.path(),
            x.error
        ))
    }
}

impl From<SqlxError> for NotelinksError {
    fn from(db_error: SqlxError) -> Self {
        NotelinksError::Store(format!("database error: {db_error:?}"))
    }
}

impl From<MigrateError> for NotelinksError {
    fn from(migrate_error: MigrateError) -> Self {
        NotelinksError::Store(format!("migration error: {migrate_error}"))
    }
}
