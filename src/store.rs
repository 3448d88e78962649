// src/store.rs
//! Shared plumbing for the date-partitioned JSON stores.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Failure in the staging or catalog store.
///
/// A missing file is never an error (first run is a normal state). An
/// existing file that cannot be read or parsed always is; it is never
/// treated as an empty one.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("encoding {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed content in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and decode a whole JSON artifact. An absent file decodes to the
/// default value; any other read failure or a parse failure is an error.
pub(crate) fn read_json<T>(path: &Path) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    let raw = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace a whole JSON artifact, creating parent directories as needed.
///
/// Writes a sibling temp file and renames it over the target; an
/// interrupted write leaves either the old artifact or the new one.
pub(crate) fn write_json<T>(path: &Path, value: &T) -> Result<(), StorageError>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|source| StorageError::Write {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })
}
