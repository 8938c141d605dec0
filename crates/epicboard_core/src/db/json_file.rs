//! JSON file storage with atomic replacement.
//!
//! # Invariants
//! - A missing file loads as an empty store (first run).
//! - Saves go to a uniquely named temp file in the target directory, are
//!   synced, then renamed over the target; readers never see a partial file.

use crate::db::snapshot::{decode, encode};
use crate::db::{DbError, DbResult, Storage};
use crate::store::Store;
use log::{error, info, warn};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Storage backed by one JSON document on the local file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target document path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> DbResult<Store> {
        let started_at = Instant::now();
        info!("event=store_load module=db status=start mode=file");

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(
                    "event=store_load module=db status=ok mode=file state=empty duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Ok(Store::new());
            }
            Err(source) => {
                error!(
                    "event=store_load module=db status=error mode=file duration_ms={} error_code=read_failed error={}",
                    started_at.elapsed().as_millis(),
                    source
                );
                return Err(DbError::Io {
                    action: "read",
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match decode(&bytes) {
            Ok(store) => {
                info!(
                    "event=store_load module=db status=ok mode=file epics={} stories={} duration_ms={}",
                    store.epic_count(),
                    store.story_count(),
                    started_at.elapsed().as_millis()
                );
                Ok(store)
            }
            Err(err) => {
                error!(
                    "event=store_load module=db status=error mode=file duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.kind(),
                    err
                );
                Err(err)
            }
        }
    }

    fn save(&self, store: &Store) -> DbResult<()> {
        let started_at = Instant::now();
        let bytes = encode(store)?;

        match write_atomic(&self.path, &bytes) {
            Ok(()) => {
                info!(
                    "event=store_save module=db status=ok mode=file bytes={} duration_ms={}",
                    bytes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=db status=error mode=file duration_ms={} error_code=write_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> DbResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|source| DbError::Io {
        action: "create directory",
        path: parent.clone(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    let temp_path = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    if let Err(source) = write_synced(&temp_path, bytes) {
        let _ = fs::remove_file(&temp_path);
        return Err(DbError::Io {
            action: "write temporary file",
            path: temp_path,
            source,
        });
    }

    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(DbError::Io {
            action: "replace",
            path: path.to_path_buf(),
            source,
        });
    }

    if let Err(err) = sync_dir(&parent) {
        warn!(
            "event=store_save module=db status=degraded error_code=dir_sync_failed error={}",
            err
        );
    }
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
