// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk cache of parsed state.
//!
//! One entry per objects file, named by the SHA-256 of its path. An entry is
//! only valid while the recorded mtimes of both source files still match.
//! Entries are zstd-compressed JSON; writers hold an exclusive lock on a
//! sibling `.lock` file and publish with a rename.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::model::RuntimeState;

/// Current cache entry schema version
pub const CACHE_VERSION: u32 = 1;

const COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File modification time, split for exact comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Stamp {
    secs: u64,
    nanos: u32,
}

impl Stamp {
    fn of(path: &Path) -> io::Result<Self> {
        let since_epoch = fs::metadata(path)?.modified()?.duration_since(UNIX_EPOCH).unwrap_or_default();
        Ok(Self { secs: since_epoch.as_secs(), nanos: since_epoch.subsec_nanos() })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<S> {
    #[serde(rename = "v")]
    version: u32,
    objects_mtime: Stamp,
    status_mtime: Stamp,
    state: S,
}

#[derive(Debug, Clone)]
pub struct StateCache {
    dir: PathBuf,
}

impl StateCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex SHA-256 of the objects file path.
    pub fn key(objects_file: &Path) -> String {
        format!("{:x}", Sha256::digest(objects_file.as_os_str().as_encoded_bytes()))
    }

    pub fn entry_path(&self, objects_file: &Path) -> PathBuf {
        self.dir.join(format!("{}.state", Self::key(objects_file)))
    }

    fn lock_path(&self, objects_file: &Path) -> PathBuf {
        self.dir.join(format!("{}.lock", Self::key(objects_file)))
    }

    /// The cached state for these files, or `None` on a miss.
    ///
    /// Stale, unreadable and corrupt entries are all misses.
    pub fn load(&self, objects_file: &Path, status_file: &Path) -> Option<RuntimeState> {
        let path = self.entry_path(objects_file);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "state cache miss");
            return None;
        }
        let (objects_mtime, status_mtime) = match (Stamp::of(objects_file), Stamp::of(status_file)) {
            (Ok(objects), Ok(status)) => (objects, status),
            _ => return None,
        };

        let entry = match self.read_entry(objects_file, &path) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt state cache entry");
                return None;
            }
        };
        if entry.version != CACHE_VERSION {
            tracing::debug!(path = %path.display(), version = entry.version, "state cache version mismatch");
            return None;
        }
        if entry.objects_mtime != objects_mtime || entry.status_mtime != status_mtime {
            tracing::debug!(path = %path.display(), "state cache entry is stale");
            return None;
        }
        tracing::debug!(path = %path.display(), objects = entry.state.len(), "state cache hit");
        Some(entry.state)
    }

    fn read_entry(&self, objects_file: &Path, path: &Path) -> Result<CacheEntry<RuntimeState>, CacheError> {
        let lock = self.open_lock(objects_file)?;
        lock.lock_shared()?;
        let bytes = zstd::stream::decode_all(BufReader::new(File::open(path)?));
        FileExt::unlock(&lock)?;
        Ok(serde_json::from_slice(&bytes?)?)
    }

    /// Write `state` for these files, stamped with their current mtimes.
    pub fn store(&self, objects_file: &Path, status_file: &Path, state: &RuntimeState) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            version: CACHE_VERSION,
            objects_mtime: Stamp::of(objects_file)?,
            status_mtime: Stamp::of(status_file)?,
            state,
        };

        let path = self.entry_path(objects_file);
        let tmp = path.with_extension("state.tmp");
        let lock = self.open_lock(objects_file)?;
        lock.lock_exclusive()?;

        let written = write_compressed(&tmp, &entry).and_then(|()| fs::rename(&tmp, &path).map_err(CacheError::from));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        FileExt::unlock(&lock)?;
        written?;

        tracing::debug!(path = %path.display(), objects = state.len(), "stored state cache entry");
        Ok(())
    }

    /// Remove the entry for `objects_file`, if any.
    pub fn clear(&self, objects_file: &Path) -> Result<(), CacheError> {
        match fs::remove_file(self.entry_path(objects_file)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn open_lock(&self, objects_file: &Path) -> io::Result<File> {
        OpenOptions::new().create(true).truncate(false).write(true).open(self.lock_path(objects_file))
    }
}

fn write_compressed(path: &Path, entry: &CacheEntry<&RuntimeState>) -> Result<(), CacheError> {
    let file = File::create(path)?;
    let mut encoder = zstd::stream::Encoder::new(BufWriter::new(file), COMPRESSION_LEVEL)?;
    serde_json::to_writer(&mut encoder, entry)?;
    let writer = encoder.finish()?;
    writer.into_inner().map_err(io::IntoInnerError::into_error)?.sync_all()?;
    Ok(())
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
