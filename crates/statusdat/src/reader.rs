// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reader over an objects file and a status file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mon_core::StatusdatConfig;
use parking_lot::Mutex;

use crate::cache::StateCache;
use crate::error::{ParsingError, ReaderError};
use crate::model::{MonitoredObject, RuntimeState};
use crate::parser::Parser;
use crate::query::{Query, Target};
use crate::summary::{GroupSummary, StatusSummary};

/// A reader shared between callers.
pub type SharedReader = Arc<Mutex<Reader>>;

/// Owns the parsed state for one objects/status file pair.
///
/// Construction restores the state from the cache when both files are
/// unchanged, and otherwise parses them and refreshes the cache entry.
#[derive(Debug)]
pub struct Reader {
    config: StatusdatConfig,
    cache: Option<StateCache>,
    parser: Parser,
}

impl Reader {
    pub fn new(config: StatusdatConfig) -> Result<Self, ReaderError> {
        check_readable("objects_file", &config.objects_file)?;
        check_readable("status_file", &config.status_file)?;

        let cache = config.cache_enabled().then(|| StateCache::new(config.cache_dir()));
        let mut reader = Self { config, cache, parser: Parser::new() };
        reader.load()?;
        Ok(reader)
    }

    pub fn shared(self) -> SharedReader {
        Arc::new(Mutex::new(self))
    }

    fn load(&mut self) -> Result<(), ReaderError> {
        if let Some(state) =
            self.cache.as_ref().and_then(|cache| cache.load(&self.config.objects_file, &self.config.status_file))
        {
            self.parser = Parser::with_state(state);
            return Ok(());
        }

        let objects = &self.config.objects_file;
        parse_file(objects, |reader| self.parser.parse_objects_file(reader))?;
        let status = &self.config.status_file;
        parse_file(status, |reader| self.parser.parse_runtime_state(reader))?;
        self.parser.state_mut().link_services();
        tracing::info!(
            objects = %objects.display(),
            records = self.parser.state().len(),
            "parsed statusdat files"
        );
        self.write_cache();
        Ok(())
    }

    /// Re-read the status file into the existing object graph. Records from
    /// the previous status parse are dropped first.
    pub fn refresh(&mut self) -> Result<(), ReaderError> {
        self.parser.state_mut().reset_runtime();
        let status = &self.config.status_file;
        parse_file(status, |reader| self.parser.parse_runtime_state(reader))?;
        self.parser.state_mut().link_services();
        tracing::debug!(status = %status.display(), "refreshed runtime state");
        self.write_cache();
        Ok(())
    }

    fn write_cache(&self) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.store(&self.config.objects_file, &self.config.status_file, self.parser.state()) {
            tracing::warn!(dir = %cache.dir().display(), error = %e, "failed to write state cache");
        }
    }

    /// Drop this reader's cache entry.
    pub fn clear_cache(&self) -> Result<(), ReaderError> {
        if let Some(cache) = &self.cache {
            cache.clear(&self.config.objects_file)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &StatusdatConfig {
        &self.config
    }

    pub fn state(&self) -> &RuntimeState {
        self.parser.state()
    }

    /// Look up an object by type and identity key, e.g.
    /// `("service", "web1;HTTP")`.
    pub fn object_by_name(&self, kind: &str, key: &str) -> Option<&MonitoredObject> {
        self.state().object(kind, key)
    }

    pub fn object_names(&self, kind: &str) -> Vec<&str> {
        self.state().keys(kind)
    }

    pub fn select(&self) -> Query<'_> {
        Query::new(self.state())
    }

    pub fn summary(&self) -> StatusSummary {
        StatusSummary::from_state(self.state())
    }

    /// Per-group counts for `hostgroups`, `servicegroups` or `groups`.
    pub fn group_summaries(&self, target: Target) -> Vec<GroupSummary> {
        StatusSummary::by_group(self.state(), target)
    }
}

fn check_readable(name: &str, path: &Path) -> Result<(), ReaderError> {
    if path.as_os_str().is_empty() {
        return Err(ReaderError::Configuration(format!("{name} is empty")));
    }
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(ReaderError::Configuration(format!("{name} {} is not a file", path.display()))),
        Err(e) => Err(ReaderError::Configuration(format!("cannot read {name} {}: {e}", path.display()))),
    }
}

fn parse_file(
    path: &Path,
    parse: impl FnOnce(BufReader<File>) -> Result<(), ParsingError>,
) -> Result<(), ReaderError> {
    let file = File::open(path).map_err(|source| ReaderError::Io { path: path.to_path_buf(), source })?;
    parse(BufReader::new(file)).map_err(|source| ReaderError::Parsing { path: PathBuf::from(path), source })
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
