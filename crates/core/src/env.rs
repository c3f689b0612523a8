// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.

use std::path::PathBuf;
use std::time::Duration;

/// Default socket deadline for connect, write and read
pub fn io_timeout() -> Duration {
    std::env::var("MON_IO_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Resolve cache directory: MON_CACHE_DIR > platform cache dir/mon > $TMPDIR/mon
pub fn cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MON_CACHE_DIR") {
        return PathBuf::from(dir);
    }
    dirs::cache_dir().unwrap_or_else(std::env::temp_dir).join("mon")
}

/// Disable the statusdat state cache regardless of backend configuration.
pub fn no_cache() -> bool {
    std::env::var("MON_NO_CACHE")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
