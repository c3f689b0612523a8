// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Limit/offset windows.

use thiserror::Error;

/// Rejected query-builder arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("invalid limit {0}: must be a non-negative integer")]
    NegativeCount(i64),

    #[error("invalid offset {0}: must be a non-negative integer")]
    NegativeOffset(i64),
}

/// A `[offset, offset + count)` slice over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub count: usize,
    pub offset: usize,
}

impl Window {
    /// Validate caller-supplied limit arguments.
    pub fn new(count: i64, offset: Option<i64>) -> Result<Self, ArgumentError> {
        let count = usize::try_from(count).map_err(|_| ArgumentError::NegativeCount(count))?;
        let offset = match offset {
            Some(offset) => {
                usize::try_from(offset).map_err(|_| ArgumentError::NegativeOffset(offset))?
            }
            None => 0,
        };
        Ok(Self { count, offset })
    }

    /// Number of leading rows needed to satisfy the window (`count + offset`).
    pub fn end(&self) -> usize {
        self.count.saturating_add(self.offset)
    }

    /// Slice `items` down to the window.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.count).collect()
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
