// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mon-statusdat: objects.cache / status.dat parser and in-memory query engine

mod cache;
mod error;
pub mod expression;
mod model;
mod parser;
mod query;
mod reader;
mod summary;

pub use cache::{CacheError, StateCache};
pub use error::{ParsingError, QueryError, ReaderError};
pub use expression::{Expression, ExpressionError, Group, GroupKind, Node, Operand, Operator, Predicate};
pub use model::{Field, FieldPath, MonitoredObject, ObjectId, Resolved, RuntimeState};
pub use parser::Parser;
pub use query::{GroupCount, Query, QueryResult, Row, Target};
pub use reader::{Reader, SharedReader};
pub use summary::{GroupSummary, StatusSummary};

#[cfg(test)]
mod test_support;
