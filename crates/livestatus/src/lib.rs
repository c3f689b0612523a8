// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mon-livestatus: MK Livestatus query builder and socket client

mod connection;
mod error;
mod query;
mod result;
mod table;

pub use connection::{Address, Connection};
pub use error::{ConnectionError, QueryError};
pub use query::Query;
pub use result::{apply_order, rows_from_table, Row};
pub use table::Table;
