// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mon-core: shared query vocabulary for the monitoring backends

pub mod macros;

pub mod config;
pub mod env;
pub mod order;
pub mod window;

pub use config::{BackendConfig, BackendsConfig, ConfigError, LivestatusConfig, StatusdatConfig};
pub use order::{casefold_cmp, natural_cmp, OrderColumn, SortDirection};
pub use window::{ArgumentError, Window};
