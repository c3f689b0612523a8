// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Livestatus response framing.
//!
//! Wire format: 16-byte `fixed16` header (3-digit status, space, byte length
//! right-aligned in 11 columns, newline) + body. Successful bodies are JSON
//! arrays of rows.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod header;
mod wire;

pub use header::{ResponseHeader, HEADER_LEN, MAX_BODY_LEN, STATUS_OK};
pub use wire::{decode_table, encode_response, read_response, write_query, ProtocolError, Response};
