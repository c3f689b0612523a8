// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use mon_core::ArgumentError;
use mon_wire::ProtocolError;
use thiserror::Error;

/// Errors raised while building or rendering a query
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("table {0:?} is not available")]
    UnknownTable(String),

    #[error("query has no table")]
    MissingTable,

    #[error(transparent)]
    InvalidArgument(#[from] ArgumentError),

    #[error("operation needs at least {needed} columns, query has {got}")]
    MissingColumns { needed: usize, got: usize },

    #[error("line break in query text {0:?}")]
    LineBreak(String),
}

/// Errors raised by a Livestatus connection
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("invalid livestatus socket {0:?}: expected an absolute path or tcp://host:port")]
    Configuration(String),

    #[error("cannot connect to livestatus socket {address}: {source}")]
    Connect { address: String, source: std::io::Error },

    #[error("livestatus {operation} timed out after {after:?}")]
    Timeout { operation: &'static str, after: Duration },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
