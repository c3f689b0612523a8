// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use mon_core::ArgumentError;
use thiserror::Error;

use crate::cache::CacheError;
use crate::expression::ExpressionError;

/// Errors raised while reading objects.cache or status.dat
#[derive(Debug, Error)]
pub enum ParsingError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("unexpected end of file inside a block opened on line {line}")]
    UnexpectedEof { line: usize },

    #[error("tried to read runtime state without objects data")]
    MissingObjects,

    #[error("line {line}: no {kind} objects registered in objects file")]
    UnknownType { line: usize, kind: String },

    #[error("line {line}: unknown {kind} object {key:?}")]
    UnknownObject { line: usize, kind: String, key: String },

    #[error("line {line}: servicegroup {group:?} has an odd number of members")]
    OddMembers { line: usize, group: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by [`crate::Query`]
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown from target for status.dat: {0:?}")]
    UnknownTarget(String),

    #[error("query has no target")]
    MissingTable,

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error("operation needs at least {needed} columns, query has {got}")]
    MissingColumns { needed: usize, got: usize },

    #[error(transparent)]
    InvalidArgument(#[from] ArgumentError),
}

/// Errors raised by [`crate::Reader`]
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to parse {}: {source}", path.display())]
    Parsing { path: PathBuf, source: ParsingError },

    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Cache(#[from] CacheError),
}
