// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised while compiling a condition string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("unterminated quote starting at position {position}")]
    UnterminatedQuote { position: usize },

    #[error("unexpected ')' at position {position}")]
    UnexpectedClose { position: usize },

    #[error("missing ')' for '(' at position {position}")]
    UnclosedGroup { position: usize },

    #[error("expected a condition at position {position}")]
    EmptyOperand { position: usize },

    #[error("expected AND or OR at position {position}")]
    MissingConjunction { position: usize },

    #[error("expressions must look like 'FIELD OPERATOR VALUE', got {0:?}")]
    Malformed(String),

    #[error("unknown operator {operator:?} in expression {expression:?}")]
    UnknownOperator { operator: String, expression: String },

    #[error("no value left for placeholder in {0:?}")]
    MissingValue(String),

    #[error("{0} value(s) supplied but not consumed by placeholders")]
    ExcessValues(usize),

    #[error("invalid LIKE pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },
}
