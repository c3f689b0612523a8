// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Condition strings compiled into filter trees.
//!
//! `status.current_state >= ? AND (host_name LIKE 'web%' OR COUNT{comment} > 0)`
//! becomes an AND [`Group`] holding one [`Expression`] and one OR group.
//! Each `?` takes the next caller-supplied [`Operand`].

mod condition;
mod error;
mod group;
mod lexer;
mod operand;

pub use condition::{Expression, Operator};
pub use error::ExpressionError;
pub use group::{compile, Group, GroupKind, Node, Predicate};
pub use lexer::{tokenize, Token, TokenKind};
pub use operand::Operand;
