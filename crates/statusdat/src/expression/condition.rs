// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leaf conditions: `FIELD OPERATOR VALUE`.

use std::cmp::Ordering;
use std::collections::VecDeque;

use regex::Regex;

use super::error::ExpressionError;
use super::group::Predicate;
use super::operand::{parse_number, Operand};
use crate::model::{FieldPath, ObjectId, Resolved, RuntimeState};

mon_core::keyword_enum! {
    /// Comparison operators, matched case-insensitively.
    pub enum Operator {
        Less => "<",
        LessEq => "<=",
        Greater => ">",
        GreaterEq => ">=",
        Equal => "=",
        NotEqual => "!=",
        Like => "LIKE",
        In => "IN",
    }
}

impl Operator {
    fn parse(token: &str) -> Option<Self> {
        Operator::parse_keyword(&token.to_ascii_uppercase())
    }
}

/// A compiled leaf condition.
#[derive(Debug, Clone)]
pub struct Expression {
    path: FieldPath,
    count: bool,
    operator: Operator,
    operand: Operand,
    pattern: Option<Regex>,
}

impl Expression {
    /// Parse one leaf, taking a value from `values` for a `?` placeholder.
    pub fn parse(raw: &str, values: &mut VecDeque<Operand>) -> Result<Self, ExpressionError> {
        let malformed = || ExpressionError::Malformed(raw.trim().to_string());
        let (lhs, rest) = split_word(raw.trim()).ok_or_else(malformed)?;
        let (op, operand) = split_word(rest).ok_or_else(malformed)?;
        if operand.is_empty() {
            return Err(malformed());
        }

        let operator = Operator::parse(op).ok_or_else(|| ExpressionError::UnknownOperator {
            operator: op.to_string(),
            expression: raw.trim().to_string(),
        })?;

        let (count, path) = match lhs.strip_prefix("COUNT{").and_then(|s| s.strip_suffix('}')) {
            Some(inner) => (true, FieldPath::parse(inner)),
            None => (false, FieldPath::parse(lhs)),
        };
        if path.is_empty() {
            return Err(malformed());
        }

        let operand = if operand == "?" {
            values.pop_front().ok_or_else(|| ExpressionError::MissingValue(raw.trim().to_string()))?
        } else {
            Operand::literal(operand, operator == Operator::In)
        };

        let pattern = match operator {
            Operator::Like => like_pattern(&operand.to_string())?,
            _ => None,
        };

        Ok(Self { path, count, operator, operand, pattern })
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &Operand {
        &self.operand
    }

    /// True for `COUNT{field}` conditions.
    pub fn is_count(&self) -> bool {
        self.count
    }

    /// Whether the object at `id` satisfies the condition.
    pub fn matches(&self, state: &RuntimeState, id: ObjectId) -> bool {
        let resolved = state.resolve(id, &self.path);
        if self.count {
            return self.test(&resolved.len().to_string());
        }
        match resolved {
            Resolved::Absent => false,
            values => values.texts().any(|value| self.test(value)),
        }
    }

    fn test(&self, value: &str) -> bool {
        match self.operator {
            Operator::Equal => equals(value, &self.operand),
            Operator::NotEqual => !equals(value, &self.operand),
            Operator::Less => compare(value, &self.operand).is_some_and(Ordering::is_lt),
            Operator::LessEq => compare(value, &self.operand).is_some_and(Ordering::is_le),
            Operator::Greater => compare(value, &self.operand).is_some_and(Ordering::is_gt),
            Operator::GreaterEq => compare(value, &self.operand).is_some_and(Ordering::is_ge),
            Operator::In => self.operand.elements().into_iter().any(|item| equals(value, item)),
            Operator::Like => match &self.pattern {
                Some(pattern) => pattern.is_match(value),
                None => value.contains(&self.operand.to_string()),
            },
        }
    }
}

impl Predicate for Expression {
    fn parse(raw: &str, values: &mut VecDeque<Operand>) -> Result<Self, ExpressionError> {
        Expression::parse(raw, values)
    }

    fn filter(&self, state: &RuntimeState, candidates: &[ObjectId]) -> Vec<ObjectId> {
        candidates.iter().copied().filter(|id| self.matches(state, *id)).collect()
    }
}

/// Numeric equality when both sides are numbers, otherwise case-insensitive.
fn equals(value: &str, operand: &Operand) -> bool {
    match (parse_number(value), operand.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => value.to_lowercase() == operand.to_string().to_lowercase(),
    }
}

/// Numeric ordering when both sides are numbers, otherwise byte-wise.
fn compare(value: &str, operand: &Operand) -> Option<Ordering> {
    match (parse_number(value), operand.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => Some(value.cmp(operand.to_string().as_str())),
    }
}

/// `%` is a wildcard and the whole value must match. Without `%` the
/// pattern is a plain substring test.
fn like_pattern(pattern: &str) -> Result<Option<Regex>, ExpressionError> {
    if !pattern.contains('%') {
        return Ok(None);
    }
    let body: Vec<String> = pattern.split('%').map(regex::escape).collect();
    let source = format!("^(?s:{})$", body.join(".*"));
    Regex::new(&source).map(Some).map_err(|e| ExpressionError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn split_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((s, "")),
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
