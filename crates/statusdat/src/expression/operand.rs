// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// A comparison value, bound to a `?` placeholder or written literally.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Operand>),
}

impl Operand {
    /// Numeric view, when the operand is or parses as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Int(i) => Some(*i as f64),
            Operand::Float(f) => Some(*f),
            Operand::Text(s) => parse_number(s),
            Operand::List(_) => None,
        }
    }

    /// Elements for `IN`; a scalar is a list of one.
    pub fn elements(&self) -> Vec<&Operand> {
        match self {
            Operand::List(items) => items.iter().collect(),
            scalar => vec![scalar],
        }
    }

    /// Parse a literal operand. Quotes are stripped; for `IN`, a
    /// comma-separated literal becomes a list.
    pub(crate) fn literal(raw: &str, list: bool) -> Self {
        if list {
            let items: Vec<Operand> =
                split_list(raw).into_iter().map(|item| Operand::Text(unquote(item).to_string())).collect();
            return Operand::List(items);
        }
        Operand::Text(unquote(raw.trim()).to_string())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(i) => write!(f, "{i}"),
            Operand::Float(x) => write!(f, "{x}"),
            Operand::Text(s) => f.write_str(s),
            Operand::List(items) => {
                let items: Vec<String> = items.iter().map(Operand::to_string).collect();
                write!(f, "{}", items.join(","))
            }
        }
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Int(value)
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Int(i64::from(value))
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Float(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Text(value.to_string())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Text(value)
    }
}

impl<T: Into<Operand>> From<Vec<T>> for Operand {
    fn from(values: Vec<T>) -> Self {
        Operand::List(values.into_iter().map(Into::into).collect())
    }
}

pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn unquote(s: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

/// Split on commas outside quotes.
fn split_list(raw: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (pos, ch) in raw.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (None, '\'' | '"') => quote = Some(ch),
            (None, ',') => {
                items.push(raw.get(start..pos).unwrap_or_default().trim());
                start = pos + 1;
            }
            _ => {}
        }
    }
    items.push(raw.get(start..).unwrap_or_default().trim());
    items
}

#[cfg(test)]
#[path = "operand_tests.rs"]
mod tests;
