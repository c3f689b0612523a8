// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sort column parsing and the comparators both backends sort with.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

crate::simple_display! {
    SortDirection {
        Asc => "ASC",
        Desc => "DESC",
    }
}

impl SortDirection {
    /// Parse a direction keyword. Only `DESC` (any case) flips the order.
    pub fn from_keyword(keyword: &str) -> Self {
        if keyword.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// Orient an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// One sort key: a column (or dotted field path) and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderColumn {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderColumn {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self { column: column.into(), direction }
    }

    /// Parse `"column"`, `"column ASC"` or `"column desc"`.
    ///
    /// Returns `None` for a blank spec.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }
        match spec.rsplit_once(char::is_whitespace) {
            Some((column, dir))
                if dir.eq_ignore_ascii_case("asc") || dir.eq_ignore_ascii_case("desc") =>
            {
                Some(Self::new(column.trim_end(), SortDirection::from_keyword(dir)))
            }
            _ => Some(Self::new(spec, SortDirection::Asc)),
        }
    }
}

/// Case-insensitive lexicographic comparison.
pub fn casefold_cmp(a: &str, b: &str) -> Ordering {
    a.chars().flat_map(char::to_lowercase).cmp(b.chars().flat_map(char::to_lowercase))
}

/// Case-insensitive natural-order comparison: digit runs compare by numeric
/// value, so `"service2"` sorts before `"service10"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_digits(&mut a);
                let right = take_digits(&mut b);
                let ordering = compare_digit_runs(&left, &right);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                let ordering = x.to_lowercase().cmp(y.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
#[path = "order_tests.rs"]
mod tests;
