// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decoded result rows and client-side post-processing.

use indexmap::IndexMap;
use mon_core::{casefold_cmp, OrderColumn, Window};
use mon_wire::ProtocolError;
use serde_json::Value;

/// One result row, column name to value in column order.
pub type Row = IndexMap<String, Value>;

/// Name positional rows.
///
/// With declared columns every row is data; otherwise the first row carries
/// the column headers.
pub fn rows_from_table(
    table: Vec<Vec<Value>>,
    columns: Option<&[String]>,
) -> Result<Vec<Row>, ProtocolError> {
    let mut table = table.into_iter();
    let headers: Vec<String> = match columns {
        Some(columns) => columns.to_vec(),
        None => match table.next() {
            Some(first) => first
                .into_iter()
                .map(|header| match header {
                    Value::String(name) => Ok(name),
                    other => Err(ProtocolError::Shape(format!("column header {other} is not a string"))),
                })
                .collect::<Result<_, _>>()?,
            None => return Ok(Vec::new()),
        },
    };

    Ok(table.map(|values| headers.iter().cloned().zip(values).collect()).collect())
}

/// Stable multi-key sort over the declared columns, compared as
/// case-insensitive strings. Missing columns compare as empty.
pub fn apply_order(rows: &mut [Row], order: &[OrderColumn]) {
    if order.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        order
            .iter()
            .map(|key| {
                let left = sort_text(a.get(&key.column));
                let right = sort_text(b.get(&key.column));
                key.direction.apply(casefold_cmp(&left, &right))
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Sort, then slice to the window.
pub(crate) fn post_process(
    mut rows: Vec<Row>,
    order: &[OrderColumn],
    window: Option<Window>,
) -> Vec<Row> {
    apply_order(&mut rows, order);
    match window {
        Some(window) => window.apply(rows),
        None => rows,
    }
}

fn sort_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
