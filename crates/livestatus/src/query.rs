// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Livestatus query builder.
//!
//! Collects table, projection, filters, sort keys and a limit window, and
//! renders them as a Livestatus request. Sorting and the offset are applied
//! client-side after the response is decoded.

use std::fmt::Write;

use mon_core::{OrderColumn, Window};

use crate::error::QueryError;
use crate::table::Table;

/// Reserved filter key expanding into a host-or-service substring match
const SEARCH_KEY: &str = "search";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    table: Option<Table>,
    columns: Option<Vec<String>>,
    filters: Vec<String>,
    order: Vec<OrderColumn>,
    window: Option<Window>,
    count: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the table and, optionally, a column projection.
    pub fn from(&mut self, table: &str, columns: Option<&[&str]>) -> Result<&mut Self, QueryError> {
        self.table = Some(table.parse()?);
        self.columns = columns.map(|cols| cols.iter().map(|c| c.to_string()).collect());
        Ok(self)
    }

    /// Add an AND-ed filter.
    ///
    /// Without a value the key is sent verbatim (`"state > 0"`). A key
    /// containing `?` is a template for the value; any other key compares by
    /// equality. The `search` key matches host names or service descriptions.
    pub fn filter(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        match value {
            None => self.filters.push(format!("Filter: {key}")),
            Some(value) if key == SEARCH_KEY => {
                self.filters.push(format!("Filter: host_name ~~ {value}"));
                self.filters.push(format!("Filter: description ~~ {value}"));
                self.filters.push("Or: 2".to_string());
            }
            Some(value) if key.contains('?') => {
                self.filters.push(format!("Filter: {}", key.replace('?', value)))
            }
            Some(value) => self.filters.push(format!("Filter: {key} = {value}")),
        }
        self
    }

    /// Add a sort key: `"column"`, `"column ASC"` or `"column DESC"`.
    pub fn order(&mut self, spec: &str) -> &mut Self {
        if let Some(column) = OrderColumn::parse(spec) {
            self.order.push(column);
        }
        self
    }

    pub fn limit(&mut self, count: i64, offset: Option<i64>) -> Result<&mut Self, QueryError> {
        self.window = Some(Window::new(count, offset)?);
        Ok(self)
    }

    /// A copy of this query in aggregate count mode.
    pub fn count_query(&self) -> Self {
        Self { count: true, ..self.clone() }
    }

    pub fn table(&self) -> Option<Table> {
        self.table
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn has_columns(&self) -> bool {
        self.columns.is_some()
    }

    pub fn order_columns(&self) -> &[OrderColumn] {
        &self.order
    }

    pub fn window(&self) -> Option<Window> {
        self.window
    }

    pub fn is_count(&self) -> bool {
        self.count
    }

    /// Render the request text, terminated by a blank line.
    ///
    /// Fails when a column or filter carries a line break, since that would
    /// start a new header line.
    pub fn render(&self) -> Result<String, QueryError> {
        let table = self.table.ok_or(QueryError::MissingTable)?;
        let columns = self.columns.iter().flatten();
        if let Some(text) = columns.chain(&self.filters).find(|text| text.contains(['\n', '\r'])) {
            return Err(QueryError::LineBreak(text.clone()));
        }
        let mut out = format!("GET {table}\n");

        if let Some(columns) = self.columns.as_ref().filter(|_| !self.count) {
            let _ = writeln!(out, "Columns: {}", columns.join(" "));
        }
        for line in &self.filters {
            out.push_str(line);
            out.push('\n');
        }
        if self.count {
            out.push_str("Stats: state >= 0\n");
        } else if let Some(window) = self.window.filter(|_| self.order.is_empty()) {
            let _ = writeln!(out, "Limit: {}", window.end());
        }
        out.push_str("OutputFormat: json\nResponseHeader: fixed16\nKeepAlive: on\n\n");
        Ok(out)
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
