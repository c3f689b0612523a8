// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory queries over a parsed [`RuntimeState`].
//!
//! Evaluation order is filter, sort, group, then the limit window.

use std::cmp::Ordering;
use std::str::FromStr;

use indexmap::IndexMap;
use mon_core::{natural_cmp, OrderColumn, Window};
use serde::Serialize;

use crate::error::QueryError;
use crate::expression::{compile, Group, GroupKind, Node, Operand};
use crate::model::{Field, FieldPath, ObjectId, Resolved, RuntimeState};

mon_core::keyword_enum! {
    /// Queryable object collections.
    pub enum Target {
        Hosts => "hosts",
        Services => "services",
        Downtimes => "downtimes",
        Comments => "comments",
        Contacts => "contacts",
        ContactGroups => "contactgroups",
        HostGroups => "hostgroups",
        ServiceGroups => "servicegroups",
        Groups => "groups",
    }
}

impl Target {
    /// Object types the target reads, in result order.
    pub fn kinds(self) -> &'static [&'static str] {
        match self {
            Target::Hosts => &["host"],
            Target::Services => &["service"],
            Target::Downtimes => &["downtime"],
            Target::Comments => &["comment"],
            Target::Contacts => &["contact"],
            Target::ContactGroups => &["contactgroup"],
            Target::HostGroups => &["hostgroup"],
            Target::ServiceGroups => &["servicegroup"],
            Target::Groups => &["hostgroup", "servicegroup"],
        }
    }
}

impl FromStr for Target {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::parse_keyword(s).ok_or_else(|| QueryError::UnknownTarget(s.to_string()))
    }
}

/// One projected row, column name to text.
pub type Row = IndexMap<String, String>;

/// One group-by bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub columns: IndexMap<String, String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Objects(Vec<ObjectId>),
    Groups(Vec<GroupCount>),
}

impl QueryResult {
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Objects(ids) => ids.len(),
            QueryResult::Groups(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct Query<'a> {
    state: &'a RuntimeState,
    target: Option<Target>,
    columns: Option<Vec<String>>,
    filter: Group,
    order: Vec<OrderColumn>,
    window: Option<Window>,
    group_by: Option<Vec<String>>,
}

impl<'a> Query<'a> {
    pub fn new(state: &'a RuntimeState) -> Self {
        Self {
            state,
            target: None,
            columns: None,
            filter: Group::new(GroupKind::And),
            order: Vec::new(),
            window: None,
            group_by: None,
        }
    }

    /// Select the target and, optionally, the projected columns.
    pub fn from(&mut self, target: &str, columns: Option<&[&str]>) -> Result<&mut Self, QueryError> {
        self.target = Some(target.parse()?);
        self.columns = columns.map(|cols| cols.iter().map(|c| c.to_string()).collect());
        Ok(self)
    }

    /// AND a condition onto the query, binding `values` to its `?`
    /// placeholders left to right.
    pub fn filter(&mut self, condition: &str, values: Vec<Operand>) -> Result<&mut Self, QueryError> {
        let group = compile(condition, values)?;
        if !group.is_empty() {
            self.filter.push(Node::Group(group));
        }
        Ok(self)
    }

    /// Add a sort key: `"field"`, `"field ASC"` or `"status.current_state DESC"`.
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

    /// Collapse the result into one [`GroupCount`] per distinct value tuple.
    pub fn group_by_columns(&mut self, columns: &[&str]) -> &mut Self {
        self.group_by = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn get_result(&self) -> Result<QueryResult, QueryError> {
        let mut ids = self.matching()?;
        self.sort(&mut ids);

        let result = match &self.group_by {
            Some(columns) => QueryResult::Groups(self.window(self.group(&ids, columns))),
            None => QueryResult::Objects(self.window(ids)),
        };
        tracing::debug!(target_kind = ?self.target, rows = result.len(), "statusdat query");
        Ok(result)
    }

    /// Project the result into rows. Grouped queries yield their columns plus
    /// a `count` column.
    pub fn fetch_all(&self) -> Result<Vec<Row>, QueryError> {
        let rows = match self.get_result()? {
            QueryResult::Objects(ids) => ids.into_iter().map(|id| self.project(id)).collect(),
            QueryResult::Groups(groups) => groups
                .into_iter()
                .map(|group| {
                    let mut row = group.columns;
                    row.insert("count".to_string(), group.count.to_string());
                    row
                })
                .collect(),
        };
        Ok(rows)
    }

    pub fn fetch_row(&self) -> Result<Option<Row>, QueryError> {
        Ok(self.fetch_all()?.into_iter().next())
    }

    /// Map the first projected column to the second.
    pub fn fetch_pairs(&self) -> Result<IndexMap<String, String>, QueryError> {
        let got = self.columns.as_ref().map_or(0, Vec::len);
        if got < 2 {
            return Err(QueryError::MissingColumns { needed: 2, got });
        }
        Ok(self
            .fetch_all()?
            .into_iter()
            .filter_map(|row| {
                let mut values = row.into_values();
                Some((values.next()?, values.next()?))
            })
            .collect())
    }

    /// Number of matching objects, ignoring the limit window.
    pub fn count(&self) -> Result<usize, QueryError> {
        Ok(self.matching()?.len())
    }

    fn matching(&self) -> Result<Vec<ObjectId>, QueryError> {
        let target = self.target.ok_or(QueryError::MissingTable)?;
        let candidates: Vec<ObjectId> = target.kinds().iter().flat_map(|kind| self.state.ids(kind)).collect();
        Ok(self.filter.filter(self.state, &candidates))
    }

    fn sort(&self, ids: &mut Vec<ObjectId>) {
        if self.order.is_empty() {
            return;
        }
        let paths: Vec<FieldPath> = self.order.iter().map(|key| FieldPath::parse(&key.column)).collect();
        let kinds = self.target.map(Target::kinds).unwrap_or_default();
        // Mixed targets sort within each object type, keeping type order.
        let rank = |id: ObjectId| {
            self.state.get(id).and_then(|o| kinds.iter().position(|kind| *kind == o.kind)).unwrap_or(kinds.len())
        };
        let mut keyed: Vec<(ObjectId, usize, Vec<Option<&str>>)> = ids
            .iter()
            .map(|id| (*id, rank(*id), paths.iter().map(|path| self.state.resolve(*id, path).first_text()).collect()))
            .collect();

        keyed.sort_by(|(_, rank_a, a), (_, rank_b, b)| {
            rank_a.cmp(rank_b).then_with(|| self.compare_keys(a, b))
        });
        *ids = keyed.into_iter().map(|(id, _, _)| id).collect();
    }

    fn compare_keys(&self, a: &[Option<&str>], b: &[Option<&str>]) -> Ordering {
        self.order
            .iter()
            .zip(a.iter().zip(b))
            .map(|(key, (left, right))| match (left, right) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(left), Some(right)) => key.direction.apply(natural_cmp(left, right)),
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    fn group(&self, ids: &[ObjectId], columns: &[String]) -> Vec<GroupCount> {
        let paths: Vec<FieldPath> = columns.iter().map(|c| FieldPath::parse(c)).collect();
        let mut groups: IndexMap<Vec<String>, usize> = IndexMap::new();
        for id in ids {
            let key = paths.iter().map(|path| text_of(self.state.resolve(*id, path))).collect();
            *groups.entry(key).or_default() += 1;
        }
        groups
            .into_iter()
            .map(|(values, count)| GroupCount { columns: columns.iter().cloned().zip(values).collect(), count })
            .collect()
    }

    fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        match self.window {
            Some(window) => window.apply(items),
            None => items,
        }
    }

    fn project(&self, id: ObjectId) -> Row {
        match &self.columns {
            Some(columns) => columns
                .iter()
                .map(|column| (column.clone(), text_of(self.state.resolve(id, &FieldPath::parse(column)))))
                .collect(),
            None => self
                .state
                .get(id)
                .map(|object| {
                    object
                        .fields
                        .iter()
                        .filter_map(|(key, field)| match field {
                            Field::Text(text) => Some((key.clone(), text.clone())),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Scalar text of a resolved path; list values are comma-joined and an
/// absent path is empty.
fn text_of(resolved: Resolved<'_>) -> String {
    resolved.texts().collect::<Vec<_>>().join(",")
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
