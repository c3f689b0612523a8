// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory object graph.
//!
//! Every record (hosts, services, their status sub-records, comments,
//! escalations, ...) lives in one arena and is addressed by [`ObjectId`].
//! Named objects are additionally indexed per type by their identity key.
//! Links between records are ids, never owning references.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Index of a record in the [`RuntimeState`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Text(String),
    Record(ObjectId),
    List(Vec<Field>),
}

impl Field {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<ObjectId> {
        match self {
            Field::Record(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Field]> {
        match self {
            Field::List(items) => Some(items),
            _ => None,
        }
    }

    /// Push `self` and, for lists, every nested element onto `out`.
    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a Field>) {
        match self {
            Field::List(items) => items.iter().for_each(|item| item.flatten_into(out)),
            other => out.push(other),
        }
    }

    /// Drop references to records at or above `limit`. Returns false when
    /// nothing is left.
    fn prune(&mut self, limit: usize) -> bool {
        match self {
            Field::Text(_) => true,
            Field::Record(id) => id.0 < limit,
            Field::List(items) => {
                items.retain_mut(|item| item.prune(limit));
                !items.is_empty()
            }
        }
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Text(s.to_string())
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Field::Text(s)
    }
}

impl From<ObjectId> for Field {
    fn from(id: ObjectId) -> Self {
        Field::Record(id)
    }
}

/// An untyped key/value record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredObject {
    /// Block type, e.g. `host`, `servicegroup`, `hoststatus`
    pub kind: String,
    pub fields: IndexMap<String, Field>,
}

impl MonitoredObject {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), fields: IndexMap::new() }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Field>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Field::as_text)
    }

    /// Store a parsed value; a repeated key turns the field into a list.
    pub fn insert_repeatable(&mut self, key: &str, value: Field) {
        match self.fields.get_mut(key) {
            None => {
                self.fields.insert(key.to_string(), value);
            }
            Some(Field::List(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, Field::List(Vec::new()));
                *existing = Field::List(vec![first, value]);
            }
        }
    }

    /// Append to a list field, creating it when missing.
    pub fn append(&mut self, key: &str, value: Field) {
        match self.fields.get_mut(key) {
            Some(Field::List(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, Field::List(Vec::new()));
                *existing = Field::List(vec![first, value]);
            }
            None => {
                self.fields.insert(key.to_string(), Field::List(vec![value]));
            }
        }
    }

    /// Identity key under which the object is indexed for its own type.
    ///
    /// Services use `host_name;service_description`; every other type uses
    /// its `<type>_name` field and is unnamed without one.
    pub fn identity(&self) -> Option<String> {
        identity_for(&self.kind, self)
    }
}

/// Identity key of `object` when looked up as a `kind`.
pub(crate) fn identity_for(kind: &str, object: &MonitoredObject) -> Option<String> {
    if kind == "service" {
        let host = object.text("host_name")?;
        let service = object.text("service_description").unwrap_or_default();
        return Some(format!("{host};{service}"));
    }
    object.text(&format!("{kind}_name")).map(str::to_string)
}

/// A dotted field path like `status.current_state`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn parse(path: &str) -> Self {
        Self(path.trim().split('.').map(|s| s.trim().to_string()).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(String::is_empty)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Outcome of resolving a [`FieldPath`] against a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<'a> {
    Absent,
    /// Leaf values with lists flattened; never empty
    Values(Vec<&'a Field>),
}

impl<'a> Resolved<'a> {
    pub fn len(&self) -> usize {
        match self {
            Resolved::Absent => 0,
            Resolved::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn texts(&self) -> impl Iterator<Item = &'a str> + '_ {
        let values: &[&'a Field] = match self {
            Resolved::Absent => &[],
            Resolved::Values(values) => values,
        };
        values.iter().copied().filter_map(Field::as_text)
    }

    pub fn first_text(&self) -> Option<&'a str> {
        self.texts().next()
    }
}

/// The parsed monitoring state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeState {
    objects: Vec<MonitoredObject>,
    index: BTreeMap<String, IndexMap<String, ObjectId>>,
    /// First arena slot written by a status-file parse
    #[serde(default)]
    runtime_start: Option<usize>,
}

impl RuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no named object of any type is registered.
    pub fn is_empty(&self) -> bool {
        self.index.values().all(IndexMap::is_empty)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Store a record without indexing it.
    pub fn push(&mut self, object: MonitoredObject) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(object);
        id
    }

    /// Store a record and index it under `kind` by `key`. A repeated key
    /// points the index at the newest record.
    pub fn insert(&mut self, kind: &str, key: String, object: MonitoredObject) -> ObjectId {
        let id = self.push(object);
        self.register(kind, key, id);
        id
    }

    pub fn register(&mut self, kind: &str, key: String, id: ObjectId) {
        self.index.entry(kind.to_string()).or_default().insert(key, id);
    }

    pub fn get(&self, id: ObjectId) -> Option<&MonitoredObject> {
        self.objects.get(id.0)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut MonitoredObject> {
        self.objects.get_mut(id.0)
    }

    pub fn lookup(&self, kind: &str, key: &str) -> Option<ObjectId> {
        self.index.get(kind)?.get(key).copied()
    }

    pub fn object(&self, kind: &str, key: &str) -> Option<&MonitoredObject> {
        self.lookup(kind, key).and_then(|id| self.get(id))
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.index.get(kind).is_some_and(|keys| !keys.is_empty())
    }

    /// Ids of every object indexed under `kind`, in registration order.
    pub fn ids(&self, kind: &str) -> Vec<ObjectId> {
        self.index.get(kind).map(|keys| keys.values().copied().collect()).unwrap_or_default()
    }

    /// Identity keys of every object indexed under `kind`.
    pub fn keys(&self, kind: &str) -> Vec<&str> {
        self.index.get(kind).map(|keys| keys.keys().map(String::as_str).collect()).unwrap_or_default()
    }

    /// Resolve a dotted path from `id`, following record links and
    /// flattening lists at every step.
    pub fn resolve(&self, id: ObjectId, path: &FieldPath) -> Resolved<'_> {
        let segments = path.segments();
        let mut records = vec![id];
        let mut found: Vec<&Field> = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            found.clear();
            for record in &records {
                if let Some(field) = self.get(*record).and_then(|o| o.get(segment)) {
                    field.flatten_into(&mut found);
                }
            }
            if i + 1 < segments.len() {
                records = found.iter().filter_map(|f| f.as_record()).collect();
                if records.is_empty() {
                    return Resolved::Absent;
                }
            }
        }
        if found.is_empty() {
            Resolved::Absent
        } else {
            Resolved::Values(found)
        }
    }

    /// Link every service to its host: `service.host` and `host.services[]`.
    ///
    /// Rebuilds `host.services` from scratch so it can be called again.
    pub fn link_services(&mut self) {
        for host in self.ids("host") {
            if let Some(object) = self.get_mut(host) {
                object.fields.shift_remove("services");
            }
        }
        for service in self.ids("service") {
            let Some(host_name) = self.get(service).and_then(|s| s.text("host_name")) else {
                continue;
            };
            let Some(host) = self.lookup("host", host_name) else {
                tracing::warn!(host = host_name, service = %service, "service references unknown host");
                continue;
            };
            if let Some(object) = self.get_mut(service) {
                object.fields.insert("host".to_string(), Field::Record(host));
            }
            if let Some(object) = self.get_mut(host) {
                object.append("services", Field::Record(service));
            }
        }
    }

    /// Remember where status-file records begin, once.
    pub(crate) fn mark_runtime_start(&mut self) {
        if self.runtime_start.is_none() {
            self.runtime_start = Some(self.objects.len());
        }
    }

    /// Drop every record added by status-file parses, along with the links
    /// and index entries that point at them.
    pub fn reset_runtime(&mut self) {
        let Some(start) = self.runtime_start.take() else {
            return;
        };
        self.objects.truncate(start);
        for object in &mut self.objects {
            object.fields.retain(|_, field| field.prune(start));
        }
        for keys in self.index.values_mut() {
            keys.retain(|_, id| id.0 < start);
        }
        self.index.retain(|_, keys| !keys.is_empty());
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
