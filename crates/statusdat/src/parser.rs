// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Streaming parser for `objects.cache` and `status.dat`.
//!
//! Objects file:
//! ```text
//! define host {
//!     host_name	web1
//!     alias	Web server
//! }
//! ```
//!
//! Status file:
//! ```text
//! hoststatus {
//!     host_name=web1
//!     current_state=0
//! }
//! ```

use std::io::BufRead;

use crate::error::ParsingError;
use crate::model::{identity_for, Field, MonitoredObject, ObjectId, RuntimeState};

const DEFINE: &str = "define ";

/// Runtime sections whose records are also indexed by their own id field.
const INDEXED_RUNTIME_KINDS: &[&str] = &["comment", "downtime"];

/// A relation object waiting to be attached to its owner.
struct Deferred {
    id: ObjectId,
    /// `host` or `service`
    owner: &'static str,
    /// Field on the owner, e.g. `escalation` or `group`
    property: String,
    line: usize,
}

/// Owns one [`RuntimeState`] and feeds files into it.
#[derive(Debug, Default)]
pub struct Parser {
    state: RuntimeState,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue from an existing state, e.g. one restored from cache.
    pub fn with_state(state: RuntimeState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RuntimeState {
        &mut self.state
    }

    pub fn into_state(self) -> RuntimeState {
        self.state
    }

    /// Parse an objects file, replacing any previous state.
    pub fn parse_objects_file<R: BufRead>(&mut self, reader: R) -> Result<(), ParsingError> {
        self.state = RuntimeState::new();
        let mut deferred = Vec::new();
        let mut lines = Lines::new(reader);

        while let Some(line) = lines.next_content()? {
            if line == "}" {
                return Err(lines.syntax("unexpected '}' outside of a define block"));
            }
            let Some(kind) = line
                .strip_prefix(DEFINE)
                .and_then(|rest| rest.strip_suffix('{'))
                .map(str::trim)
                .filter(|kind| !kind.is_empty())
            else {
                return Err(lines.syntax(format!("expected 'define <type> {{', found {line:?}")));
            };
            let kind = kind.to_string();
            let opened = lines.number;
            let object = self.read_object_block(&mut lines, &kind, opened)?;
            self.register_object(object, opened, &mut deferred);
        }

        for relation in deferred {
            self.attach_relation(relation)?;
        }
        tracing::debug!(objects = self.state.len(), "parsed objects file");
        Ok(())
    }

    fn read_object_block<R: BufRead>(
        &mut self,
        lines: &mut Lines<R>,
        kind: &str,
        opened: usize,
    ) -> Result<MonitoredObject, ParsingError> {
        let mut object = MonitoredObject::new(kind);
        loop {
            let Some(line) = lines.next_content()? else {
                return Err(ParsingError::UnexpectedEof { line: opened });
            };
            if line == "}" {
                return Ok(object);
            }
            if line.starts_with(DEFINE) {
                return Err(lines.syntax("nested define block"));
            }
            let (key, value) = match line.split_once(['\t', ' ']) {
                Some((key, value)) => (key, value.trim()),
                None => (line.as_str(), ""),
            };
            object.insert_repeatable(key, Field::from(value));
        }
    }

    fn register_object(&mut self, object: MonitoredObject, line: usize, deferred: &mut Vec<Deferred>) {
        let relation = relation_target(&object.kind);
        let id = match object.identity() {
            Some(key) => {
                let kind = object.kind.clone();
                self.state.insert(&kind, key, object)
            }
            None => self.state.push(object),
        };
        if let Some((owner, property)) = relation {
            deferred.push(Deferred { id, owner, property, line });
        }
    }

    /// Attach a relation object (escalation, dependency, group, ...) to the
    /// host or service it belongs to.
    fn attach_relation(&mut self, relation: Deferred) -> Result<(), ParsingError> {
        let Some(object) = self.state.get(relation.id) else {
            return Ok(());
        };

        if relation.property.contains("group") {
            let group = object.identity().unwrap_or_default();
            let members = joined_members(object);
            let members = split_members(relation.owner, &members).ok_or_else(|| ParsingError::OddMembers {
                line: relation.line,
                group: group.clone(),
            })?;
            for member in members {
                match self.state.lookup(relation.owner, &member) {
                    Some(owner) => self.append(owner, &relation.property, Field::Text(group.clone())),
                    None => tracing::warn!(
                        group = %group,
                        member = %member,
                        "skipping unknown {} group member",
                        relation.owner
                    ),
                }
            }
            return Ok(());
        }

        match identity_for(relation.owner, object).and_then(|key| self.state.lookup(relation.owner, &key)) {
            Some(owner) => self.append(owner, &relation.property, Field::Record(relation.id)),
            None => tracing::warn!(
                kind = %object.kind,
                line = relation.line,
                "skipping relation without a known {}",
                relation.owner
            ),
        }
        Ok(())
    }

    fn append(&mut self, owner: ObjectId, property: &str, value: Field) {
        if let Some(object) = self.state.get_mut(owner) {
            object.append(property, value);
        }
    }

    /// Merge a status file into the state built from the objects file.
    ///
    /// `*status` sections replace the owner's `status` record; any other
    /// section (`hostcomment`, `servicedowntime`, ...) is appended to the
    /// owner's list of that name.
    pub fn parse_runtime_state<R: BufRead>(&mut self, reader: R) -> Result<(), ParsingError> {
        if self.state.is_empty() {
            return Err(ParsingError::MissingObjects);
        }
        self.state.mark_runtime_start();
        let mut lines = Lines::new(reader);
        let mut merged = 0usize;

        while let Some(line) = lines.next_content()? {
            let Some(section) = line.strip_suffix('{').map(str::trim).filter(|s| !s.is_empty()) else {
                return Err(lines.syntax(format!("expected '<section> {{', found {line:?}")));
            };
            let section = section.to_string();
            let opened = lines.number;
            let record = read_state_block(&mut lines, &section, opened)?;

            let Some((kind, suffix)) = runtime_target(&section) else {
                continue;
            };
            if !self.state.has_kind(kind) {
                return Err(ParsingError::UnknownType { line: opened, kind: kind.to_string() });
            }
            let key = identity_for(kind, &record).unwrap_or_default();
            let owner = self.state.lookup(kind, &key).ok_or_else(|| ParsingError::UnknownObject {
                line: opened,
                kind: kind.to_string(),
                key: key.clone(),
            })?;

            let index_key = INDEXED_RUNTIME_KINDS
                .contains(&suffix)
                .then(|| record.text(&format!("{suffix}_id")).map(str::to_string))
                .flatten();
            let id = self.state.push(record);
            if let Some(index_key) = index_key {
                self.state.register(suffix, index_key, id);
            }
            if let Some(object) = self.state.get_mut(owner) {
                if suffix == "status" {
                    object.fields.insert("status".to_string(), Field::Record(id));
                } else {
                    object.append(suffix, Field::Record(id));
                }
            }
            merged += 1;
        }
        tracing::debug!(records = merged, "merged runtime state");
        Ok(())
    }
}

fn read_state_block<R: BufRead>(
    lines: &mut Lines<R>,
    section: &str,
    opened: usize,
) -> Result<MonitoredObject, ParsingError> {
    let mut record = MonitoredObject::new(section);
    loop {
        let Some(line) = lines.next_content()? else {
            return Err(ParsingError::UnexpectedEof { line: opened });
        };
        if line == "}" {
            return Ok(record);
        }
        if line.ends_with('{') {
            return Err(lines.syntax("nested section"));
        }
        let (key, value) = line.split_once('=').unwrap_or((line.as_str(), ""));
        record.fields.insert(key.trim().to_string(), Field::from(value.trim()));
    }
}

/// For `hostescalation`, `servicedependency`, `hostgroup`, ...: the owning
/// type and the property the object is registered under.
fn relation_target(kind: &str) -> Option<(&'static str, String)> {
    if kind == "host" || kind == "service" {
        return None;
    }
    if let Some(property) = kind.strip_prefix("service") {
        return Some(("service", property.to_string()));
    }
    kind.strip_prefix("host").map(|property| ("host", property.to_string()))
}

/// Owner type and merge suffix for a status-file section. Sections about
/// neither hosts nor services are skipped.
fn runtime_target(section: &str) -> Option<(&'static str, &str)> {
    for kind in ["service", "host"] {
        if let Some(pos) = section.find(kind) {
            return Some((kind, &section[pos + kind.len()..]));
        }
    }
    None
}

/// Every `members` line of a group as one comma-separated list.
fn joined_members(group: &MonitoredObject) -> String {
    match group.get("members") {
        Some(Field::List(lines)) => lines.iter().filter_map(Field::as_text).collect::<Vec<_>>().join(","),
        Some(line) => line.as_text().unwrap_or_default().to_string(),
        None => String::new(),
    }
}

/// Group member keys. Servicegroup members alternate host and service.
fn split_members(owner: &str, members: &str) -> Option<Vec<String>> {
    let members: Vec<&str> =
        members.split(',').map(str::trim).filter(|m| !m.is_empty()).collect();
    if owner != "service" {
        return Some(members.into_iter().map(str::to_string).collect());
    }
    if members.len() % 2 != 0 {
        return None;
    }
    Some(members.chunks(2).map(|pair| format!("{};{}", pair[0], pair[1])).collect())
}

/// Trimmed, comment-free lines with a running line number.
struct Lines<R> {
    reader: R,
    number: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self { reader, number: 0 }
    }

    fn next_content(&mut self) -> Result<Option<String>, ParsingError> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.number += 1;
            let line = buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Ok(Some(line.to_string()));
        }
    }

    fn syntax(&self, message: impl Into<String>) -> ParsingError {
        ParsingError::Syntax { line: self.number, message: message.into() }
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
