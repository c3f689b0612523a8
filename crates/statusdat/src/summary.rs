// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host and service state counts for an overview.
//!
//! A problem is handled when it is acknowledged or in scheduled downtime. A
//! service problem on a host that is not up counts as handled too.
//!
//! Group summaries count the members of one hostgroup or servicegroup. A
//! servicegroup counts only its member services and their distinct hosts.

use serde::Serialize;

use crate::model::{Field, MonitoredObject, ObjectId, RuntimeState};
use crate::query::Target;

const HOST_UP: &str = "0";
const HOST_DOWN: &str = "1";
const HOST_UNREACHABLE: &str = "2";

const SERVICE_OK: &str = "0";
const SERVICE_WARNING: &str = "1";
const SERVICE_CRITICAL: &str = "2";
const SERVICE_UNKNOWN: &str = "3";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub hosts_up: usize,
    pub hosts_down_handled: usize,
    pub hosts_down_unhandled: usize,
    pub hosts_unreachable_handled: usize,
    pub hosts_unreachable_unhandled: usize,
    pub hosts_pending: usize,
    pub services_ok: usize,
    pub services_warning_handled: usize,
    pub services_warning_unhandled: usize,
    pub services_critical_handled: usize,
    pub services_critical_unhandled: usize,
    pub services_unknown_handled: usize,
    pub services_unknown_unhandled: usize,
    pub services_pending: usize,
}

impl StatusSummary {
    /// Summarize every host and service in `state`.
    pub fn from_state(state: &RuntimeState) -> Self {
        Self::collect(state, &state.ids("host"))
    }

    /// Summarize `hosts` and the services linked to them.
    pub fn collect(state: &RuntimeState, hosts: &[ObjectId]) -> Self {
        let mut summary = Self::default();
        for host in hosts.iter().filter_map(|id| state.get(*id)) {
            let host_status = status_of(state, host);
            summary.count_host(host_status);

            let host_up = is_up(host_status);
            for service in linked_services(state, host) {
                summary.count_service(status_of(state, service), host_up);
            }
        }
        summary
    }

    /// Summarize `services` and, once each, the hosts they run on.
    pub fn collect_services(state: &RuntimeState, services: &[ObjectId]) -> Self {
        let mut summary = Self::default();
        let mut seen: Vec<ObjectId> = Vec::new();
        for service in services.iter().filter_map(|id| state.get(*id)) {
            let host = service.get("host").and_then(Field::as_record);
            let host_status = host.and_then(|id| state.get(id)).and_then(|h| status_of(state, h));
            if let Some(host) = host.filter(|id| !seen.contains(id)) {
                seen.push(host);
                summary.count_host(host_status);
            }
            summary.count_service(status_of(state, service), is_up(host_status));
        }
        summary
    }

    /// Summarize the members of the hostgroup or servicegroup `name`.
    ///
    /// `None` when the group does not exist or `kind` is not a host or
    /// service group.
    pub fn for_group(state: &RuntimeState, kind: &str, name: &str) -> Option<Self> {
        state.lookup(kind, name)?;
        match kind {
            "hostgroup" => Some(Self::collect(state, &members(state, "host", name))),
            "servicegroup" => Some(Self::collect_services(state, &members(state, "service", name))),
            _ => None,
        }
    }

    /// One summary per group of `target`, hostgroups before servicegroups.
    pub fn by_group(state: &RuntimeState, target: Target) -> Vec<GroupSummary> {
        target
            .kinds()
            .iter()
            .flat_map(|kind| {
                state.keys(kind).into_iter().filter_map(move |name| {
                    Some(GroupSummary {
                        kind: kind.to_string(),
                        name: name.to_string(),
                        summary: Self::for_group(state, kind, name)?,
                    })
                })
            })
            .collect()
    }

    pub fn hosts_total(&self) -> usize {
        self.hosts_up
            + self.hosts_down_handled
            + self.hosts_down_unhandled
            + self.hosts_unreachable_handled
            + self.hosts_unreachable_unhandled
            + self.hosts_pending
    }

    pub fn services_total(&self) -> usize {
        self.services_ok
            + self.services_warning_handled
            + self.services_warning_unhandled
            + self.services_critical_handled
            + self.services_critical_unhandled
            + self.services_unknown_handled
            + self.services_unknown_unhandled
            + self.services_pending
    }

    fn count_host(&mut self, status: Option<&MonitoredObject>) {
        let Some(status) = status.filter(|s| is_checked(s)) else {
            self.hosts_pending += 1;
            return;
        };
        let handled = is_handled(status);
        let slot = match (status.text("current_state"), handled) {
            (Some(HOST_UP), _) => &mut self.hosts_up,
            (Some(HOST_DOWN), true) => &mut self.hosts_down_handled,
            (Some(HOST_DOWN), false) => &mut self.hosts_down_unhandled,
            (Some(HOST_UNREACHABLE), true) => &mut self.hosts_unreachable_handled,
            (Some(HOST_UNREACHABLE), false) => &mut self.hosts_unreachable_unhandled,
            (other, _) => {
                tracing::debug!(state = ?other, "skipping host with unknown state");
                return;
            }
        };
        *slot += 1;
    }

    fn count_service(&mut self, status: Option<&MonitoredObject>, host_up: bool) {
        let Some(status) = status.filter(|s| is_checked(s)) else {
            self.services_pending += 1;
            return;
        };
        let handled = !host_up || is_handled(status);
        let slot = match (status.text("current_state"), handled) {
            (Some(SERVICE_OK), _) => &mut self.services_ok,
            (Some(SERVICE_WARNING), true) => &mut self.services_warning_handled,
            (Some(SERVICE_WARNING), false) => &mut self.services_warning_unhandled,
            (Some(SERVICE_CRITICAL), true) => &mut self.services_critical_handled,
            (Some(SERVICE_CRITICAL), false) => &mut self.services_critical_unhandled,
            (Some(SERVICE_UNKNOWN), true) => &mut self.services_unknown_handled,
            (Some(SERVICE_UNKNOWN), false) => &mut self.services_unknown_unhandled,
            (other, _) => {
                tracing::debug!(state = ?other, "skipping service with unknown state");
                return;
            }
        };
        *slot += 1;
    }
}

fn status_of<'a>(state: &'a RuntimeState, object: &MonitoredObject) -> Option<&'a MonitoredObject> {
    object.get("status").and_then(Field::as_record).and_then(|id| state.get(id))
}

fn linked_services<'a>(state: &'a RuntimeState, host: &MonitoredObject) -> impl Iterator<Item = &'a MonitoredObject> {
    let services: Vec<ObjectId> = match host.get("services") {
        Some(Field::List(items)) => items.iter().filter_map(Field::as_record).collect(),
        Some(Field::Record(id)) => vec![*id],
        _ => Vec::new(),
    };
    services.into_iter().filter_map(move |id| state.get(id))
}

/// Objects of `kind` whose `group` list names `group`.
fn members(state: &RuntimeState, kind: &str, group: &str) -> Vec<ObjectId> {
    state
        .ids(kind)
        .into_iter()
        .filter(|id| {
            let groups = state.get(*id).and_then(|o| o.get("group"));
            match groups {
                Some(Field::List(items)) => items.iter().any(|g| g.as_text() == Some(group)),
                Some(field) => field.as_text() == Some(group),
                None => false,
            }
        })
        .collect()
}

fn is_up(status: Option<&MonitoredObject>) -> bool {
    status.is_some_and(|s| s.text("current_state") == Some(HOST_UP))
}

fn is_checked(status: &MonitoredObject) -> bool {
    status.text("has_been_checked") == Some("1")
}

fn is_handled(status: &MonitoredObject) -> bool {
    let acknowledged = status.text("problem_has_been_acknowledged") == Some("1");
    let in_downtime = status
        .text("scheduled_downtime_depth")
        .and_then(|depth| depth.trim().parse::<u32>().ok())
        .is_some_and(|depth| depth > 0);
    acknowledged || in_downtime
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
