// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::str::FromStr;

use crate::error::QueryError;

mon_core::keyword_enum! {
    /// Tables Livestatus serves.
    pub enum Table {
        Hosts => "hosts",
        Services => "services",
        HostGroups => "hostgroups",
        ServiceGroups => "servicegroups",
        ContactGroups => "contactgroups",
        ServicesByGroup => "servicesbygroup",
        ServicesByHostGroup => "servicesbyhostgroup",
        HostsByGroup => "hostsbygroup",
        Contacts => "contacts",
        Commands => "commands",
        TimePeriods => "timeperiods",
        Downtimes => "downtimes",
        Comments => "comments",
        Log => "log",
        Status => "status",
        Columns => "columns",
        StateHist => "statehist",
    }
}

impl FromStr for Table {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::parse_keyword(s).ok_or_else(|| QueryError::UnknownTable(s.to_string()))
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
