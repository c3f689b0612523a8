//! Statusdat query specs
//!
//! Filters, ordering, grouping and projection over files read from disk.

use mon_statusdat::{Operand, Row};

use crate::prelude::*;

fn column<'r>(rows: &'r [Row], name: &str) -> Vec<&'r str> {
    rows.iter().filter_map(|row| row.get(name).map(String::as_str)).collect()
}

#[test]
fn critical_services_sorted_by_host() {
    let files = StatusdatFiles::new();
    let reader = files.reader();
    let mut query = reader.select();
    query
        .from("services", Some(&["host_name", "service_description"]))
        .unwrap()
        .filter("status.current_state = ?", vec![Operand::from(2)])
        .unwrap()
        .order("host_name");

    let rows = query.fetch_all().unwrap();

    similar_asserts::assert_eq!(column(&rows, "host_name"), vec!["db1", "web2"]);
    similar_asserts::assert_eq!(column(&rows, "service_description"), vec!["MySQL", "HTTP"]);
}

#[test]
fn filter_follows_host_link() {
    let files = StatusdatFiles::new();
    let reader = files.reader();
    let mut query = reader.select();
    query
        .from("services", Some(&["service_description"]))
        .unwrap()
        .filter("host.status.current_state > ?", vec![Operand::from(0)])
        .unwrap()
        .order("service_description");

    let rows = query.fetch_all().unwrap();

    assert_eq!(column(&rows, "service_description"), ["Disk", "MySQL"]);
}

#[test]
fn hostgroup_membership_filter() {
    let files = StatusdatFiles::new();
    let reader = files.reader();
    let mut query = reader.select();
    query.from("hosts", Some(&["host_name"])).unwrap().filter("group = ?", vec![Operand::from("web")]).unwrap();

    assert_eq!(column(&query.fetch_all().unwrap(), "host_name"), ["web1", "web2"]);
}

#[test]
fn services_with_comments() {
    let files = StatusdatFiles::new();
    let reader = files.reader();
    let mut query = reader.select();
    query.from("services", Some(&["host_name"])).unwrap().filter("COUNT{comment} > 0", Vec::new()).unwrap();

    assert_eq!(column(&query.fetch_all().unwrap(), "host_name"), ["web2"]);
}

#[test]
fn comments_target_projects_comment_fields() {
    let files = StatusdatFiles::new();
    let reader = files.reader();
    let mut query = reader.select();
    query.from("comments", Some(&["comment_id", "author", "comment_data"])).unwrap();

    let row = query.fetch_row().unwrap().unwrap();

    assert_eq!(row["comment_id"], "7");
    assert_eq!(row["author"], "ops");
    assert_eq!(row["comment_data"], "Looking into it");
}

#[test]
fn group_by_state_counts_services() {
    let files = StatusdatFiles::new();
    let reader = files.reader();
    let mut query = reader.select();
    query.from("services", None).unwrap().group_by_columns(&["status.current_state"]);

    let rows = query.fetch_all().unwrap();

    similar_asserts::assert_eq!(column(&rows, "status.current_state"), vec!["0", "2"]);
    similar_asserts::assert_eq!(column(&rows, "count"), vec!["2", "2"]);
}

#[test]
fn limit_windows_rows_but_not_count() {
    let files = StatusdatFiles::new();
    let reader = files.reader();
    let mut query = reader.select();
    query.from("hosts", Some(&["host_name"])).unwrap().order("host_name").limit(1, Some(1)).unwrap();

    assert_eq!(column(&query.fetch_all().unwrap(), "host_name"), ["web1"]);
    assert_eq!(query.count().unwrap(), 3);
    assert_eq!(query.get_result().unwrap(), QueryResult::Objects(vec![reader.state().lookup("host", "web1").unwrap()]));
}

#[test]
fn pairs_map_first_column_to_second() {
    let files = StatusdatFiles::new();
    let reader = files.reader();
    let mut query = reader.select();
    query.from("hosts", Some(&["host_name", "alias"])).unwrap();

    let pairs = query.fetch_pairs().unwrap();

    assert_eq!(pairs.get("db1").map(String::as_str), Some("Database"));
    assert_eq!(pairs.len(), 3);
}

#[test]
fn host_summary_for_a_filtered_subset() {
    let files = StatusdatFiles::new();
    let reader = files.reader();
    let mut query = reader.select();
    query.from("hosts", None).unwrap().filter("host_name = ?", vec![Operand::from("db1")]).unwrap();

    let QueryResult::Objects(hosts) = query.get_result().unwrap() else {
        panic!("expected objects");
    };
    let summary = StatusSummary::collect(reader.state(), &hosts);

    assert_eq!(summary.hosts_down_unhandled, 1);
    assert_eq!(summary.hosts_total(), 1);
    assert_eq!(summary.services_critical_handled, 1);
    assert_eq!(summary.services_pending, 1);
}
