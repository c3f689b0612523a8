//! Livestatus query specs
//!
//! Sorting and offsets happen client-side; the server only ever sees a
//! `Limit:` when the result is unsorted.

use serde_json::Value;

use crate::prelude::*;

fn names(rows: &[mon_livestatus::Row]) -> Vec<&str> {
    rows.iter().filter_map(|row| row.get("name").and_then(Value::as_str)).collect()
}

#[tokio::test]
async fn sorted_window_is_applied_after_fetch() {
    let server = FakeLivestatus::start();
    let mut connection = server.connect();
    let mut query = Query::new();
    query.from("hosts", Some(&["name", "state"])).unwrap().order("name").limit(2, Some(1)).unwrap();

    let rows = connection.fetch_all(&query).await.unwrap();

    similar_asserts::assert_eq!(names(&rows), vec!["mail", "Web1"]);
    let request = server.requests().pop().unwrap();
    assert!(!request.contains("Limit:"), "{request}");
}

#[tokio::test]
async fn descending_sort() {
    let server = FakeLivestatus::start();
    let mut connection = server.connect();
    let mut query = Query::new();
    query.from("hosts", Some(&["name"])).unwrap().order("name DESC").limit(3, None).unwrap();

    let rows = connection.fetch_all(&query).await.unwrap();

    similar_asserts::assert_eq!(names(&rows), vec!["web2", "web10", "Web1"]);
}

#[tokio::test]
async fn multi_key_sort() {
    let server = FakeLivestatus::start();
    let mut connection = server.connect();
    let mut query = Query::new();
    query.from("hosts", Some(&["name", "state"])).unwrap().order("state DESC").order("name");

    let rows = connection.fetch_all(&query).await.unwrap();

    similar_asserts::assert_eq!(names(&rows), vec!["db1", "web2", "mail", "Web1", "web10"]);
}

#[tokio::test]
async fn unsorted_limit_is_sent_as_count_plus_offset() {
    let server = FakeLivestatus::start();
    let mut connection = server.connect();
    let mut query = Query::new();
    query.from("hosts", Some(&["name"])).unwrap().limit(2, Some(1)).unwrap();

    let rows = connection.fetch_all(&query).await.unwrap();

    similar_asserts::assert_eq!(names(&rows), vec!["web2", "db1"]);
    let request = server.requests().pop().unwrap();
    assert!(request.contains("Limit: 3\n"), "{request}");
}

#[tokio::test]
async fn server_receives_rendered_query_verbatim() {
    let server = FakeLivestatus::start();
    let mut connection = server.connect();
    let mut query = Query::new();
    query.from("hosts", Some(&["name", "address"])).unwrap().filter("state > 0", None).filter("search", Some("web"));

    let first = query.render().unwrap();
    assert_eq!(first, query.render().unwrap());
    connection.fetch_all(&query).await.unwrap();

    similar_asserts::assert_eq!(
        server.requests(),
        vec![concat!(
            "GET hosts\n",
            "Columns: name address\n",
            "Filter: state > 0\n",
            "Filter: host_name ~~ web\n",
            "Filter: description ~~ web\n",
            "Or: 2\n",
            "OutputFormat: json\n",
            "ResponseHeader: fixed16\n",
            "KeepAlive: on\n",
            "\n",
        )
        .to_string()]
    );
}
