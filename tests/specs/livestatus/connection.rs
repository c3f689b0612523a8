//! Livestatus connection specs
//!
//! Drive the client against a fake Livestatus server over a UNIX socket and
//! over TCP, checking framing, keep-alive and error handling.

use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::prelude::*;

#[tokio::test]
async fn socket_stays_open_across_queries() {
    let server = FakeLivestatus::start();
    let mut connection = server.connect();

    let mut query = Query::new();
    query.from("hosts", Some(&["name", "state"])).unwrap();
    for _ in 0..3 {
        assert_eq!(connection.fetch_all(&query).await.unwrap().len(), 5);
    }

    assert_eq!(server.connections(), 1);
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn reconnects_after_disconnect() {
    let server = FakeLivestatus::start();
    let mut connection = server.connect();
    let mut query = Query::new();
    query.from("hosts", Some(&["name"])).unwrap();

    connection.fetch_all(&query).await.unwrap();
    connection.disconnect();
    assert!(!connection.is_connected());
    connection.fetch_all(&query).await.unwrap();

    assert_eq!(server.connections(), 2);
}

#[tokio::test]
async fn rows_without_columns_use_header_row() {
    let server = FakeLivestatus::start();
    let mut connection = server.connect();
    let mut query = Query::new();
    query.from("hosts", None).unwrap().filter("name", Some("db1"));

    let row = connection.fetch_row(&query).await.unwrap().unwrap();

    assert_eq!(row.keys().collect::<Vec<_>>(), ["name", "state", "address"]);
    assert_eq!(row["address"], json!("10.0.1.1"));
}

#[tokio::test]
async fn count_ignores_projection_and_window() {
    let server = FakeLivestatus::start();
    let mut connection = server.connect();
    let mut query = Query::new();
    query.from("hosts", Some(&["name"])).unwrap().filter("state", Some("0")).limit(1, None).unwrap();

    assert_eq!(connection.count(&query).await.unwrap(), 3);

    let request = server.requests().pop().unwrap();
    assert!(request.contains("Stats: state >= 0\n"), "{request}");
    assert!(!request.contains("Columns:"), "{request}");
    assert!(!request.contains("Limit:"), "{request}");
}

#[tokio::test]
async fn unknown_table_status_keeps_connection() {
    let server = FakeLivestatus::start();
    let mut connection = server.connect();
    let mut query = Query::new();
    query.from("services", Some(&["description"])).unwrap();

    let err = connection.fetch_all(&query).await.unwrap_err();
    match err {
        ConnectionError::Protocol(mon_wire::ProtocolError::Status { status, message }) => {
            assert_eq!(status, 404);
            assert!(message.contains("services"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(connection.is_connected());

    query.from("hosts", Some(&["name"])).unwrap();
    assert_eq!(connection.fetch_all(&query).await.unwrap().len(), 5);
    assert_eq!(server.connections(), 1);
}

#[tokio::test]
async fn connects_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        while !request.ends_with(b"\n\n") {
            let mut chunk = [0u8; 256];
            let n = stream.read(&mut chunk).await.unwrap();
            request.extend_from_slice(&chunk[..n]);
        }
        let body = json!([["web1", 0]]).to_string();
        stream.write_all(&mon_wire::encode_response(200, body.as_bytes()).unwrap()).await.unwrap();
        String::from_utf8(request).unwrap()
    });

    let config = LivestatusConfig { socket: format!("tcp://127.0.0.1:{port}"), timeout_ms: Some(2_000) };
    let mut connection = Connection::from_config(&config).unwrap();
    let mut query = Query::new();
    query.from("hosts", Some(&["name", "state"])).unwrap();

    let rows = connection.fetch_all(&query).await.unwrap();
    assert_eq!(rows[0]["name"], json!("web1"));
    assert!(server.await.unwrap().starts_with("GET hosts\nColumns: name state\n"));
}

#[tokio::test]
async fn server_that_hangs_up_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("live");
    let listener = tokio::net::UnixListener::bind(&path).unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let mut connection = Connection::new(path.to_str().unwrap()).unwrap().with_timeout(Duration::from_secs(2));
    let mut query = Query::new();
    query.from("hosts", Some(&["name"])).unwrap();

    let err = connection.fetch_all(&query).await.unwrap_err();
    assert!(
        matches!(
            err,
            ConnectionError::Protocol(mon_wire::ProtocolError::ShortHeader { received: 0 })
                | ConnectionError::Protocol(mon_wire::ProtocolError::Io(_))
        ),
        "{err:?}"
    );
    assert!(!connection.is_connected());
}

#[tokio::test]
async fn backend_config_selects_socket() {
    let server = FakeLivestatus::start();
    let toml = format!("[backends.live]\ntype = \"livestatus\"\nsocket = {:?}\ntimeout_ms = 1500\n", server.socket());
    let config = match BackendsConfig::from_toml(&toml).unwrap().get("live") {
        Some(BackendConfig::Livestatus(config)) => config.clone(),
        other => panic!("expected livestatus backend, got {other:?}"),
    };
    assert_eq!(config.timeout(), Duration::from_millis(1500));

    let mut connection = Connection::from_config(&config).unwrap();
    let mut query = Query::new();
    query.from("hosts", Some(&["name", "address"])).unwrap();
    let pairs = connection.fetch_pairs(&query).await.unwrap();
    assert_eq!(pairs.get("mail"), Some(&json!("10.0.2.1")));
}
