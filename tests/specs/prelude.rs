//! Shared helpers for the workspace specs.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

pub use mon_core::{BackendConfig, BackendsConfig, LivestatusConfig, StatusdatConfig};
pub use mon_livestatus::{Connection, ConnectionError, Query};
pub use mon_statusdat::{GroupSummary, QueryResult, Reader, ReaderError, StatusSummary, Target};

// ── Fake Livestatus ─────────────────────────────────────────────────────────

/// Host table served by [`FakeLivestatus`].
pub const HOST_COLUMNS: &[&str] = &["name", "state", "address"];

pub fn host_rows() -> Vec<Value> {
    vec![
        json!(["web10", 0, "10.0.0.10"]),
        json!(["web2", 1, "10.0.0.2"]),
        json!(["db1", 2, "10.0.1.1"]),
        json!(["Web1", 0, "10.0.0.1"]),
        json!(["mail", 0, "10.0.2.1"]),
    ]
}

/// A Livestatus server on a UNIX socket in a temp dir.
///
/// Serves the `hosts` table from [`host_rows`], honoring `Columns:`,
/// equality `Filter:` lines, `Stats:` and `Limit:`. Any other table gets a
/// 404 like the real thing.
pub struct FakeLivestatus {
    _dir: TempDir,
    path: PathBuf,
    requests: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
}

impl FakeLivestatus {
    pub fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live");
        let listener = UnixListener::bind(&path).unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let (log, count) = (Arc::clone(&requests), Arc::clone(&connections));
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                count.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(stream, Arc::clone(&log)));
            }
        });

        Self { _dir: dir, path, requests, connections }
    }

    pub fn socket(&self) -> String {
        self.path.display().to_string()
    }

    pub fn connect(&self) -> Connection {
        Connection::new(&self.socket()).unwrap()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

async fn serve(stream: UnixStream, log: Arc<Mutex<Vec<String>>>) {
    let mut stream = BufReader::new(stream);
    loop {
        let mut request = String::new();
        loop {
            let mut line = String::new();
            match stream.read_line(&mut line).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
            request.push_str(&line);
            if line == "\n" {
                break;
            }
        }
        let (status, body) = answer(&request);
        log.lock().unwrap().push(request);
        let response = mon_wire::encode_response(status, body.as_bytes()).unwrap();
        if stream.get_mut().write_all(&response).await.is_err() {
            return;
        }
    }
}

fn answer(request: &str) -> (u16, String) {
    let mut lines = request.lines();
    let table = lines.next().and_then(|l| l.strip_prefix("GET ")).unwrap_or_default();
    if table != "hosts" {
        return (404, format!("Invalid GET request, no such table '{table}'\n"));
    }

    let mut columns: Vec<usize> = (0..HOST_COLUMNS.len()).collect();
    let mut headers = true;
    let mut stats = false;
    let mut limit = usize::MAX;
    let mut rows = host_rows();
    for line in lines {
        if let Some(names) = line.strip_prefix("Columns: ") {
            columns = names.split(' ').filter_map(|n| HOST_COLUMNS.iter().position(|c| *c == n)).collect();
            headers = false;
        } else if let Some(filter) = line.strip_prefix("Filter: ") {
            if let Some((column, value)) = filter.split_once(" = ") {
                if let Some(index) = HOST_COLUMNS.iter().position(|c| *c == column) {
                    rows.retain(|row| match &row[index] {
                        Value::String(s) => s == value,
                        other => other.to_string() == value,
                    });
                }
            }
        } else if line.starts_with("Stats: ") {
            stats = true;
        } else if let Some(n) = line.strip_prefix("Limit: ") {
            limit = n.parse().unwrap();
        }
    }

    if stats {
        return (200, json!([[rows.len()]]).to_string());
    }
    let mut table: Vec<Value> = Vec::new();
    if headers {
        table.push(json!(columns.iter().map(|i| HOST_COLUMNS[*i]).collect::<Vec<_>>()));
    }
    table.extend(
        rows.into_iter().take(limit).map(|row| Value::Array(columns.iter().map(|i| row[*i].clone()).collect())),
    );
    (200, Value::Array(table).to_string())
}

// ── Statusdat fixtures ──────────────────────────────────────────────────────

pub const OBJECTS: &str = "\
define host {
\thost_name\tweb1
\talias\tWeb 1
}
define host {
\thost_name\tweb2
\talias\tWeb 2
}
define host {
\thost_name\tdb1
\talias\tDatabase
}
define service {
\thost_name\tweb1
\tservice_description\tHTTP
}
define service {
\thost_name\tweb2
\tservice_description\tHTTP
}
define service {
\thost_name\tdb1
\tservice_description\tMySQL
}
define service {
\thost_name\tdb1
\tservice_description\tDisk
}
define hostgroup {
\thostgroup_name\tweb
\tmembers\tweb1,web2
}
define servicegroup {
\tservicegroup_name\tdatabases
\tmembers\tdb1,MySQL
}
";

pub const STATUS: &str = "\
hoststatus {
\thost_name=web1
\thas_been_checked=1
\tcurrent_state=0
}
hoststatus {
\thost_name=web2
\thas_been_checked=1
\tcurrent_state=0
}
hoststatus {
\thost_name=db1
\thas_been_checked=1
\tcurrent_state=1
\tproblem_has_been_acknowledged=0
\tscheduled_downtime_depth=0
}
servicestatus {
\thost_name=web1
\tservice_description=HTTP
\thas_been_checked=1
\tcurrent_state=0
}
servicestatus {
\thost_name=web2
\tservice_description=HTTP
\thas_been_checked=1
\tcurrent_state=2
\tproblem_has_been_acknowledged=0
\tscheduled_downtime_depth=0
}
servicestatus {
\thost_name=db1
\tservice_description=MySQL
\thas_been_checked=1
\tcurrent_state=2
}
servicestatus {
\thost_name=db1
\tservice_description=Disk
\thas_been_checked=0
\tcurrent_state=0
}
servicecomment {
\thost_name=web2
\tservice_description=HTTP
\tcomment_id=7
\tauthor=ops
\tcomment_data=Looking into it
}
";

/// Objects and status files in a temp dir, plus a cache dir beside them.
pub struct StatusdatFiles {
    dir: TempDir,
    pub objects: PathBuf,
    pub status: PathBuf,
}

impl StatusdatFiles {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let objects = dir.path().join("objects.cache");
        let status = dir.path().join("status.dat");
        std::fs::write(&objects, OBJECTS).unwrap();
        std::fs::write(&status, STATUS).unwrap();
        Self { dir, objects, status }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    /// Backend configuration as it would appear in a config file.
    pub fn toml(&self) -> String {
        format!(
            "[backends.local]\ntype = \"statusdat\"\nobjects_file = {:?}\nstatus_file = {:?}\ncache_path = {:?}\n",
            self.objects.display().to_string(),
            self.status.display().to_string(),
            self.cache_dir().display().to_string(),
        )
    }

    pub fn config(&self) -> StatusdatConfig {
        match BackendsConfig::from_toml(&self.toml()).unwrap().get("local") {
            Some(BackendConfig::Statusdat(config)) => config.clone(),
            other => panic!("expected statusdat backend, got {other:?}"),
        }
    }

    pub fn reader(&self) -> Reader {
        Reader::new(self.config()).unwrap()
    }

    /// Rewrite the status file and move its mtime forward.
    pub fn rewrite_status(&self, content: &str) {
        std::fs::write(&self.status, content).unwrap();
        let file = std::fs::OpenOptions::new().write(true).open(&self.status).unwrap();
        file.set_modified(std::time::SystemTime::now() + std::time::Duration::from_secs(60)).unwrap();
    }
}
