// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the statusdat unit tests.
//!
//! Hosts: `web1` up, `web2` down and acknowledged, `db1` down, `router`
//! unreachable in downtime, `pending1` never checked.

use std::path::{Path, PathBuf};

use crate::model::RuntimeState;
use crate::parser::Parser;

pub const OBJECTS: &str = "\
# objects.cache fixture
define host {
\thost_name\tweb1
\talias\tWeb server 1
\taddress\t10.0.0.1
}

define host {
\thost_name\tweb2
\talias\tWeb server 2
\taddress\t10.0.0.2
}

define host {
\thost_name\tdb1
\talias\tDatabase
\taddress\t10.0.0.10
}

define host {
\thost_name\trouter
\talias\tCore router
\taddress\t10.0.0.254
}

define host {
\thost_name\tpending1
\talias\tNew host
\taddress\t10.0.0.99
}

define service {
\thost_name\tweb1
\tservice_description\tHTTP
}

define service {
\thost_name\tweb1
\tservice_description\tDisk
}

define service {
\thost_name\tweb1
\tservice_description\tLoad
}

define service {
\thost_name\tweb1
\tservice_description\tUsers
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
\thost_name\tpending1
\tservice_description\tPING
}

define hostgroup {
\thostgroup_name\tweb
\talias\tWeb servers
\tmembers\tweb1,web2
}

define hostgroup {
\thostgroup_name\tdatabase
\talias\tDatabases
\tmembers\tdb1
}

define servicegroup {
\tservicegroup_name\thttp
\talias\tHTTP checks
\tmembers\tweb1,HTTP,web2,HTTP
}

define contact {
\tcontact_name\tadmin
\temail\tadmin@example.com
}

define contactgroup {
\tcontactgroup_name\tadmins
\tmembers\tadmin
}
";

pub const STATUS: &str = "\
info {
\tversion=1.13.3
}

programstatus {
\tpid=4242
}

hoststatus {
\thost_name=web1
\thas_been_checked=1
\tcurrent_state=0
\tproblem_has_been_acknowledged=0
\tscheduled_downtime_depth=0
}

hoststatus {
\thost_name=web2
\thas_been_checked=1
\tcurrent_state=1
\tproblem_has_been_acknowledged=1
\tscheduled_downtime_depth=0
}

hoststatus {
\thost_name=db1
\thas_been_checked=1
\tcurrent_state=1
\tproblem_has_been_acknowledged=0
\tscheduled_downtime_depth=0
}

hoststatus {
\thost_name=router
\thas_been_checked=1
\tcurrent_state=2
\tproblem_has_been_acknowledged=0
\tscheduled_downtime_depth=1
}

hoststatus {
\thost_name=pending1
\thas_been_checked=0
\tcurrent_state=0
}

servicestatus {
\thost_name=web1
\tservice_description=HTTP
\thas_been_checked=1
\tcurrent_state=0
}

servicestatus {
\thost_name=web1
\tservice_description=Disk
\thas_been_checked=1
\tcurrent_state=1
\tproblem_has_been_acknowledged=0
\tscheduled_downtime_depth=0
}

servicestatus {
\thost_name=web1
\tservice_description=Load
\thas_been_checked=1
\tcurrent_state=2
\tproblem_has_been_acknowledged=0
\tscheduled_downtime_depth=1
}

servicestatus {
\thost_name=web1
\tservice_description=Users
\thas_been_checked=1
\tcurrent_state=2
\tproblem_has_been_acknowledged=0
\tscheduled_downtime_depth=0
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
\tcurrent_state=3
\tproblem_has_been_acknowledged=0
\tscheduled_downtime_depth=0
}

servicestatus {
\thost_name=pending1
\tservice_description=PING
\thas_been_checked=0
\tcurrent_state=0
}

hostcomment {
\thost_name=web2
\tcomment_id=1
\tauthor=alice
\tcomment_data=Investigating
}

servicecomment {
\thost_name=web1
\tservice_description=Disk
\tcomment_id=2
\tauthor=bob
\tcomment_data=Cleanup scheduled
}

hostdowntime {
\thost_name=router
\tdowntime_id=1
\tauthor=carol
\tcomment=Firmware upgrade
}

servicedowntime {
\thost_name=web1
\tservice_description=Load
\tdowntime_id=2
\tauthor=carol
\tcomment=Batch window
}
";

/// Parsed and linked fixture state.
pub fn state() -> RuntimeState {
    let mut parser = Parser::new();
    parser.parse_objects_file(OBJECTS.as_bytes()).unwrap();
    parser.parse_runtime_state(STATUS.as_bytes()).unwrap();
    let mut state = parser.into_state();
    state.link_services();
    state
}

/// Write the fixture files into `dir`, returning `(objects, status)`.
pub fn write_files(dir: &Path) -> (PathBuf, PathBuf) {
    let objects = dir.join("objects.cache");
    let status = dir.join("status.dat");
    std::fs::write(&objects, OBJECTS).unwrap();
    std::fs::write(&status, STATUS).unwrap();
    (objects, status)
}

/// Route `tracing` output to the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
