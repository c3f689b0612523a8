// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent Livestatus socket client.
//!
//! Connects lazily on the first query and keeps the socket open across
//! queries (`KeepAlive: on`). Every connect, write and read is bounded by the
//! configured deadline.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use mon_core::LivestatusConfig;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};

use crate::error::{ConnectionError, QueryError};
use crate::query::Query;
use crate::result::{post_process, rows_from_table, Row};

/// Where the Livestatus socket lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Unix(PathBuf),
    Tcp { host: String, port: u16 },
}

impl Address {
    /// Parse `/absolute/path` or `tcp://host:port`. IPv6 hosts are
    /// bracketed: `tcp://[::1]:6557`.
    pub fn parse(socket: &str) -> Result<Self, ConnectionError> {
        if socket.starts_with('/') {
            return Ok(Address::Unix(PathBuf::from(socket)));
        }
        let invalid = || ConnectionError::Configuration(socket.to_string());
        let rest = socket.strip_prefix("tcp://").ok_or_else(invalid)?;
        let (host, port) = rest.rsplit_once(':').ok_or_else(invalid)?;
        let host = match host.strip_prefix('[') {
            Some(inner) => inner.strip_suffix(']').ok_or_else(invalid)?,
            None if host.contains([':', ']']) => return Err(invalid()),
            None => host,
        };
        if host.is_empty() || port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let port = port.parse().map_err(|_| invalid())?;
        Ok(Address::Tcp { host: host.to_string(), port })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Unix(path) => write!(f, "{}", path.display()),
            Address::Tcp { host, port } if host.contains(':') => write!(f, "tcp://[{host}]:{port}"),
            Address::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
        }
    }
}

trait Socket: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Socket for T {}

pub struct Connection {
    address: Address,
    timeout: Duration,
    stream: Option<Box<dyn Socket>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("address", &self.address)
            .field("timeout", &self.timeout)
            .field("connected", &self.stream.is_some())
            .finish()
    }
}

impl Connection {
    pub fn new(socket: &str) -> Result<Self, ConnectionError> {
        Ok(Self { address: Address::parse(socket)?, timeout: mon_core::env::io_timeout(), stream: None })
    }

    pub fn from_config(config: &LivestatusConfig) -> Result<Self, ConnectionError> {
        Ok(Self::new(&config.socket)?.with_timeout(config.timeout()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Open the socket if it is not open yet.
    pub async fn connect(&mut self) -> Result<(), ConnectionError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let connect_error = |source| ConnectionError::Connect { address: self.address.to_string(), source };
        let stream: Box<dyn Socket> = match &self.address {
            Address::Unix(path) => {
                let stream = deadline(self.timeout, "connect", UnixStream::connect(path))
                    .await?
                    .map_err(connect_error)?;
                Box::new(stream)
            }
            Address::Tcp { host, port } => {
                let stream = deadline(self.timeout, "connect", TcpStream::connect((host.as_str(), *port)))
                    .await?
                    .map_err(connect_error)?;
                stream.set_nodelay(true)?;
                Box::new(stream)
            }
        };
        tracing::debug!(address = %self.address, "connected to livestatus");
        self.stream = Some(stream);
        Ok(())
    }

    /// Close the socket. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!(address = %self.address, "disconnected from livestatus");
        }
    }

    /// Send a query and decode the positional result table.
    pub async fn execute(&mut self, query: &Query) -> Result<Vec<Vec<Value>>, ConnectionError> {
        let request = query.render()?;
        self.connect().await?;
        let result = self.round_trip(&request).await;
        if let Err(e) = &result {
            // A failed status still consumed the full body; anything else leaves the stream unusable.
            if !matches!(e, ConnectionError::Protocol(mon_wire::ProtocolError::Status { .. })) {
                self.disconnect();
            }
            tracing::warn!(address = %self.address, error = %e, "livestatus query failed");
        }
        result
    }

    async fn round_trip(&mut self, request: &str) -> Result<Vec<Vec<Value>>, ConnectionError> {
        let timeout = self.timeout;
        let Some(stream) = self.stream.as_mut() else {
            return Err(ConnectionError::Io(std::io::ErrorKind::NotConnected.into()));
        };
        deadline(timeout, "write", mon_wire::write_query(&mut *stream, request)).await??;
        let response = deadline(timeout, "read", mon_wire::read_response(&mut *stream)).await??;
        Ok(mon_wire::decode_table(&response)?)
    }

    /// All matching rows, sorted and windowed client-side.
    pub async fn fetch_all(&mut self, query: &Query) -> Result<Vec<Row>, ConnectionError> {
        let table = self.execute(query).await?;
        let rows = rows_from_table(table, query.columns())?;
        Ok(post_process(rows, query.order_columns(), query.window()))
    }

    pub async fn fetch_row(&mut self, query: &Query) -> Result<Option<Row>, ConnectionError> {
        Ok(self.fetch_all(query).await?.into_iter().next())
    }

    /// Map each row's first column to its second.
    pub async fn fetch_pairs(&mut self, query: &Query) -> Result<IndexMap<String, Value>, ConnectionError> {
        if let Some(columns) = query.columns() {
            if columns.len() < 2 {
                return Err(QueryError::MissingColumns { needed: 2, got: columns.len() }.into());
            }
        }
        let mut pairs = IndexMap::new();
        for row in self.fetch_all(query).await? {
            let mut values = row.into_values();
            match (values.next(), values.next()) {
                (Some(key), Some(value)) => {
                    let key = match key {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    pairs.insert(key, value);
                }
                (first, _) => {
                    let got = usize::from(first.is_some());
                    return Err(QueryError::MissingColumns { needed: 2, got }.into());
                }
            }
        }
        Ok(pairs)
    }

    /// Number of rows matching the query's filters, ignoring its window.
    pub async fn count(&mut self, query: &Query) -> Result<u64, ConnectionError> {
        let table = self.execute(&query.count_query()).await?;
        let value = table.first().and_then(|row| row.first());
        value.and_then(Value::as_u64).ok_or_else(|| {
            mon_wire::ProtocolError::Shape(format!("expected a single count, got {table:?}")).into()
        })
    }
}

/// Bound a socket step by the connection deadline.
async fn deadline<F: Future>(
    timeout: Duration,
    operation: &'static str,
    future: F,
) -> Result<F::Output, ConnectionError> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| ConnectionError::Timeout { operation, after: timeout })
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
