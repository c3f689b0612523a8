// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query writing and response reading over any async stream.

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::header::{ResponseHeader, HEADER_LEN};

/// Errors that can occur while framing or decoding a response
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid response header: {0:?}")]
    InvalidHeader(String),

    #[error("livestatus returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("connection closed after {received} of 16 header bytes")]
    ShortHeader { received: usize },

    #[error("short read: expected {expected} body bytes, received {received}")]
    ShortRead { expected: usize, received: usize },

    #[error("status {0} does not fit in three digits")]
    StatusOutOfRange(u16),

    #[error("body of {0} bytes does not fit in the length column")]
    BodyTooLarge(usize),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A complete response: header status plus the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        ResponseHeader::new(self.status, self.body.len()).is_ok()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Write a rendered query and flush.
pub async fn write_query<W: AsyncWrite + Unpin>(
    writer: &mut W,
    query: &str,
) -> Result<(), ProtocolError> {
    writer.write_all(query.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed response: exactly [`HEADER_LEN`] header bytes, then exactly
/// `length` body bytes.
pub async fn read_response<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Response, ProtocolError> {
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            return Err(ProtocolError::ShortHeader { received: filled });
        }
        filled += n;
    }
    let header = ResponseHeader::decode(&header)?;

    let mut body = Vec::with_capacity(header.length.min(1 << 20));
    (&mut *reader).take(header.length as u64).read_to_end(&mut body).await?;
    if body.len() != header.length {
        return Err(ProtocolError::ShortRead { expected: header.length, received: body.len() });
    }

    Ok(Response { status: header.status, body })
}

/// Frame a response body behind its header.
pub fn encode_response(status: u16, body: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let header = ResponseHeader::new(status, body.len()).encode()?;
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&header);
    out.extend_from_slice(body);
    Ok(out)
}

/// Decode a successful response body into rows of positional values.
///
/// Non-200 responses become [`ProtocolError::Status`] carrying the body text.
pub fn decode_table(response: &Response) -> Result<Vec<Vec<Value>>, ProtocolError> {
    if !response.is_ok() {
        return Err(ProtocolError::Status {
            status: response.status,
            message: response.body_text().trim_end().to_string(),
        });
    }

    match serde_json::from_slice::<Value>(&response.body)? {
        Value::Array(rows) => rows
            .into_iter()
            .map(|row| match row {
                Value::Array(values) => Ok(values),
                other => Err(ProtocolError::Shape(format!("expected row array, got {other}"))),
            })
            .collect(),
        other => Err(ProtocolError::Shape(format!("expected array of rows, got {other}"))),
    }
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
