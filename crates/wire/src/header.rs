// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `ResponseHeader: fixed16` header.

use crate::wire::ProtocolError;

/// Size of the response header in bytes
pub const HEADER_LEN: usize = 16;

/// Status code of a successful query
pub const STATUS_OK: u16 = 200;

/// Width of the length column (the header minus status, space and newline)
const LENGTH_WIDTH: usize = HEADER_LEN - 5;

/// Largest body length the length column can carry
pub const MAX_BODY_LEN: usize = 99_999_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub status: u16,
    pub length: usize,
}

impl ResponseHeader {
    pub fn new(status: u16, length: usize) -> Self {
        Self { status, length }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Render as `"200          42\n"`.
    pub fn encode(&self) -> Result<[u8; HEADER_LEN], ProtocolError> {
        if self.status > 999 {
            return Err(ProtocolError::StatusOutOfRange(self.status));
        }
        if self.length > MAX_BODY_LEN {
            return Err(ProtocolError::BodyTooLarge(self.length));
        }
        let text = format!("{:03} {:>width$}\n", self.status, self.length, width = LENGTH_WIDTH);
        let mut out = [0u8; HEADER_LEN];
        out.copy_from_slice(text.as_bytes());
        Ok(out)
    }

    /// Parse a header: three status digits, whitespace, then a decimal length
    /// padded with whitespace to the end of the 16 bytes.
    pub fn decode(bytes: &[u8; HEADER_LEN]) -> Result<Self, ProtocolError> {
        let invalid = || ProtocolError::InvalidHeader(String::from_utf8_lossy(bytes).into_owned());

        let (status, rest) = bytes.split_at(3);
        if !status.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        if !rest.first().is_some_and(u8::is_ascii_whitespace) {
            return Err(invalid());
        }
        let status = std::str::from_utf8(status)
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .ok_or_else(invalid)?;
        let length = std::str::from_utf8(rest)
            .ok()
            .map(str::trim)
            .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(invalid)?;

        Ok(Self { status, length })
    }
}

#[cfg(test)]
#[path = "header_tests.rs"]
mod tests;
