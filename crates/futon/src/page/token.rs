//! Cursor token codec.
//!
//! This module owns the opaque wire-token format used for page cursors:
//! a shorthand JSON payload, hex-armored so tokens survive URLs and query
//! strings. It contains only token encoding/decoding and no paging
//! semantics.

use crate::{direction::Direction, page::cursor::PageCursor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt::Write as _, num::NonZeroUsize};
use thiserror::Error as ThisError;

// Defensive decode bound for untrusted cursor token input.
const MAX_CURSOR_TOKEN_HEX_LEN: usize = 4 * 1024;

///
/// CursorTokenError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum CursorTokenError {
    #[error("cursor token failed to encode: {0}")]
    Encode(String),

    #[error("cursor token is empty")]
    Empty,

    #[error("cursor token exceeds max length: {len} hex chars (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("cursor token must have an even number of hex characters")]
    OddLength,

    #[error("invalid hex character at position {position}")]
    InvalidHex { position: usize },

    #[error("cursor token payload is not a valid cursor: {reason}")]
    Payload { reason: String },
}

///
/// CursorWire
/// Shorthand payload fields keep tokens short: key, doc id, size, page,
/// back flag.
///

#[derive(Debug, Deserialize, Serialize)]
struct CursorWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    k: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    d: Option<String>,
    s: NonZeroUsize,
    p: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    b: bool,
}

fn is_false(flag: &bool) -> bool {
    !flag
}

pub(super) fn encode_token(cursor: &PageCursor) -> Result<String, CursorTokenError> {
    let wire = CursorWire {
        k: cursor.key().cloned(),
        d: cursor.doc_id().map(ToString::to_string),
        s: cursor.page_size(),
        p: cursor.page_number(),
        b: cursor.direction().is_backward(),
    };
    let bytes = serde_json::to_vec(&wire).map_err(|err| CursorTokenError::Encode(err.to_string()))?;

    Ok(encode_hex(&bytes))
}

pub(super) fn decode_token(input: &str) -> Result<PageCursor, CursorTokenError> {
    let bytes = decode_hex(input)?;
    let wire: CursorWire =
        serde_json::from_slice(&bytes).map_err(|err| CursorTokenError::Payload {
            reason: err.to_string(),
        })?;

    if wire.p == 0 {
        if wire.k.is_some() || wire.d.is_some() {
            return Err(CursorTokenError::Payload {
                reason: "page 0 cursor must not carry an anchor".to_string(),
            });
        }
        if wire.b {
            return Err(CursorTokenError::Payload {
                reason: "page 0 cursor must run forward".to_string(),
            });
        }

        return Ok(PageCursor::first_page(wire.s));
    }

    // A serialized anchor key of JSON null round-trips through the absent
    // field; pages past 0 always have an anchor, so restore it here.
    Ok(PageCursor {
        key: Some(wire.k.unwrap_or(Value::Null)),
        doc_id: wire.d,
        page_size: wire.s,
        page_number: wire.p,
        direction: if wire.b {
            Direction::Backward
        } else {
            Direction::Forward
        },
    })
}

/// Encode raw payload bytes as a lowercase hex token.
fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Decode a lowercase/uppercase hex token into raw payload bytes.
///
/// The token may include surrounding whitespace, which is trimmed.
fn decode_hex(token: &str) -> Result<Vec<u8>, CursorTokenError> {
    let token = token.trim();

    if token.is_empty() {
        return Err(CursorTokenError::Empty);
    }

    if token.len() > MAX_CURSOR_TOKEN_HEX_LEN {
        return Err(CursorTokenError::TooLong {
            len: token.len(),
            max: MAX_CURSOR_TOKEN_HEX_LEN,
        });
    }

    if token.len() % 2 != 0 {
        return Err(CursorTokenError::OddLength);
    }

    let mut out = Vec::with_capacity(token.len() / 2);
    let bytes = token.as_bytes();

    for idx in (0..bytes.len()).step_by(2) {
        let hi = decode_hex_nibble(bytes[idx])
            .ok_or(CursorTokenError::InvalidHex { position: idx + 1 })?;

        let lo = decode_hex_nibble(bytes[idx + 1])
            .ok_or(CursorTokenError::InvalidHex { position: idx + 2 })?;

        out.push((hi << 4) | lo);
    }

    Ok(out)
}

const fn decode_hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

///
/// TESTS
///
