use crate::{direction::Direction, page::token, view::RowBoundary};
use serde_json::Value;
use std::num::NonZeroUsize;

///
/// PageCursor
///
/// Immutable description of where to resume a pagination session: an
/// order key, a tie-breaking document id, the session page size, the page
/// number, and a direction. Equality and the token encoding depend only
/// on these fields. Callers construct the page-0 cursor; every later
/// cursor comes out of the engine.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageCursor {
    pub(super) key: Option<Value>,
    pub(super) doc_id: Option<String>,
    pub(super) page_size: NonZeroUsize,
    pub(super) page_number: u32,
    pub(super) direction: Direction,
}

impl PageCursor {
    /// Cursor for the first page of a session. Page 0 carries no anchor
    /// and always runs forward.
    #[must_use]
    pub const fn first_page(page_size: NonZeroUsize) -> Self {
        Self {
            key: None,
            doc_id: None,
            page_size,
            page_number: 0,
            direction: Direction::Forward,
        }
    }

    /// Start building the cursor that resumes at `boundary`. Defaults to
    /// the forward cursor for the following page; direction and page
    /// number may be overridden before finalizing.
    #[must_use]
    pub fn resume_at(&self, boundary: &RowBoundary) -> CursorBuilder {
        CursorBuilder {
            key: boundary.key().clone(),
            doc_id: boundary.doc_id().map(ToString::to_string),
            page_size: self.page_size,
            page_number: self.page_number.saturating_add(1),
            direction: Direction::Forward,
        }
    }

    #[must_use]
    pub const fn key(&self) -> Option<&Value> {
        self.key.as_ref()
    }

    #[must_use]
    pub fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    #[must_use]
    pub const fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Encode this cursor as an opaque, url-safe token.
    pub fn to_token(&self) -> Result<String, token::CursorTokenError> {
        token::encode_token(self)
    }

    /// Decode a token produced by [`PageCursor::to_token`]. Input is
    /// untrusted; decoding is strict and bounded.
    pub fn from_token(input: &str) -> Result<Self, token::CursorTokenError> {
        token::decode_token(input)
    }
}

///
/// CursorBuilder
///
/// Pure builder from a boundary row to a new cursor. Never mutates an
/// existing cursor.
///

#[derive(Debug)]
pub struct CursorBuilder {
    key: Value,
    doc_id: Option<String>,
    page_size: NonZeroUsize,
    page_number: u32,
    direction: Direction,
}

impl CursorBuilder {
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn forward(self) -> Self {
        self.direction(Direction::Forward)
    }

    #[must_use]
    pub fn backward(self) -> Self {
        self.direction(Direction::Backward)
    }

    #[must_use]
    pub fn page(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    /// Finalize. Page 0 normalizes to the plain first-page cursor: there
    /// is nothing before the first page for an anchor to point at.
    #[must_use]
    pub fn build(self) -> PageCursor {
        if self.page_number == 0 {
            return PageCursor::first_page(self.page_size);
        }

        PageCursor {
            key: Some(self.key),
            doc_id: self.doc_id,
            page_size: self.page_size,
            page_number: self.page_number,
            direction: self.direction,
        }
    }
}
