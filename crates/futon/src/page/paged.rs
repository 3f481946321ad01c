//! Module: page::paged
//! Responsibility: the page payload handed back to callers.
//! Does not own: query execution or cursor construction.

use crate::{page::cursor::PageCursor, view::ViewRow};
use derive_more::{Deref, IntoIterator};
use std::num::NonZeroUsize;

///
/// Rows
///
/// Ordered, page-size-bounded row window, always in canonical forward
/// order regardless of the direction the page was fetched in.
///

#[derive(Debug, Deref, IntoIterator, PartialEq)]
pub struct Rows<T>(#[into_iterator(owned, ref)] Vec<ViewRow<T>>);

///
/// Page
///
/// One page of a pagination session. `next` is present iff further rows
/// exist in the forward direction; `previous` is present iff this is not
/// the first page. Ownership passes to the caller; the engine keeps
/// nothing.
///

#[derive(Debug, PartialEq)]
pub struct Page<T> {
    rows: Rows<T>,
    total_rows: u64,
    page_size: NonZeroUsize,
    previous: Option<PageCursor>,
    next: Option<PageCursor>,
}

impl<T> Page<T> {
    pub(crate) const fn new(
        rows: Vec<ViewRow<T>>,
        total_rows: u64,
        page_size: NonZeroUsize,
        previous: Option<PageCursor>,
        next: Option<PageCursor>,
    ) -> Self {
        Self {
            rows: Rows(rows),
            total_rows,
            page_size,
            previous,
            next,
        }
    }

    #[must_use]
    pub const fn rows(&self) -> &Rows<T> {
        &self.rows
    }

    /// Total row count reported by the remote store, fixed per query.
    #[must_use]
    pub const fn total_rows(&self) -> u64 {
        self.total_rows
    }

    #[must_use]
    pub const fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    #[must_use]
    pub const fn next_cursor(&self) -> Option<&PageCursor> {
        self.next.as_ref()
    }

    #[must_use]
    pub const fn previous_cursor(&self) -> Option<&PageCursor> {
        self.previous.as_ref()
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.0.is_empty()
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<ViewRow<T>> {
        self.rows.0
    }

    #[must_use]
    pub fn into_values(self) -> Vec<T> {
        self.rows.0.into_iter().map(ViewRow::into_value).collect()
    }

    /// Consume this page and return `(rows, previous, next)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ViewRow<T>>, Option<PageCursor>, Option<PageCursor>) {
        (self.rows.0, self.previous, self.next)
    }
}
