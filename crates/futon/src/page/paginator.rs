use crate::{
    error::Error,
    page::{cursor::PageCursor, paged::Page},
    transport::Transport,
    view::{ViewQuery, ViewResultParser},
};
use serde::de::DeserializeOwned;
use tracing::debug;

///
/// Paginator
///
/// Keyset pagination engine over a sorted view. Every call is one blocking
/// round trip; cursors and pages are immutable value objects with no shared
/// backing store, so concurrent callers need no coordination.
///
/// The engine requests one row more than the page size. That overflow row
/// is the whole "is there a next page" signal, so no second round trip is
/// needed; it is trimmed off before the page is returned.
///

#[derive(Debug)]
pub struct Paginator<'a, Tr: Transport + ?Sized> {
    transport: &'a Tr,
    query: ViewQuery,
    parser: ViewResultParser,
}

impl<'a, Tr: Transport + ?Sized> Paginator<'a, Tr> {
    /// Paginate `query` against `transport`. The query's own anchor,
    /// limit, and direction fields are overwritten per page.
    #[must_use]
    pub const fn new(transport: &'a Tr, query: ViewQuery) -> Self {
        Self {
            transport,
            query,
            parser: ViewResultParser::new(),
        }
    }

    /// Skip rows the store flags as missing instead of failing the page.
    #[must_use]
    pub const fn ignore_not_found(mut self, ignore: bool) -> Self {
        self.parser = self.parser.ignore_not_found(ignore);
        self
    }

    /// Fetch the page the cursor points at. The first call of a session
    /// takes [`PageCursor::first_page`]; afterwards only cursors taken
    /// from a returned [`Page`] are valid.
    pub fn query_page<T>(&self, cursor: &PageCursor) -> Result<Page<T>, Error>
    where
        T: DeserializeOwned,
    {
        self.fetch_page(cursor)
            .map_err(|source| Error::page_fetch(cursor, source))
    }

    fn fetch_page<T>(&self, cursor: &PageCursor) -> Result<Page<T>, Error>
    where
        T: DeserializeOwned,
    {
        let page_size = cursor.page_size().get();
        let fetch_limit = cursor.page_size().saturating_add(1);
        let backward = cursor.direction().is_backward();
        let page_number = cursor.page_number();

        let mut query = self.query.clone().limit(fetch_limit).descending(backward);
        if page_number > 0 {
            if let Some(key) = cursor.key() {
                query = query.start_key(key.clone());
            }
            if let Some(doc_id) = cursor.doc_id() {
                query = query.start_key_doc_id(doc_id);
            }
        }

        let body = self.transport.view_query(&query)?;
        let result = self.parser.parse::<T, _>(body)?;
        debug!(
            rows = result.len(),
            total = result.total_rows(),
            page = page_number,
            "fetched page window"
        );

        // Both cursors must come from the pre-reversal row order. A
        // backward fetch swaps which end feeds which cursor: once the rows
        // are flipped back to forward order, the parser's "first" row is
        // the forward continuation point.
        let (next_boundary, previous_boundary) = if backward {
            (result.first_boundary(), result.last_boundary())
        } else {
            (result.last_boundary(), result.first_boundary())
        };

        let total_rows = result.total_rows();
        let mut rows = result.into_rows();
        let has_more = rows.len() == fetch_limit.get();

        if backward {
            rows.reverse();
        }
        if has_more {
            rows.truncate(page_size);
        }

        // A next cursor is only a faithful "a next page exists" signal on
        // the forward path; a backward fetch always has rows ahead of it.
        let next = if has_more || backward {
            next_boundary.map(|boundary| {
                cursor
                    .resume_at(&boundary)
                    .forward()
                    .page(page_number + 1)
                    .build()
            })
        } else {
            None
        };
        let previous = if page_number == 0 {
            None
        } else {
            previous_boundary.map(|boundary| {
                cursor
                    .resume_at(&boundary)
                    .backward()
                    .page(page_number - 1)
                    .build()
            })
        };

        Ok(Page::new(
            rows,
            total_rows,
            cursor.page_size(),
            previous,
            next,
        ))
    }
}
