use crate::{
    direction::Direction, page::PageCursor, transport::TransportError, view::ViewParseError,
};
use thiserror::Error as ThisError;

///
/// Error
///
/// Crate-level error surface. Per-module enums carry the structured detail;
/// this type only aggregates them and, on the page path, records which
/// cursor was being fetched when the failure happened.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ViewParseError),

    #[error("page {page_number} fetch failed ({direction}): {source}")]
    PageFetch {
        page_number: u32,
        direction: Direction,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap a failure with the position of the cursor that produced it.
    pub(crate) fn page_fetch(cursor: &PageCursor, source: Self) -> Self {
        Self::PageFetch {
            page_number: cursor.page_number(),
            direction: cursor.direction(),
            source: Box::new(source),
        }
    }
}
