//! Client-side engine for sorted-index document stores speaking the
//! CouchDB-style view protocol: keyset (cursor) pagination over unbounded
//! view results, and streaming bulk-document encoding, on top of a
//! caller-supplied blocking transport.
#![warn(unreachable_pub)]

pub mod bulk;
pub mod direction;
pub mod error;
pub mod page;
pub mod transport;
pub mod view;

// test
#[cfg(test)]
pub(crate) mod test_support;

pub use error::Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, transports, or wire codecs are re-exported here.
///

pub mod prelude {
    pub use crate::{
        bulk::BulkDeleteDocument,
        direction::Direction,
        page::{Page, PageCursor, Paginator},
        view::{ViewQuery, ViewRow},
    };
}
