//! Streaming bulk-operation encoding: the envelope byte stream and the
//! deletion marker document.

mod delete;
mod encoder;

pub use delete::BulkDeleteDocument;
pub use encoder::{EncodedBulk, SplicedBulk, encode_bulk, encode_bulk_from_stream};
