//! View query surface: query descriptors, result rows, and the streaming
//! result parser.

mod parser;
mod query;
mod row;

#[cfg(test)]
mod tests;

pub use parser::{ViewParseError, ViewResult, ViewResultParser};
pub use query::ViewQuery;
pub use row::{RowBoundary, ViewRow};
