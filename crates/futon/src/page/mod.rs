//! Keyset pagination: cursors, the opaque token codec, the page payload,
//! and the pagination engine.

mod cursor;
mod paged;
mod paginator;
mod token;


pub use cursor::{CursorBuilder, PageCursor};
pub use paged::{Page, Rows};
pub use paginator::Paginator;
pub use token::CursorTokenError;
