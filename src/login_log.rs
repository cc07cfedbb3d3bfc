//! Historical login activity, read from the host's append-only log file.
//!
//! Components:
//! - `parser`: one text line to one `LoginEvent`, understanding both the
//!   structured JSONL form and the legacy bracketed form.
//! - `reader`: tail-limited file access and path resolution.

pub mod parser;
pub mod reader;

pub use parser::parse_login_line;
pub use reader::read_login_events;
