//! Canonical record types and normalization.
//!
//! Components:
//! - `types`: the `SessionRecord` and `LoginEvent` shapes every consumer sees.
//! - `normalizer`: reconciles decoded session variables and directly-known
//!   metadata into one fully-populated `SessionRecord`.

pub mod normalizer;
pub mod types;

pub use normalizer::{build_session_record, UserDirectory};
pub use types::{DecodedVars, LoginEvent, SessionRecord};
