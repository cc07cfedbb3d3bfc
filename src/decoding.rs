//! Recovery of structured session variables from opaque blobs.
//!
//! Components:
//! - `php_serialize`: byte-accurate reader/writer for the host's native
//!   serialization format (scalars and arrays).
//! - `session_blob`: the decoder cascade trying, in order, base64-wrapped
//!   serialization, plain serialization, and the session-string grammar.

pub mod php_serialize;
pub mod session_blob;

pub use session_blob::decode_session_blob;
