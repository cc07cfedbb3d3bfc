//! Session substrate adapters.
//!
//! Components:
//! - `types`: the `SessionBackend` trait, the closed backend variant, the
//!   collaborator traits each adapter is constructed with, and the scan cap.
//! - `selector`: the total backend-selection policy.
//! - `db_backend`: relational session table adapter (sqlx/SQLite store).
//! - `redis_backend`: Redis keyspace adapter with cursor scanning and
//!   double-wrapped value decoding.
//! - `cache_backend`: in-process shared cache adapter.

pub mod cache_backend;
pub mod db_backend;
pub mod redis_backend;
pub mod selector;
pub mod types;

pub use selector::select_backend;
pub use types::{BackendKind, SessionBackend, SCAN_CAP};
