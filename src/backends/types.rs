use crate::error_handling::types::BackendError;
use crate::records::types::SessionRecord;

/// Upper bound on records per scan, whatever the substrate holds.
pub const SCAN_CAP: usize = 200;

/// The storage substrate currently holding live session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Db,
    Redis,
    Cache,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Db => "db",
            BackendKind::Redis => "redis",
            BackendKind::Cache => "cache",
        }
    }
}

/// One method: scan the substrate and return canonical records.
///
/// An `Err` means the substrate itself was unavailable; the façade turns it
/// into an empty section, distinguishable from "scanned, nothing found".
pub trait SessionBackend {
    fn kind(&self) -> BackendKind;
    fn scan(&mut self) -> Result<Vec<SessionRecord>, BackendError>;
}

/// One raw row from the host's session table.
#[derive(Debug, Clone, PartialEq)]
pub struct DbSessionRow {
    pub sess_id: String,
    pub changed: Option<String>,
    pub ip: Option<String>,
    pub vars: Vec<u8>,
}

/// Read access to the host's session table.
pub trait SessionTable: Send + Sync {
    /// Most recently changed sessions first, at most `limit` rows.
    fn recent_sessions(&self, limit: usize) -> Result<Vec<DbSessionRow>, BackendError>;
}

/// Cursor-driven access to a key-value keyspace.
///
/// The real implementation wraps a Redis connection; tests use fakes.
pub trait KeyValueScanner {
    /// One bounded SCAN step. A zero returned cursor means enumeration is
    /// complete.
    fn scan(
        &mut self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), BackendError>;

    /// Whether the key holds a plain string value. Only string-typed keys
    /// are session candidates.
    fn is_string_key(&mut self, key: &str) -> Result<bool, BackendError>;

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;
}

/// Enumerable view over an in-process shared cache.
pub trait CacheView: Send + Sync {
    fn keys(&self) -> Result<Vec<String>, BackendError>;

    /// `None` when the entry vanished or is not a string payload.
    fn fetch(&self, key: &str) -> Option<Vec<u8>>;
}
