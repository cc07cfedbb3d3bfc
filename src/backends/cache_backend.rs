use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::backends::types::{BackendKind, CacheView, SessionBackend, SCAN_CAP};
use crate::decoding::session_blob::decode_session_blob;
use crate::diagnostics::debug_log::DebugSink;
use crate::error_handling::types::BackendError;
use crate::records::normalizer::{build_session_record, UserDirectory};
use crate::records::types::SessionRecord;

/// Shared in-process cache, the substrate the host uses when sessions live
/// in local memory. Keys are enumerated in sorted order for determinism.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, value: Vec<u8>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }
}

impl CacheView for MemoryCache {
    fn keys(&self) -> Result<Vec<String>, BackendError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| BackendError::DriverUnavailable(e.to_string()))?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn fetch(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

/// Adapter over the in-process shared cache.
///
/// Cache entries carry no id/ip metadata of their own, and only entries
/// decoding into a non-empty mapping are shown; an undecodable cache entry
/// is skipped, unlike the Redis adapter's opaque fallback.
pub struct CacheAdapter {
    cache: Arc<dyn CacheView>,
    prefix: String,
    users: Arc<dyn UserDirectory>,
    diag: DebugSink,
}

impl CacheAdapter {
    pub fn new(
        cache: Arc<dyn CacheView>,
        prefix: String,
        users: Arc<dyn UserDirectory>,
        diag: DebugSink,
    ) -> Self {
        Self {
            cache,
            prefix,
            users,
            diag,
        }
    }
}

impl SessionBackend for CacheAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Cache
    }

    fn scan(&mut self) -> Result<Vec<SessionRecord>, BackendError> {
        let keys = self.cache.keys()?;

        let mut rows = Vec::new();
        let mut sample_logged = false;

        for key in keys {
            if rows.len() >= SCAN_CAP {
                break;
            }

            if !self.prefix.is_empty() && !key.starts_with(&self.prefix) {
                continue;
            }

            let val = match self.cache.fetch(&key) {
                Some(v) if !v.is_empty() => v,
                _ => continue,
            };

            let (vars, decoded) = decode_session_blob(&val);
            if !decoded {
                if !sample_logged {
                    self.diag.advise("cache session decode failed", json!({"key": key}));
                    sample_logged = true;
                }
                continue;
            }

            if !sample_logged {
                self.diag.advise(
                    "cache session decoded sample",
                    json!({"key": key, "keys": vars.keys().collect::<Vec<_>>()}),
                );
                sample_logged = true;
            }

            rows.push(build_session_record(
                &key,
                None,
                None,
                &vars,
                Some(self.users.as_ref()),
            ));
        }

        Ok(rows)
    }
}
