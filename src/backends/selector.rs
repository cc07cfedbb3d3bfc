use crate::backends::types::BackendKind;
use crate::configuration::types::HandlerProbe;

/// Decide which backend a report queries. Total: always lands on a backend,
/// with `db` as the universal fallback.
///
/// An explicit, recognized backend name wins outright. `auto` probes the
/// host's session save handler; an unrecognized explicit value also falls
/// back to `db`.
pub fn select_backend(explicit: &str, probe: &HandlerProbe) -> BackendKind {
    match explicit.to_lowercase().as_str() {
        "db" => BackendKind::Db,
        "redis" => BackendKind::Redis,
        "cache" => BackendKind::Cache,
        "auto" => {
            let handler = probe
                .save_handler
                .as_deref()
                .unwrap_or_default()
                .to_lowercase();
            match handler.as_str() {
                "redis" => BackendKind::Redis,
                "apcu" | "apc" => BackendKind::Cache,
                _ => BackendKind::Db,
            }
        }
        _ => BackendKind::Db,
    }
}
