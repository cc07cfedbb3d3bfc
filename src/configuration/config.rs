use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::types::HandlerProbe;
use crate::error_handling::types::ConfigError;

/// Runtime configuration, loaded once per report and never mutated.
///
/// Read from a TOML file; every field has a default so a minimal deployment
/// only sets what differs from a stock webmail host.
///
/// # Fields Overview
///
/// - `session_backend`: explicit backend name (`db`, `redis`, `cache`) or
///   `auto` to probe the host's session save handler
/// - `redis_dsn` / `redis_hosts`: explicit connection string, then the
///   host-level server list, before falling back to the save path
/// - `redis_prefix`: session key prefix; empty scans all keys and relies on
///   namespace classification
/// - `cache_prefix`: key prefix the host uses for cache-held sessions
/// - `db_path` / `db_table_session` / `db_table_users`: session database
///   location and table names
/// - `logins_file`: login log, resolved against `install_root` when relative
/// - `log_dir`: where the debug sink appends its file
/// - `debug`: enables the gated diagnostic lines
/// - `session_save_handler` / `session_save_path`: probe inputs mirroring
///   the host's runtime session configuration
/// - `allow_user_view_own`: whether a non-administrator may see their own
///   records (self-view)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub session_backend: String,
    pub redis_dsn: Option<String>,
    pub redis_hosts: Vec<String>,
    pub redis_prefix: String,
    pub cache_prefix: String,
    pub db_path: PathBuf,
    pub db_table_session: String,
    pub db_table_users: String,
    pub logins_file: String,
    pub install_root: Option<PathBuf>,
    pub log_dir: String,
    pub debug: bool,
    pub session_save_handler: Option<String>,
    pub session_save_path: Option<String>,
    pub allow_user_view_own: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_backend: String::from("auto"),
            redis_dsn: None,
            redis_hosts: Vec::new(),
            redis_prefix: String::new(),
            cache_prefix: String::from("rcsess_"),
            db_path: PathBuf::from("vigie.sqlite3"),
            db_table_session: String::from("session"),
            db_table_users: String::from("users"),
            logins_file: String::from("logs/userlogins.log"),
            install_root: None,
            log_dir: String::from("logs"),
            debug: false,
            session_save_handler: None,
            session_save_path: None,
            allow_user_view_own: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Config::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Config, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    /// Probe inputs for backend auto-detection and DSN fallback.
    pub fn handler_probe(&self) -> HandlerProbe {
        HandlerProbe {
            save_handler: self.session_save_handler.clone(),
            save_path: self.session_save_path.clone(),
        }
    }

    /// Resolve a path against the install root unless it is absolute.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let p = PathBuf::from(path);
        if p.is_absolute() {
            return p;
        }
        match &self.install_root {
            Some(root) => root.join(p),
            None => p,
        }
    }

    /// Directory the debug sink writes into.
    pub fn debug_log_dir(&self) -> Option<PathBuf> {
        if self.log_dir.is_empty() {
            return None;
        }
        Some(self.resolve_path(&self.log_dir))
    }
}
