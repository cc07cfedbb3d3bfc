use std::sync::Arc;

use serde_json::json;

use crate::backends::cache_backend::CacheAdapter;
use crate::backends::db_backend::DbAdapter;
use crate::backends::redis_backend::{parse_dsn, resolve_dsn, RedisAdapter, RedisScanner};
use crate::backends::selector::select_backend;
use crate::backends::types::{BackendKind, CacheView, SessionBackend, SessionTable};
use crate::configuration::config::Config;
use crate::diagnostics::debug_log::DebugSink;
use crate::error_handling::types::BackendError;
use crate::login_log::reader::read_login_events;
use crate::records::normalizer::UserDirectory;
use crate::records::types::{LoginEvent, SessionRecord};
use crate::report::visibility::{filter_logins_for, filter_sessions_for, Viewer};

/// How a report section ended up: an empty `Scanned` section really holds
/// nothing, an `Unavailable` one reflects a substrate failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionStatus {
    Scanned,
    Unavailable(String),
}

/// The point-in-time report handed to the rendering layer: two independent,
/// ordered lists. Sessions and login events are never joined.
#[derive(Debug)]
pub struct Report {
    pub backend: BackendKind,
    pub sessions: Vec<SessionRecord>,
    pub sessions_status: SectionStatus,
    pub logins: Vec<LoginEvent>,
    pub logins_status: SectionStatus,
}

impl Report {
    fn empty(backend: BackendKind) -> Self {
        Self {
            backend,
            sessions: Vec::new(),
            sessions_status: SectionStatus::Scanned,
            logins: Vec::new(),
            logins_status: SectionStatus::Scanned,
        }
    }
}

/// Orchestrates one report: backend selection, adapter scan, log tail read
/// and the self-view filter. Purely synchronous; exactly one backend is
/// queried per report, and no failure here is fatal.
pub struct Aggregator {
    config: Config,
    table: Option<Arc<dyn SessionTable>>,
    users: Arc<dyn UserDirectory>,
    cache: Arc<dyn CacheView>,
    diag: DebugSink,
}

impl Aggregator {
    pub fn new(
        config: Config,
        table: Option<Arc<dyn SessionTable>>,
        users: Arc<dyn UserDirectory>,
        cache: Arc<dyn CacheView>,
        diag: DebugSink,
    ) -> Self {
        Self {
            config,
            table,
            users,
            cache,
            diag,
        }
    }

    pub fn build_report(&self, viewer: &Viewer) -> Report {
        let probe = self.config.handler_probe();
        let backend = select_backend(&self.config.session_backend, &probe);

        if !viewer.may_view() {
            self.diag.note("viewer not allowed, empty report", json!(null));
            return Report::empty(backend);
        }

        self.diag
            .advise("using session backend", json!({"backend": backend.as_str()}));

        let (mut sessions, sessions_status) = match self.scan_sessions(backend) {
            Ok(records) => (records, SectionStatus::Scanned),
            Err(e) => {
                self.diag.advise(
                    "session backend unavailable",
                    json!({"backend": backend.as_str(), "error": e.to_string()}),
                );
                (Vec::new(), SectionStatus::Unavailable(e.to_string()))
            }
        };

        let log_path = self.config.resolve_path(&self.config.logins_file);
        let (mut logins, logins_status) = match read_login_events(&log_path) {
            Ok(events) => (events, SectionStatus::Scanned),
            Err(e) => {
                self.diag.note(
                    "login log file not readable",
                    json!({"file": log_path.display().to_string()}),
                );
                (Vec::new(), SectionStatus::Unavailable(e.to_string()))
            }
        };

        if viewer.restricted() {
            let login = viewer.login.clone().unwrap_or_default();
            sessions = filter_sessions_for(&login, sessions);
            logins = filter_logins_for(&login, logins);
        }

        Report {
            backend,
            sessions,
            sessions_status,
            logins,
            logins_status,
        }
    }

    fn scan_sessions(&self, backend: BackendKind) -> Result<Vec<SessionRecord>, BackendError> {
        match backend {
            BackendKind::Db => {
                let table = self.table.clone().ok_or_else(|| {
                    BackendError::DriverUnavailable(String::from("session table not configured"))
                })?;
                DbAdapter::new(table, self.users.clone(), self.diag.clone()).scan()
            }
            BackendKind::Redis => {
                let probe = self.config.handler_probe();
                let dsn = resolve_dsn(&self.config, &probe).ok_or(BackendError::NoDsn)?;
                let params = parse_dsn(&dsn, &self.config.redis_prefix)?;

                self.diag.advise(
                    "redis connection parameters",
                    json!({
                        "dsn": dsn,
                        "host": params.host,
                        "port": params.port,
                        "db": params.db,
                        "prefix": if params.prefix.is_empty() { "(none)" } else { params.prefix.as_str() },
                    }),
                );

                let scanner = RedisScanner::connect(&params, &self.diag)?;
                RedisAdapter::new(
                    Box::new(scanner),
                    params.prefix.clone(),
                    params.db,
                    self.users.clone(),
                    self.diag.clone(),
                )
                .scan()
            }
            BackendKind::Cache => CacheAdapter::new(
                self.cache.clone(),
                self.config.cache_prefix.clone(),
                self.users.clone(),
                self.diag.clone(),
            )
            .scan(),
        }
    }
}
