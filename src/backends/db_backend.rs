use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::json;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use crate::backends::types::{
    BackendKind, DbSessionRow, SessionBackend, SessionTable, SCAN_CAP,
};
use crate::decoding::session_blob::decode_session_blob;
use crate::diagnostics::debug_log::DebugSink;
use crate::error_handling::types::BackendError;
use crate::records::normalizer::{build_session_record, UserDirectory};
use crate::records::types::SessionRecord;

// Internal row mapping to avoid manual try_get
#[derive(Debug, sqlx::FromRow)]
struct RawRow {
    sess_id: String,
    changed: Option<String>,
    ip: Option<String>,
    vars: Option<Vec<u8>>,
}

/// SQLite-backed access to the host's session and users tables.
///
/// Read-only from the engine's point of view: it only ever selects.
pub struct SqliteStore {
    rt: tokio::runtime::Runtime,
    pool: Pool<Sqlite>,
    session_table: String,
    users_table: String,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(
        path: P,
        session_table: &str,
        users_table: &str,
    ) -> Result<Self, BackendError> {
        // Inspecting someone else's database: never create one.
        if !path.as_ref().exists() {
            return Err(BackendError::DriverUnavailable(format!(
                "no session database at {}",
                path.as_ref().display()
            )));
        }

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BackendError::DriverUnavailable(e.to_string()))?;

        let pool = rt.block_on(async {
            let opts = SqliteConnectOptions::from_str("sqlite://")
                .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?
                .filename(path.as_ref())
                .create_if_missing(false);
            SqlitePoolOptions::new()
                .max_connections(2)
                .connect_with(opts)
                .await
                .map_err(|e| BackendError::ConnectionFailed(e.to_string()))
        })?;

        Ok(Self {
            rt,
            pool,
            session_table: session_table.to_string(),
            users_table: users_table.to_string(),
        })
    }
}

impl SessionTable for SqliteStore {
    fn recent_sessions(&self, limit: usize) -> Result<Vec<DbSessionRow>, BackendError> {
        self.rt.block_on(async {
            let sql = format!(
                "SELECT sess_id, changed, ip, vars FROM {} ORDER BY changed DESC LIMIT ?1",
                self.session_table
            );
            let rows: Vec<RawRow> = sqlx::query_as(&sql)
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| BackendError::QueryFailed(e.to_string()))?;

            Ok(rows
                .into_iter()
                .map(|r| DbSessionRow {
                    sess_id: r.sess_id,
                    changed: r.changed,
                    ip: r.ip,
                    vars: r.vars.unwrap_or_default(),
                })
                .collect())
        })
    }
}

impl UserDirectory for SqliteStore {
    fn username_by_id(&self, user_id: i64) -> Option<String> {
        self.rt.block_on(async {
            let sql = format!(
                "SELECT username FROM {} WHERE user_id = ?1",
                self.users_table
            );
            sqlx::query_scalar::<_, String>(&sql)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .ok()
                .flatten()
        })
    }
}

/// Adapter over the host's relational session table.
///
/// Rows arrive most-recently-changed first with `sess_id`, `changed` and
/// `ip` directly known; only the `vars` blob goes through the decoder
/// cascade. An undecodable blob still yields an opaque record.
pub struct DbAdapter {
    table: Arc<dyn SessionTable>,
    users: Arc<dyn UserDirectory>,
    diag: DebugSink,
}

impl DbAdapter {
    pub fn new(
        table: Arc<dyn SessionTable>,
        users: Arc<dyn UserDirectory>,
        diag: DebugSink,
    ) -> Self {
        Self { table, users, diag }
    }
}

impl SessionBackend for DbAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Db
    }

    fn scan(&mut self) -> Result<Vec<SessionRecord>, BackendError> {
        let rows = self.table.recent_sessions(SCAN_CAP)?;

        let mut out = Vec::new();
        let mut sample_logged = false;

        for row in rows.into_iter().take(SCAN_CAP) {
            let (vars, recovered) = decode_session_blob(&row.vars);

            if !sample_logged {
                if recovered {
                    self.diag.advise(
                        "session vars decoded sample (db)",
                        json!({
                            "sess_id": row.sess_id,
                            "keys": vars.keys().collect::<Vec<_>>(),
                        }),
                    );
                } else {
                    let raw = String::from_utf8_lossy(&row.vars);
                    self.diag.advise(
                        "session vars decode failed (db)",
                        json!({
                            "sess_id": row.sess_id,
                            "changed": row.changed,
                            "vars_raw": raw.chars().take(200).collect::<String>(),
                        }),
                    );
                }
                sample_logged = true;
            }

            out.push(build_session_record(
                &row.sess_id,
                row.changed.as_deref(),
                row.ip.as_deref(),
                &vars,
                Some(self.users.as_ref()),
            ));
        }

        Ok(out)
    }
}
