use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::records::types::{DecodedVars, SessionRecord};

/// Resolves a username from a numeric user id.
///
/// Backed by the host's users table in production; adapters receive it as an
/// explicit collaborator so tests can substitute a fake. A failed or empty
/// lookup is not an error, the username simply stays empty.
pub trait UserDirectory: Send + Sync {
    fn username_by_id(&self, user_id: i64) -> Option<String>;
}

/// A `UserDirectory` that never resolves anything.
///
/// Used when the users table is unreachable or not configured.
pub struct NullUserDirectory;

impl UserDirectory for NullUserDirectory {
    fn username_by_id(&self, _user_id: i64) -> Option<String> {
        None
    }
}

/// Build one canonical `SessionRecord` from decoded session variables and
/// the metadata the substrate knows directly.
///
/// Field resolution order (first present wins):
/// - `user_id`: numeric `vars.user_id` only
/// - `username`: `vars.username`, `vars.user`, then a directory lookup by id
/// - `storage_host`: `vars.imap_host`, `vars.storage_host`
/// - `ip`: directly-known IP if non-empty, else `vars.ip`
/// - `last_activity`: directly-known timestamp when it normalizes, else
///   `vars.changed`, else `vars.timestamp`
/// - `user_agent`: `vars.user_agent`, `vars.browser`, `vars.HTTP_USER_AGENT`
pub fn build_session_record(
    id: &str,
    known_changed: Option<&str>,
    known_ip: Option<&str>,
    vars: &DecodedVars,
    users: Option<&dyn UserDirectory>,
) -> SessionRecord {
    let user_id = numeric_var(vars, "user_id");

    let mut username = var_string(vars, "username")
        .or_else(|| var_string(vars, "user"))
        .unwrap_or_default();

    // Only hit the directory when we have an id but no name. One query per
    // record lacking a username is an accepted cost.
    if username.is_empty() {
        if let (Some(uid), Some(dir)) = (user_id, users) {
            if let Some(name) = dir.username_by_id(uid) {
                username = name;
            }
        }
    }

    let storage_host = var_string(vars, "imap_host")
        .or_else(|| var_string(vars, "storage_host"))
        .unwrap_or_default();

    let ip = match known_ip {
        Some(known) if !known.is_empty() => known.to_string(),
        _ => var_string(vars, "ip").unwrap_or_default(),
    };

    let last_activity = resolve_last_activity(known_changed, vars);

    let user_agent = var_string(vars, "user_agent")
        .or_else(|| var_string(vars, "browser"))
        .or_else(|| var_string(vars, "HTTP_USER_AGENT"))
        .unwrap_or_default();

    SessionRecord {
        id: id.to_string(),
        last_activity,
        ip,
        user_id,
        username,
        storage_host,
        user_agent,
    }
}

/// Pick the last-activity display value.
///
/// A directly-known timestamp wins when it actually normalizes; otherwise the
/// variable bag is consulted (`changed`, then `timestamp`). When no candidate
/// normalizes the first non-empty one is shown raw rather than blanked.
fn resolve_last_activity(known_changed: Option<&str>, vars: &DecodedVars) -> String {
    let known = known_changed.filter(|s| !s.is_empty());

    if let Some(k) = known {
        if parse_timestamp(k).is_some() {
            return format_timestamp(k);
        }
    }

    if let Some(c) = var_string(vars, "changed") {
        return format_timestamp(&c);
    }
    if let Some(t) = var_string(vars, "timestamp") {
        return format_timestamp(&t);
    }

    known.map(str::to_string).unwrap_or_default()
}

/// Normalize a timestamp for display.
///
/// Numeric values are interpreted as epoch seconds; anything else goes
/// through free-text date parsing. Values that fail both are returned
/// unchanged so the operator still sees something.
pub fn format_timestamp(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    match parse_timestamp(value) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => value.to_string(),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(epoch) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp(epoch, 0);
    }
    // PHP's is_numeric also admits floats; truncate like an (int) cast.
    if let Ok(epoch) = trimmed.parse::<f64>() {
        return DateTime::from_timestamp(epoch as i64, 0);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    // Webmail log style, e.g. "02-Dec-2025 22:14:07 +0000"
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%d-%b-%Y %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }
    // DB session tables usually store "YYYY-MM-DD HH:MM:SS" without a zone.
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    None
}

/// Non-empty string view of a session variable. Numbers are stringified,
/// matching the host's loose typing; everything else is treated as absent.
fn var_string(vars: &DecodedVars, key: &str) -> Option<String> {
    match vars.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric view of a session variable, accepting integers stored as strings.
fn numeric_var(vars: &DecodedVars, key: &str) -> Option<i64> {
    match vars.get(key) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars_from(value: serde_json::Value) -> DecodedVars {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    struct FixedDirectory;

    impl UserDirectory for FixedDirectory {
        fn username_by_id(&self, user_id: i64) -> Option<String> {
            (user_id == 7).then(|| String::from("resolved@example.org"))
        }
    }

    #[test]
    fn test_numeric_user_id_and_vars_ip() {
        let vars = vars_from(json!({"user_id": "7", "ip": "10.0.0.5"}));
        let record = build_session_record("s1", None, None, &vars, None);
        assert_eq!(record.user_id, Some(7));
        assert_eq!(record.ip, "10.0.0.5");
        assert_eq!(record.username, "");
    }

    #[test]
    fn test_known_ip_wins_over_vars() {
        let vars = vars_from(json!({"ip": "10.0.0.5"}));
        let record = build_session_record("s1", None, Some("192.168.1.9"), &vars, None);
        assert_eq!(record.ip, "192.168.1.9");
    }

    #[test]
    fn test_username_precedence() {
        let vars = vars_from(json!({"username": "alice", "user": "bob"}));
        let record = build_session_record("s1", None, None, &vars, None);
        assert_eq!(record.username, "alice");

        let vars = vars_from(json!({"user": "bob"}));
        let record = build_session_record("s1", None, None, &vars, None);
        assert_eq!(record.username, "bob");
    }

    #[test]
    fn test_directory_lookup_only_without_username() {
        let vars = vars_from(json!({"user_id": 7}));
        let record = build_session_record("s1", None, None, &vars, Some(&FixedDirectory));
        assert_eq!(record.username, "resolved@example.org");

        let vars = vars_from(json!({"user_id": 7, "username": "direct"}));
        let record = build_session_record("s1", None, None, &vars, Some(&FixedDirectory));
        assert_eq!(record.username, "direct");
    }

    #[test]
    fn test_lookup_failure_leaves_username_empty() {
        let vars = vars_from(json!({"user_id": 42}));
        let record = build_session_record("s1", None, None, &vars, Some(&FixedDirectory));
        assert_eq!(record.username, "");
        assert_eq!(record.user_id, Some(42));
    }

    #[test]
    fn test_storage_host_fallback() {
        let vars = vars_from(json!({"storage_host": "mail.example.org"}));
        let record = build_session_record("s1", None, None, &vars, None);
        assert_eq!(record.storage_host, "mail.example.org");

        let vars = vars_from(json!({"imap_host": "imap.example.org", "storage_host": "x"}));
        let record = build_session_record("s1", None, None, &vars, None);
        assert_eq!(record.storage_host, "imap.example.org");
    }

    #[test]
    fn test_known_numeric_timestamp_wins() {
        let vars = vars_from(json!({"changed": "1700000000", "timestamp": "1600000000"}));
        let record = build_session_record("s1", Some("1750000000"), None, &vars, None);
        assert_eq!(record.last_activity, format_timestamp("1750000000"));
        assert_ne!(record.last_activity, format_timestamp("1700000000"));
    }

    #[test]
    fn test_unparseable_known_timestamp_yields_to_vars() {
        let vars = vars_from(json!({"changed": "1700000000"}));
        let record = build_session_record("s1", Some("not-a-date"), None, &vars, None);
        assert_eq!(record.last_activity, format_timestamp("1700000000"));
    }

    #[test]
    fn test_unparseable_timestamp_shown_raw() {
        let vars = DecodedVars::new();
        let record = build_session_record("s1", Some("weird value"), None, &vars, None);
        assert_eq!(record.last_activity, "weird value");
    }

    #[test]
    fn test_user_agent_fallbacks() {
        let vars = vars_from(json!({"HTTP_USER_AGENT": "Mozilla/5.0"}));
        let record = build_session_record("s1", None, None, &vars, None);
        assert_eq!(record.user_agent, "Mozilla/5.0");

        let vars = vars_from(json!({"browser": "Firefox", "HTTP_USER_AGENT": "x"}));
        let record = build_session_record("s1", None, None, &vars, None);
        assert_eq!(record.user_agent, "Firefox");
    }

    #[test]
    fn test_format_timestamp_epoch() {
        assert_eq!(format_timestamp("0"), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(""), "");
    }

    #[test]
    fn test_format_timestamp_free_text() {
        assert_eq!(
            format_timestamp("02-Dec-2025 22:14:07 +0000"),
            "2025-12-02 22:14:07"
        );
        assert_eq!(
            format_timestamp("2025-12-02 22:14:07"),
            "2025-12-02 22:14:07"
        );
    }

    #[test]
    fn test_empty_vars_produce_fully_populated_record() {
        let vars = DecodedVars::new();
        let record = build_session_record("opaque-key", None, None, &vars, None);
        assert_eq!(record.id, "opaque-key");
        assert_eq!(record.last_activity, "");
        assert_eq!(record.ip, "");
        assert_eq!(record.user_id, None);
        assert_eq!(record.username, "");
        assert_eq!(record.storage_host, "");
        assert_eq!(record.user_agent, "");
    }
}
