use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::records::types::LoginEvent;

/// Device label for legacy lines, which carry no device data of their own.
pub const LEGACY_DEVICE_LABEL: &str = "web client";

/// Legacy login line, e.g.
/// `[02-Dec-2025 22:14:07 +0000]: <778qsk06> FAILED login for gene@genesworld.net from 40.142.217.207`
fn legacy_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^\[(?P<ts>[^\]]+)\]:\s+<[^>]+>\s+(?P<result>[A-Za-z]+)\s+login\s+for\s+(?P<user>\S+)\s+from\s+(?P<ip>\S+)",
        )
        .expect("legacy login pattern is valid")
    })
}

/// Parse one trimmed, non-empty log line.
///
/// Tries the structured JSONL form first, then the legacy bracketed form.
/// `None` means unparseable; the caller skips the line silently.
pub fn parse_login_line(line: &str) -> Option<LoginEvent> {
    if let Some(event) = parse_structured_line(line) {
        return Some(event);
    }
    parse_legacy_line(line)
}

fn parse_structured_line(line: &str) -> Option<LoginEvent> {
    let data: Value = serde_json::from_str(line).ok()?;
    let map = data.as_object()?;

    Some(LoginEvent {
        timestamp: field_string(map.get("timestamp")),
        user: field_string(map.get("user")),
        ip: field_string(map.get("ip")),
        device: field_string(map.get("device")),
        success: map.get("success").map(truthy).unwrap_or(false),
    })
}

fn parse_legacy_line(line: &str) -> Option<LoginEvent> {
    let caps = legacy_pattern().captures(line)?;

    let result = &caps["result"];
    let success = !result.eq_ignore_ascii_case("FAILED");

    Some(LoginEvent {
        timestamp: caps["ts"].to_string(),
        user: caps["user"].to_string(),
        ip: caps["ip"].to_string(),
        device: LEGACY_DEVICE_LABEL.to_string(),
        success,
    })
}

fn field_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// The host's truthiness convention: false, 0, "0", "" and null all count
/// as a failed login; any other scalar counts as success.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_failed_line() {
        let line = "[02-Dec-2025 22:14:07 +0000]: <778qsk06> FAILED login for gene@genesworld.net from 40.142.217.207";
        let event = parse_login_line(line).unwrap();
        assert_eq!(event.timestamp, "02-Dec-2025 22:14:07 +0000");
        assert_eq!(event.user, "gene@genesworld.net");
        assert_eq!(event.ip, "40.142.217.207");
        assert_eq!(event.device, LEGACY_DEVICE_LABEL);
        assert!(!event.success);
    }

    #[test]
    fn test_legacy_successful_line() {
        let line = "[03-Dec-2025 08:01:11 +0000]: <9922abcd> Successful login for alice@example.org from 192.0.2.17";
        let event = parse_login_line(line).unwrap();
        assert_eq!(event.user, "alice@example.org");
        assert!(event.success);
    }

    #[test]
    fn test_legacy_failed_is_case_insensitive() {
        let line = "[03-Dec-2025 08:01:11 +0000]: <9922abcd> failed login for bob@example.org from 192.0.2.18";
        let event = parse_login_line(line).unwrap();
        assert!(!event.success);
    }

    #[test]
    fn test_structured_line() {
        let line = r#"{"timestamp":"2025-12-02T22:14:07Z","user":"alice","ip":"192.0.2.1","device":"android","success":true}"#;
        let event = parse_login_line(line).unwrap();
        assert_eq!(event.timestamp, "2025-12-02T22:14:07Z");
        assert_eq!(event.user, "alice");
        assert_eq!(event.ip, "192.0.2.1");
        assert_eq!(event.device, "android");
        assert!(event.success);
    }

    #[test]
    fn test_structured_line_missing_fields_default() {
        let event = parse_login_line(r#"{"user":"alice"}"#).unwrap();
        assert_eq!(event.timestamp, "");
        assert_eq!(event.ip, "");
        assert_eq!(event.device, "");
        assert!(!event.success);
    }

    #[test]
    fn test_structured_success_truthiness() {
        for (raw, expected) in [
            (r#"{"success":true}"#, true),
            (r#"{"success":1}"#, true),
            (r#"{"success":"yes"}"#, true),
            (r#"{"success":false}"#, false),
            (r#"{"success":0}"#, false),
            (r#"{"success":"0"}"#, false),
            (r#"{"success":""}"#, false),
            (r#"{"success":null}"#, false),
        ] {
            let event = parse_login_line(raw).unwrap();
            assert_eq!(event.success, expected, "line {}", raw);
        }
    }

    #[test]
    fn test_unparseable_lines() {
        assert!(parse_login_line("random text").is_none());
        assert!(parse_login_line("[no colon] something else").is_none());
        assert!(parse_login_line("123").is_none()); // JSON scalar, not an object
    }
}
