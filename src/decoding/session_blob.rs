use base64::Engine as _;
use serde_json::Value;

use crate::decoding::php_serialize;
use crate::records::types::DecodedVars;

/// Recover session variables from a blob of unknown provenance.
///
/// Tries, in order, stopping at the first non-empty mapping:
/// 1. strict base64 decode, then unserialize
/// 2. unserialize the raw bytes directly
/// 3. the session-string grammar (`name|serialized-value` pairs
///    concatenated without separator)
///
/// Never fails: an unrecognized blob yields `(empty, false)` and the entry
/// degrades to an opaque session instead of aborting the scan. Parsing is a
/// pure function with no ambient state, so one decode can never leak into
/// the next.
pub fn decode_session_blob(raw: &[u8]) -> (DecodedVars, bool) {
    if let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(raw) {
        if let Some(vars) = unserialize_mapping(&decoded) {
            return (vars, true);
        }
    }

    if let Some(vars) = unserialize_mapping(raw) {
        return (vars, true);
    }

    if let Some(vars) = decode_session_string(raw) {
        return (vars, true);
    }

    (DecodedVars::new(), false)
}

/// Unserialize and accept only a non-empty mapping.
fn unserialize_mapping(raw: &[u8]) -> Option<DecodedVars> {
    match php_serialize::unserialize(raw) {
        Some(Value::Object(map)) if !map.is_empty() => Some(map),
        _ => None,
    }
}

/// Parse the session-string grammar: a sequence of `name|value` pairs where
/// `value` is a serialized scalar or array and the next name starts right
/// after it. Any malformed pair fails the whole parse.
fn decode_session_string(raw: &[u8]) -> Option<DecodedVars> {
    if !raw.contains(&b'|') {
        return None;
    }

    let mut vars = DecodedVars::new();
    let mut pos = 0;

    while pos < raw.len() {
        let bar = raw[pos..].iter().position(|&b| b == b'|')? + pos;
        let name = std::str::from_utf8(&raw[pos..bar]).ok()?;
        if name.is_empty() {
            return None;
        }

        let (value, used) = php_serialize::parse_value(&raw[bar + 1..])?;
        vars.insert(name.to_string(), value);
        pos = bar + 1 + used;
    }

    if vars.is_empty() {
        None
    } else {
        Some(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use serde_json::json;

    fn sample_vars() -> Value {
        json!({
            "user_id": 7,
            "username": "alice@example.org",
            "ip": "10.0.0.5",
        })
    }

    #[test]
    fn test_decodes_base64_wrapped_blob() {
        let serialized = php_serialize::serialize(&sample_vars());
        let blob = base64::engine::general_purpose::STANDARD.encode(serialized);

        let (vars, recovered) = decode_session_blob(blob.as_bytes());
        assert!(recovered);
        assert_eq!(Value::Object(vars), sample_vars());
    }

    #[test]
    fn test_decodes_plain_serialized_blob() {
        let serialized = php_serialize::serialize(&sample_vars());

        let (vars, recovered) = decode_session_blob(serialized.as_bytes());
        assert!(recovered);
        assert_eq!(Value::Object(vars), sample_vars());
    }

    #[test]
    fn test_decodes_session_string_blob() {
        let blob = "user_id|i:7;username|s:17:\"alice@example.org\";ip|s:8:\"10.0.0.5\";";

        let (vars, recovered) = decode_session_blob(blob.as_bytes());
        assert!(recovered);
        assert_eq!(Value::Object(vars), sample_vars());
    }

    #[test]
    fn test_pipe_inside_string_value_does_not_split_pairs() {
        let blob = "note|s:3:\"a|b\";user|s:5:\"alice\";";

        let (vars, recovered) = decode_session_blob(blob.as_bytes());
        assert!(recovered);
        assert_eq!(Value::Object(vars), json!({"note": "a|b", "user": "alice"}));
    }

    #[test]
    fn test_unrecognized_blob_degrades() {
        for blob in [
            &b"complete garbage"[..],
            b"",
            b"i:7;",              // scalar, not a mapping
            b"a:0:{}",            // empty mapping
            b"name|i:7;trailing", // malformed session string
            &[0xff, 0xfe, 0x00][..],
        ] {
            let (vars, recovered) = decode_session_blob(blob);
            assert!(!recovered, "blob {:?} should not decode", blob);
            assert!(vars.is_empty());
        }
    }

    #[test]
    fn test_hostile_length_field_degrades() {
        // A huge declared string length reaches the cascade from every
        // backend; it must degrade like any other bad blob.
        for blob in [
            &b"user|s:18446744073709551615:\"x\";"[..],
            b"s:18446744073709551615:\"x\";",
            b"s:18446744073709551610:\"x\";",
        ] {
            let (vars, recovered) = decode_session_blob(blob);
            assert!(!recovered, "blob {:?} should not decode", blob);
            assert!(vars.is_empty());
        }
    }

    #[test]
    fn test_decodes_are_isolated() {
        let good = "user|s:5:\"alice\";";
        let (vars, recovered) = decode_session_blob(good.as_bytes());
        assert!(recovered);
        assert_eq!(vars.len(), 1);

        // A failed decode right after a successful one sees none of it.
        let (vars, recovered) = decode_session_blob(b"broken|");
        assert!(!recovered);
        assert!(vars.is_empty());

        // And the good blob still decodes the same afterwards.
        let (again, recovered) = decode_session_blob(good.as_bytes());
        assert!(recovered);
        assert_eq!(again.get("user"), Some(&json!("alice")));
    }

    #[test]
    fn test_base64_of_non_mapping_falls_through() {
        // base64 of a serialized scalar must not be accepted by attempt 1,
        // and the raw text happens to match nothing else either.
        let blob = base64::engine::general_purpose::STANDARD.encode("i:42;");
        let (vars, recovered) = decode_session_blob(blob.as_bytes());
        assert!(!recovered);
        assert!(vars.is_empty());
    }
}
