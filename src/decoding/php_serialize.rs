//! Reader and writer for PHP's `serialize()` wire format, covering the
//! subset session data actually uses: null, bool, int, float, string and
//! array. Objects and references are rejected.
//!
//! String lengths are byte counts, so parsing works on `&[u8]` and only
//! converts to UTF-8 at the edges (lossily, like the host displays them).

use serde_json::{Map, Number, Value};

/// Nesting cap for arrays. Session data is at most a few levels deep; a
/// blob nested past this is hostile and must not blow the stack.
const MAX_DEPTH: usize = 128;

/// Deserialize one complete value. Trailing bytes are rejected.
pub fn unserialize(input: &[u8]) -> Option<Value> {
    let (value, used) = parse_value(input)?;
    if used == input.len() {
        Some(value)
    } else {
        None
    }
}

/// Deserialize a value from the front of `input`, returning it together with
/// the number of bytes consumed. This is what the session-string grammar
/// needs, since pairs are concatenated without a separator.
pub(crate) fn parse_value(input: &[u8]) -> Option<(Value, usize)> {
    parse_value_at(input, 0)
}

fn parse_value_at(input: &[u8], depth: usize) -> Option<(Value, usize)> {
    if depth > MAX_DEPTH {
        return None;
    }
    match input.first()? {
        b'N' => {
            // N;
            if input.get(1) == Some(&b';') {
                Some((Value::Null, 2))
            } else {
                None
            }
        }
        b'b' => {
            // b:0; or b:1;
            if input.len() >= 4 && input[1] == b':' && input[3] == b';' {
                match input[2] {
                    b'0' => Some((Value::Bool(false), 4)),
                    b'1' => Some((Value::Bool(true), 4)),
                    _ => None,
                }
            } else {
                None
            }
        }
        b'i' => {
            let (text, end) = read_until_semicolon(input, 2)?;
            let n: i64 = text.parse().ok()?;
            Some((Value::Number(Number::from(n)), end + 1))
        }
        b'd' => {
            let (text, end) = read_until_semicolon(input, 2)?;
            let f: f64 = text.parse().ok()?;
            let n = Number::from_f64(f)?;
            Some((Value::Number(n), end + 1))
        }
        b's' => {
            let (bytes, used) = parse_string(input)?;
            let s = String::from_utf8_lossy(bytes).into_owned();
            Some((Value::String(s), used))
        }
        b'a' => parse_array(input, depth),
        _ => None,
    }
}

/// Parse `s:<len>:"<bytes>";` and return the raw bytes plus bytes consumed.
fn parse_string(input: &[u8]) -> Option<(&[u8], usize)> {
    if input.get(1) != Some(&b':') {
        return None;
    }
    let colon = find_byte(input, 2, b':')?;
    let len: usize = std::str::from_utf8(&input[2..colon]).ok()?.parse().ok()?;

    let open = colon + 1;
    if input.get(open) != Some(&b'"') {
        return None;
    }
    // The length field comes from the blob; adding it unchecked would
    // overflow on hostile input.
    let start = open + 1;
    let end = start.checked_add(len)?;
    let close = end.checked_add(1)?;
    if input.len() <= close || input[end] != b'"' || input[close] != b';' {
        return None;
    }
    Some((&input[start..end], close + 1))
}

/// Parse `a:<count>:{<key><value>...}`. Keys are ints or strings; both map
/// to string keys in the output, which is how the variable bag is consumed.
fn parse_array(input: &[u8], depth: usize) -> Option<(Value, usize)> {
    if input.get(1) != Some(&b':') {
        return None;
    }
    let colon = find_byte(input, 2, b':')?;
    let count: usize = std::str::from_utf8(&input[2..colon]).ok()?.parse().ok()?;
    if input.get(colon + 1) != Some(&b'{') {
        return None;
    }

    let mut pos = colon + 2;
    let mut map = Map::new();

    for _ in 0..count {
        let (key, used) = parse_value_at(&input[pos..], depth + 1)?;
        pos += used;
        let key = match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let (value, used) = parse_value_at(&input[pos..], depth + 1)?;
        pos += used;
        map.insert(key, value);
    }

    if input.get(pos) != Some(&b'}') {
        return None;
    }
    Some((Value::Object(map), pos + 1))
}

fn read_until_semicolon(input: &[u8], from: usize) -> Option<(&str, usize)> {
    if input.get(1) != Some(&b':') {
        return None;
    }
    let end = find_byte(input, from, b';')?;
    let text = std::str::from_utf8(&input[from..end]).ok()?;
    Some((text, end))
}

fn find_byte(input: &[u8], from: usize, needle: u8) -> Option<usize> {
    input
        .iter()
        .skip(from)
        .position(|&b| b == needle)
        .map(|i| i + from)
}

/// Serialize a value into the host's wire format. Arrays get sequential
/// integer keys, objects keep their string keys.
pub fn serialize(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("N;"),
        Value::Bool(b) => out.push_str(if *b { "b:1;" } else { "b:0;" }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                out.push_str(&format!("i:{};", i));
            } else {
                out.push_str(&format!("d:{};", n));
            }
        }
        Value::String(s) => {
            out.push_str(&format!("s:{}:\"{}\";", s.len(), s));
        }
        Value::Array(items) => {
            out.push_str(&format!("a:{}:{{", items.len()));
            for (i, item) in items.iter().enumerate() {
                out.push_str(&format!("i:{};", i));
                write_value(item, out);
            }
            out.push('}');
        }
        Value::Object(map) => {
            out.push_str(&format!("a:{}:{{", map.len()));
            for (key, item) in map {
                out.push_str(&format!("s:{}:\"{}\";", key.len(), key));
                write_value(item, out);
            }
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_roundtrips() {
        for value in [json!(null), json!(true), json!(false), json!(42), json!(-7)] {
            let encoded = serialize(&value);
            assert_eq!(unserialize(encoded.as_bytes()), Some(value));
        }
    }

    #[test]
    fn test_string_with_pipe_and_quote() {
        let value = json!("a|b\"c");
        let encoded = serialize(&value);
        assert_eq!(encoded, "s:5:\"a|b\"c\";");
        assert_eq!(unserialize(encoded.as_bytes()), Some(value));
    }

    #[test]
    fn test_string_length_is_byte_count() {
        let value = json!("héllo");
        let encoded = serialize(&value);
        assert_eq!(encoded, "s:6:\"héllo\";");
        assert_eq!(unserialize(encoded.as_bytes()), Some(value));
    }

    #[test]
    fn test_nested_array_roundtrip() {
        let value = json!({
            "user_id": 7,
            "username": "alice@example.org",
            "prefs": {"skin": "elastic", "pagesize": 50},
        });
        let encoded = serialize(&value);
        assert_eq!(unserialize(encoded.as_bytes()), Some(value));
    }

    #[test]
    fn test_integer_keys_become_strings() {
        let decoded = unserialize(b"a:2:{i:0;s:1:\"a\";i:1;s:1:\"b\";}").unwrap();
        assert_eq!(decoded, json!({"0": "a", "1": "b"}));
    }

    #[test]
    fn test_float_value() {
        let decoded = unserialize(b"d:1.5;").unwrap();
        assert_eq!(decoded, json!(1.5));
    }

    #[test]
    fn test_rejects_objects_and_garbage() {
        assert_eq!(unserialize(b"O:8:\"stdClass\":0:{}"), None);
        assert_eq!(unserialize(b"not serialized"), None);
        assert_eq!(unserialize(b""), None);
        assert_eq!(unserialize(b"i:12"), None);
        assert_eq!(unserialize(b"s:99:\"short\";"), None);
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        assert_eq!(unserialize(b"i:1;i:2;"), None);
        let (value, used) = parse_value(b"i:1;i:2;").unwrap();
        assert_eq!(value, json!(1));
        assert_eq!(used, 4);
    }

    #[test]
    fn test_truncated_array() {
        assert_eq!(unserialize(b"a:2:{i:0;s:1:\"a\";"), None);
    }

    #[test]
    fn test_overflowing_string_length_is_rejected() {
        // Length fields near usize::MAX must fail cleanly, not wrap.
        assert_eq!(unserialize(b"s:18446744073709551615:\"x\";"), None);
        assert_eq!(unserialize(b"s:18446744073709551610:\"x\";"), None);
        assert_eq!(unserialize(b"a:1:{s:18446744073709551615:\"k\";N;}"), None);
    }

    #[test]
    fn test_nesting_depth_is_capped() {
        let mut hostile = String::new();
        for _ in 0..5_000 {
            hostile.push_str("a:1:{i:0;");
        }
        hostile.push_str("N;");
        for _ in 0..5_000 {
            hostile.push('}');
        }
        assert_eq!(unserialize(hostile.as_bytes()), None);

        // Realistic nesting stays well under the cap.
        let mut shallow = String::new();
        for _ in 0..16 {
            shallow.push_str("a:1:{i:0;");
        }
        shallow.push_str("i:7;");
        for _ in 0..16 {
            shallow.push('}');
        }
        assert!(unserialize(shallow.as_bytes()).is_some());
    }
}
