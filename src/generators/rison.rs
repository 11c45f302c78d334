//! Minimal RISON encoder.
//!
//! Kibana's `_g` URL parameter carries state in RISON, a compact
//! URL-oriented sibling of JSON (`(time:(from:'...',to:'...'))`). This
//! module encodes `serde_json` values into that form; the engine only
//! ever encodes, never decodes.

use serde_json::Value as JsonValue;

/// Characters that force a string into quoted form.
const RESERVED: &[char] = &['\'', '!', ':', '(', ')', ',', '*', '@', '$'];

/// Encode a JSON value as RISON.
pub fn encode(value: &JsonValue) -> String {
    let mut out = String::new();
    encode_into(value, &mut out);
    out
}

fn encode_into(value: &JsonValue, out: &mut String) {
    match value {
        JsonValue::Null => out.push_str("!n"),
        JsonValue::Bool(true) => out.push_str("!t"),
        JsonValue::Bool(false) => out.push_str("!f"),
        JsonValue::Number(n) => out.push_str(&n.to_string()),
        JsonValue::String(s) => encode_string(s, out),
        JsonValue::Array(items) => {
            out.push_str("!(");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                encode_into(item, out);
            }
            out.push(')');
        }
        JsonValue::Object(map) => {
            out.push('(');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                encode_string(key, out);
                out.push(':');
                encode_into(item, out);
            }
            out.push(')');
        }
    }
}

fn encode_string(s: &str, out: &mut String) {
    if is_id(s) {
        out.push_str(s);
        return;
    }

    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("!'"),
            '!' => out.push_str("!!"),
            other => out.push(other),
        }
    }
    out.push('\'');
}

/// Whether a string may appear unquoted. Ids must not start with a digit
/// or '-', and must not contain whitespace or reserved punctuation.
fn is_id(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if first.is_ascii_digit() || first == '-' {
        return false;
    }
    !s.chars()
        .any(|c| c.is_whitespace() || RESERVED.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_identifiers_stay_unquoted() {
        assert_eq!(encode(&json!("dashboard")), "dashboard");
        assert_eq!(encode(&json!({"time": "now"})), "(time:now)");
    }

    #[test]
    fn timestamps_are_quoted() {
        assert_eq!(
            encode(&json!("2025-01-01T00:00:00Z")),
            "'2025-01-01T00:00:00Z'"
        );
    }

    #[test]
    fn quotes_and_bangs_are_escaped() {
        assert_eq!(encode(&json!("it's!")), "'it!'s!!'");
    }

    #[test]
    fn scalars_and_arrays() {
        assert_eq!(encode(&json!(null)), "!n");
        assert_eq!(encode(&json!(true)), "!t");
        assert_eq!(encode(&json!(false)), "!f");
        assert_eq!(encode(&json!(42)), "42");
        assert_eq!(encode(&json!([1, "a b"])), "!(1,'a b')");
    }

    #[test]
    fn time_range_shape_matches_kibana_g_param() {
        let value = json!({
            "time": {
                "from": "2025-01-01T00:00:00Z",
                "to": "2025-01-08T00:00:00Z"
            }
        });
        assert_eq!(
            encode(&value),
            "(time:(from:'2025-01-01T00:00:00Z',to:'2025-01-08T00:00:00Z'))"
        );
    }
}
