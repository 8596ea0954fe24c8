use serde_json::{Map, Value};

const INDENT: &str = "  ";

/// Serialize `value` as CSON text.
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(map) if !map.is_empty() => write_pairs(&mut out, map, 0),
        other => write_value(&mut out, other, 0),
    }
    out
}

/// One `key: value` line per entry, each starting at `level`.
fn write_pairs(out: &mut String, map: &Map<String, Value>, level: usize) {
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        indent(out, level);
        write_key(out, key);
        out.push(':');
        match value {
            Value::Object(child) if !child.is_empty() => {
                out.push('\n');
                write_pairs(out, child, level + 1);
            }
            other => {
                out.push(' ');
                write_value(out, other, level);
            }
        }
    }
}

/// Write `value` at the current position; continuation lines are indented
/// relative to `level`.
fn write_value(out: &mut String, value: &Value, level: usize) {
    match value {
        Value::Null      => out.push_str("null"),
        Value::Bool(b)   => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for item in items {
                indent(out, level + 1);
                write_value(out, item, level + 1);
                out.push('\n');
            }
            indent(out, level);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{\n");
            write_pairs(out, map, level + 1);
            out.push('\n');
            indent(out, level);
            out.push('}');
        }
    }
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn write_key(out: &mut String, key: &str) {
    if is_identifier(key) {
        out.push_str(key);
    } else {
        write_string(out, key);
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn write_string(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\'       => out.push_str("\\\\"),
            '\''       => out.push_str("\\'"),
            '\n'       => out.push_str("\\n"),
            '\r'       => out.push_str("\\r"),
            '\t'       => out.push_str("\\t"),
            '\u{8}'    => out.push_str("\\b"),
            '\u{c}'    => out.push_str("\\f"),
            c if c < ' ' || c == '\u{7f}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c          => out.push(c),
        }
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_inside_arrays_get_braces() {
        let text = to_string(&json!({"list": [{"a": 1}, []]}));
        assert_eq!(text, "list: [\n  {\n    a: 1\n  }\n  []\n]");
    }

    #[test]
    fn non_identifier_keys_are_quoted() {
        let text = to_string(&json!({"ok_key": 1, "with-dash": 2, "9lives": 3}));
        assert_eq!(text, "ok_key: 1\n'with-dash': 2\n'9lives': 3");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(to_string(&json!("a'b\\c\n\u{1}")), "'a\\'b\\\\c\\n\\u0001'");
    }
}
