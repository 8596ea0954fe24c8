//! JSON codec.
//!
//! Encode always pretty-prints with a 4-space indent.  Decode tolerates
//! `// line` and `/* block */` comments: they are blanked out (replaced by
//! spaces, newlines kept) before the text reaches `serde_json`, so error
//! positions still point at the original line and column.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use super::{utf8, Codec, CodecError, Encoded};

const INDENT: &[u8] = b"    ";

pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str { "json" }

    fn supports_reviver(&self) -> bool { true }

    fn encode(&self, value: &Value) -> Result<Encoded, CodecError> {
        let mut out = Vec::new();
        let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
        value.serialize(&mut ser)?;
        // serde_json only ever emits UTF-8.
        Ok(Encoded::Text(String::from_utf8_lossy(&out).into_owned()))
    }

    fn decode(&self, input: &[u8]) -> Result<Value, CodecError> {
        let text = strip_comments(utf8(input)?);
        Ok(serde_json::from_str(&text)?)
    }
}

/// Replace JSON comments with whitespace, leaving string literals intact.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                chars.next();
                out.push_str("  ");
                while let Some(&next) = chars.peek() {
                    if next == '\n' || next == '\r' {
                        break;
                    }
                    chars.next();
                    out.push(' ');
                }
            }
            ('/', Some('*')) => {
                chars.next();
                out.push_str("  ");
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        out.push(' ');
                        break;
                    }
                    out.push(if next == '\n' || next == '\r' { next } else { ' ' });
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}
