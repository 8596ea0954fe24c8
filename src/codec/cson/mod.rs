//! CSON (CoffeeScript Object Notation) codec.
//!
//! No Rust crate reads or writes CSON, so this module carries a small
//! reader and writer for its data subset:
//!
//! - implicit (brace-less) objects laid out by indentation, at the top
//!   level, as values of keys, and as array elements;
//! - `{}` objects and `[]` arrays with commas or newlines as separators;
//! - `'single'`, `"double"`, `'''block'''` and `"""block"""` strings
//!   (double-quoted strings are taken literally; there is no
//!   interpolation);
//! - decimal, hex (`0x`), octal (`0o`) and binary (`0b`) numbers;
//! - `true`/`yes`/`on`, `false`/`no`/`off`, `null`/`undefined`;
//! - `#` line comments and `###` block comments.
//!
//! The writer emits a brace-less top-level object, 2-space indentation,
//! single-quoted strings, and braces only for objects inside arrays.

mod parse;
mod write;

use serde_json::Value;

use super::{utf8, Codec, CodecError, Encoded};

pub use self::parse::from_str;
pub use self::write::to_string;

pub struct CsonCodec;

impl Codec for CsonCodec {
    fn name(&self) -> &'static str { "cson" }

    fn supports_reviver(&self) -> bool { true }

    fn encode(&self, value: &Value) -> Result<Encoded, CodecError> {
        Ok(Encoded::Text(to_string(value)))
    }

    fn decode(&self, input: &[u8]) -> Result<Value, CodecError> {
        from_str(utf8(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_uses_two_space_indent() {
        let v = json!({"a": 1, "b": [2, 3], "c": {"d": "x"}});
        let text = CsonCodec.encode(&v).unwrap().into_text().unwrap();
        assert_eq!(text, "a: 1\nb: [\n  2\n  3\n]\nc:\n  d: 'x'");
    }

    #[test]
    fn roundtrip_mixed_document() {
        let v = json!({
            "name": "it's \"quoted\"\nand multi-line",
            "version": 1.25,
            "negative": -7,
            "flags": [true, false, null],
            "empty_list": [],
            "empty_map": {},
            "nested": {"deeper": {"key with spaces": "v", "0": 0}},
            "rows": [{"id": 1, "tags": ["a"]}, [1, [2]], "plain"]
        });
        let text = CsonCodec.encode(&v).unwrap();
        assert_eq!(CsonCodec.decode(text.as_bytes()).unwrap(), v);
    }

    #[test]
    fn top_level_scalars_and_arrays() {
        for v in [json!("text"), json!(42), json!([1, {"a": 2}]), json!({})] {
            let text = CsonCodec.encode(&v).unwrap();
            assert_eq!(CsonCodec.decode(text.as_bytes()).unwrap(), v);
        }
    }
}
