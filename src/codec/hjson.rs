//! Hjson codec.
//!
//! Decoding goes through `deser-hjson`.  There is no maintained Hjson
//! writer, so encode emits 2-space pretty JSON, which every Hjson reader
//! accepts.

use serde_json::Value;

use super::{utf8, Codec, CodecError, Encoded};

pub struct HjsonCodec;

impl Codec for HjsonCodec {
    fn name(&self) -> &'static str { "hjson" }

    fn encode(&self, value: &Value) -> Result<Encoded, CodecError> {
        Ok(Encoded::Text(serde_json::to_string_pretty(value)?))
    }

    fn decode(&self, input: &[u8]) -> Result<Value, CodecError> {
        Ok(deser_hjson::from_str(utf8(input)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_quoteless_hjson() {
        let text = "{\n  # comment\n  name: fmtcodec\n  tags: [\n    a\n    b\n  ]\n  count: 3\n}";
        let value = HjsonCodec.decode(text.as_bytes()).unwrap();
        assert_eq!(value["name"], json!("fmtcodec"));
        assert_eq!(value["tags"], json!(["a", "b"]));
        assert_eq!(value["count"].as_f64(), Some(3.0));
    }

    #[test]
    fn roundtrip_through_json_output() {
        let v = json!({"b": ["x", "y"], "s": "text", "t": true, "n": null});
        let text = HjsonCodec.encode(&v).unwrap();
        assert_eq!(HjsonCodec.decode(text.as_bytes()).unwrap(), v);
    }
}
