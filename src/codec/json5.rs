//! JSON5 codec.
//!
//! Encode writes compact JSON, which is valid JSON5 and keeps float
//! spelling exact (`1.0` stays a float, `1e300` keeps its exponent).
//! Decode goes through the `json5` crate.  Integers above `i64::MAX` do
//! not decode: the reader only parses signed 64-bit integers.

use serde_json::Value;

use super::{utf8, Codec, CodecError, Encoded};

pub struct Json5Codec;

impl Codec for Json5Codec {
    fn name(&self) -> &'static str { "json5" }

    fn supports_reviver(&self) -> bool { true }

    fn encode(&self, value: &Value) -> Result<Encoded, CodecError> {
        Ok(Encoded::Text(serde_json::to_string(value)?))
    }

    fn decode(&self, input: &[u8]) -> Result<Value, CodecError> {
        Ok(::json5::from_str(utf8(input)?)?)
    }
}
