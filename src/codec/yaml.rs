//! YAML codec restricted to the safe schema.
//!
//! Plain YAML data (mappings, sequences, scalars) is accepted.  Tagged nodes
//! (`!foo`, `!!python/object`, ...) are rejected instead of being turned
//! into application objects.  Non-string mapping keys are stringified.

use serde_json::{Map, Value};

use super::{utf8, Codec, CodecError, Encoded};

pub struct YamlCodec;

impl Codec for YamlCodec {
    fn name(&self) -> &'static str { "yaml" }

    fn encode(&self, value: &Value) -> Result<Encoded, CodecError> {
        Ok(Encoded::Text(serde_yaml::to_string(value)?))
    }

    fn decode(&self, input: &[u8]) -> Result<Value, CodecError> {
        let doc: serde_yaml::Value = serde_yaml::from_str(utf8(input)?)?;
        from_yaml(doc)
    }
}

/// Convert a `serde_yaml::Value` into the shared value model.
fn from_yaml(value: serde_yaml::Value) -> Result<Value, CodecError> {
    Ok(match value {
        serde_yaml::Value::Null      => Value::Null,
        serde_yaml::Value::Bool(b)   => Value::Bool(b),
        serde_yaml::Value::Number(n) => number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(from_yaml).collect::<Result<_, _>>()?)
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (k, v) in mapping {
                map.insert(key(k)?, from_yaml(v)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => {
            return Err(CodecError::UnsupportedValue {
                format: "yaml",
                reason: format!("tag {} is outside the safe schema", tagged.tag),
            });
        }
    })
}

fn number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        // NaN and infinities have no JSON representation.
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

fn key(k: serde_yaml::Value) -> Result<String, CodecError> {
    match k {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b)   => Ok(b.to_string()),
        serde_yaml::Value::Null      => Ok("null".to_string()),
        _ => Err(CodecError::UnsupportedValue {
            format: "yaml",
            reason: "mapping keys must be scalars".to_string(),
        }),
    }
}
