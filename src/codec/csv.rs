//! CSV codec.
//!
//! Decode reads the first record as the header and yields an array of
//! objects, one per following record, with every cell as a string.
//!
//! Encode accepts an array of objects (header = union of keys in order of
//! first appearance) or an array of arrays (written without a header).
//! `null` and missing keys become empty cells; nested values are written as
//! JSON text.

use serde_json::{Map, Value};

use super::{Codec, CodecError, Encoded};

pub struct CsvCodec;

impl Codec for CsvCodec {
    fn name(&self) -> &'static str { "csv" }

    fn encode(&self, value: &Value) -> Result<Encoded, CodecError> {
        let rows = value.as_array().ok_or_else(|| unsupported("top-level value must be an array"))?;
        let mut writer = ::csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());

        if rows.iter().all(Value::is_array) {
            for row in rows {
                let cells: Vec<String> = row.as_array().into_iter().flatten().map(cell).collect();
                writer.write_record(&cells)?;
            }
        } else {
            let header = header(rows)?;
            writer.write_record(&header)?;
            for row in rows {
                // `header` already rejected non-object rows.
                let Some(obj) = row.as_object() else { continue };
                let cells: Vec<String> = header
                    .iter()
                    .map(|k| obj.get(k).map(cell).unwrap_or_default())
                    .collect();
                writer.write_record(&cells)?;
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| unsupported(&e.error().to_string()))?;
        Ok(Encoded::Text(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn decode(&self, input: &[u8]) -> Result<Value, CodecError> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut obj = Map::new();
            for (i, field) in record.iter().enumerate() {
                if let Some(name) = headers.get(i) {
                    obj.insert(name.clone(), Value::String(field.to_string()));
                }
            }
            rows.push(Value::Object(obj));
        }
        Ok(Value::Array(rows))
    }
}

fn unsupported(reason: &str) -> CodecError {
    CodecError::UnsupportedValue { format: "csv", reason: reason.to_string() }
}

/// Union of object keys, in order of first appearance.
fn header(rows: &[Value]) -> Result<Vec<String>, CodecError> {
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        let obj = row
            .as_object()
            .ok_or_else(|| unsupported("rows must all be objects or all be arrays"))?;
        for key in obj.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    Ok(keys)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null      => String::new(),
        Value::String(s) => s.clone(),
        other            => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_uses_header_row() {
        let v = CsvCodec.decode(b"name,age\nalice,30\nbob,\n").unwrap();
        assert_eq!(v, json!([{"name": "alice", "age": "30"}, {"name": "bob", "age": ""}]));
    }

    #[test]
    fn encode_objects_with_union_header() {
        let v = json!([{"a": 1, "b": "x,y"}, {"c": true, "a": null}]);
        let text = CsvCodec.encode(&v).unwrap().into_text().unwrap();
        assert_eq!(text, "a,b,c\n1,\"x,y\",\n,,true\n");
    }

    #[test]
    fn encode_arrays_without_header() {
        let text = CsvCodec.encode(&json!([[1, 2], ["a", [3]]])).unwrap().into_text().unwrap();
        assert_eq!(text, "1,2\na,[3]\n");
    }

    #[test]
    fn string_rows_roundtrip() {
        let v = json!([{"k": "v1", "n": "line\nbreak"}, {"k": "v2", "n": "\"quoted\""}]);
        let text = CsvCodec.encode(&v).unwrap();
        assert_eq!(CsvCodec.decode(text.as_bytes()).unwrap(), v);
    }

    #[test]
    fn mixed_rows_are_rejected() {
        let err = CsvCodec.encode(&json!([{"a": 1}, [1]])).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedValue { format: "csv", .. }));
    }
}
