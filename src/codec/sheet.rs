//! Spreadsheet codecs (`xlsx`, `xls`).  Binary formats.
//!
//! A workbook maps to an object keyed by sheet name.  Each sheet is an array
//! of row objects: the first row is the header, and every later row becomes
//! `{header: cell}` with empty cells omitted.
//!
//! Reading goes through `calamine` for both formats.  Writing goes through
//! `rust_xlsxwriter`, which only produces the OOXML format, so `xls` is
//! decode-only.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xls, Xlsx};
use rust_xlsxwriter::Workbook;
use serde_json::{Map, Number, Value};

use super::{Codec, CodecError, Encoded, Encoding};

const DEFAULT_SHEET: &str = "Sheet1";

// ── Codecs ──────────────────────────────────────────────────────────────────

pub struct XlsxCodec;

impl Codec for XlsxCodec {
    fn name(&self) -> &'static str { "xlsx" }

    fn encoding(&self) -> Encoding { Encoding::Binary }

    fn encode(&self, value: &Value) -> Result<Encoded, CodecError> {
        Ok(Encoded::Binary(write_workbook(value)?))
    }

    fn decode(&self, input: &[u8]) -> Result<Value, CodecError> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(input))?;
        let mut sheets = Map::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            sheets.insert(name, rows_of(&range));
        }
        Ok(Value::Object(sheets))
    }
}

pub struct XlsCodec;

impl Codec for XlsCodec {
    fn name(&self) -> &'static str { "xls" }

    fn encoding(&self) -> Encoding { Encoding::Binary }

    fn encode(&self, _: &Value) -> Result<Encoded, CodecError> {
        Err(CodecError::Unsupported { format: "xls", operation: "encode" })
    }

    fn decode(&self, input: &[u8]) -> Result<Value, CodecError> {
        let mut workbook: Xls<_> = open_workbook_from_rs(Cursor::new(input))?;
        let mut sheets = Map::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            sheets.insert(name, rows_of(&range));
        }
        Ok(Value::Object(sheets))
    }
}

// ── Read ────────────────────────────────────────────────────────────────────

fn rows_of(range: &Range<Data>) -> Value {
    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(|c| c.to_string()).collect(),
        None        => return Value::Array(Vec::new()),
    };

    let records = rows
        .map(|cells| {
            let mut obj = Map::new();
            for (key, cell) in header.iter().zip(cells) {
                if let Some(value) = cell_value(cell) {
                    obj.insert(key.clone(), value);
                }
            }
            Value::Object(obj)
        })
        .collect();
    Value::Array(records)
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty       => None,
        Data::Int(i)      => Some(Value::from(*i)),
        Data::Float(f)    => Some(float(*f)),
        Data::Bool(b)     => Some(Value::Bool(*b)),
        Data::String(s)   => Some(Value::String(s.clone())),
        Data::DateTime(d) => Some(float(d.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        Data::Error(e)    => Some(Value::String(e.to_string())),
    }
}

/// Spreadsheets have a single numeric type; integral values come back as
/// integers.
fn float(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}

// ── Write ───────────────────────────────────────────────────────────────────

fn write_workbook(value: &Value) -> Result<Vec<u8>, CodecError> {
    let sheets: Vec<(&str, &Vec<Value>)> = match value {
        Value::Array(rows) => vec![(DEFAULT_SHEET, rows)],
        Value::Object(map) => map
            .iter()
            .map(|(name, rows)| {
                rows.as_array()
                    .map(|rows| (name.as_str(), rows))
                    .ok_or_else(|| unsupported(format!("sheet {name:?} must be an array of rows")))
            })
            .collect::<Result<_, _>>()?,
        _ => return Err(unsupported("top-level value must be an object of sheets or an array of rows".to_string())),
    };

    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)?;

        let header = header(rows)?;
        for (col, key) in header.iter().enumerate() {
            worksheet.write_string(0, col_index(col)?, key.as_str())?;
        }
        for (i, row) in rows.iter().enumerate() {
            let row_num = u32::try_from(i + 1).map_err(|_| unsupported("too many rows".to_string()))?;
            let Some(obj) = row.as_object() else { continue };
            for (col, key) in header.iter().enumerate() {
                let col = col_index(col)?;
                match obj.get(key) {
                    None | Some(Value::Null) => {}
                    Some(Value::Bool(b))     => { worksheet.write_boolean(row_num, col, *b)?; }
                    Some(Value::Number(n))   => {
                        let f = n.as_f64().unwrap_or_default();
                        worksheet.write_number(row_num, col, f)?;
                    }
                    Some(Value::String(s))   => { worksheet.write_string(row_num, col, s.as_str())?; }
                    Some(nested)             => { worksheet.write_string(row_num, col, nested.to_string())?; }
                }
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

fn header(rows: &[Value]) -> Result<Vec<String>, CodecError> {
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        let obj = row.as_object().ok_or_else(|| unsupported("rows must be objects".to_string()))?;
        for key in obj.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    Ok(keys)
}

fn col_index(col: usize) -> Result<u16, CodecError> {
    u16::try_from(col).map_err(|_| unsupported("too many columns".to_string()))
}

fn unsupported(reason: String) -> CodecError {
    CodecError::UnsupportedValue { format: "xlsx", reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn xlsx_roundtrip_preserves_rows() {
        let v = json!({
            "People": [
                {"name": "alice", "age": 30, "admin": true},
                {"name": "bob", "score": 1.5}
            ],
            "Empty": []
        });
        let bytes = XlsxCodec.encode(&v).unwrap();
        assert_eq!(bytes.encoding(), Encoding::Binary);
        assert_eq!(XlsxCodec.decode(bytes.as_bytes()).unwrap(), v);
    }

    #[test]
    fn bare_array_goes_to_default_sheet() {
        let bytes = XlsxCodec.encode(&json!([{"k": "v"}])).unwrap();
        assert_eq!(XlsxCodec.decode(bytes.as_bytes()).unwrap(), json!({"Sheet1": [{"k": "v"}]}));
    }

    #[test]
    fn xls_cannot_encode() {
        let err = XlsCodec.encode(&json!({})).unwrap_err();
        assert!(matches!(err, CodecError::Unsupported { format: "xls", operation: "encode" }));
    }

    #[test]
    fn garbage_input_surfaces_reader_error() {
        assert!(matches!(XlsxCodec.decode(b"not a zip").unwrap_err(), CodecError::XlsxRead(_)));
        assert!(matches!(XlsCodec.decode(b"not ole").unwrap_err(), CodecError::XlsRead(_)));
    }
}
