//! INI codec with the flat-key layout of the node `ini` package.
//!
//! # Encode
//! - Top-level scalars are written to the general section as `key=value`.
//! - Arrays are written as one `key[]=item` line per item.
//! - Nested objects become sections named by their dotted path
//!   (`{"a": {"b": {"c": 1}}}` → `[a.b]` / `c=1`).  A section whose only
//!   members are objects gets no header of its own.
//! - Non-string scalars are written in their JSON spelling; objects and
//!   arrays that appear inside arrays are written as JSON text.
//! - Strings are written raw.  A value wrapped in double quotes loses the
//!   quotes on read, and leading or trailing whitespace is trimmed.
//! - An empty array writes no lines at all, so the key is gone on read.
//!   Empty objects vanish the same way.
//!
//! # Decode
//! - Section names are split on `.` into nested objects.
//! - Keys ending in `[]` collect into arrays.
//! - `true`, `false` and `null` become booleans and null; every other
//!   value stays a string.
//!
//! Line-level syntax (quoting, escapes, comments) is handled by `rust-ini`.

use ::ini::{EscapePolicy, Ini, WriteOption};
use serde_json::{Map, Value};

use super::{utf8, Codec, CodecError, Encoded};

const ARRAY_SUFFIX: &str = "[]";

pub struct IniCodec;

impl Codec for IniCodec {
    fn name(&self) -> &'static str { "ini" }

    fn encode(&self, value: &Value) -> Result<Encoded, CodecError> {
        let root = value.as_object().ok_or_else(|| CodecError::UnsupportedValue {
            format: "ini",
            reason: "top-level value must be an object".to_string(),
        })?;

        let mut ini = Ini::new();
        write_section(&mut ini, None, root);

        let mut out = Vec::new();
        let opt = WriteOption {
            escape_policy: EscapePolicy::Reserved,
            ..WriteOption::default()
        };
        ini.write_to_opt(&mut out, opt)
            .map_err(|e| CodecError::UnsupportedValue { format: "ini", reason: e.to_string() })?;
        Ok(Encoded::Text(String::from_utf8_lossy(&out).into_owned()))
    }

    fn decode(&self, input: &[u8]) -> Result<Value, CodecError> {
        let ini = Ini::load_from_str(utf8(input)?)?;
        let mut root = Map::new();

        for (section, props) in ini.iter() {
            let target = match section {
                Some(name) => section_map(&mut root, name),
                None       => &mut root,
            };
            for (key, raw) in props.iter() {
                let value = scalar(raw);
                match key.strip_suffix(ARRAY_SUFFIX) {
                    Some(base) => push_array(target, base, value),
                    None       => { target.insert(key.to_string(), value); }
                }
            }
        }
        Ok(Value::Object(root))
    }
}

// ── Encode helpers ──────────────────────────────────────────────────────────

fn write_section(ini: &mut Ini, section: Option<&str>, map: &Map<String, Value>) {
    let mut children = Vec::new();

    for (key, value) in map {
        match value {
            Value::Array(items) => {
                let key = format!("{key}{ARRAY_SUFFIX}");
                for item in items {
                    ini.with_section(section).add(key.as_str(), spell(item));
                }
            }
            Value::Object(child) => children.push((key, child)),
            scalar => {
                ini.with_section(section).add(key.as_str(), spell(scalar));
            }
        }
    }

    for (key, child) in children {
        let name = match section {
            Some(parent) => format!("{parent}.{key}"),
            None         => key.clone(),
        };
        write_section(ini, Some(&name), child);
    }
}

/// Text for a single INI value.
fn spell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other            => other.to_string(),
    }
}

// ── Decode helpers ──────────────────────────────────────────────────────────

/// Walk (creating as needed) the nested object for a dotted section name.
fn section_map<'a>(root: &'a mut Map<String, Value>, name: &str) -> &'a mut Map<String, Value> {
    let mut current = root;
    for part in name.split('.') {
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            // A scalar key and a section share a name; the section wins.
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just made an object"),
        };
    }
    current
}

fn push_array(target: &mut Map<String, Value>, key: &str, value: Value) {
    match target.get_mut(key) {
        Some(Value::Array(items)) => items.push(value),
        _ => {
            target.insert(key.to_string(), Value::Array(vec![value]));
        }
    }
}

fn scalar(raw: &str) -> Value {
    match raw {
        "true"  => Value::Bool(true),
        "false" => Value::Bool(false),
        "null"  => Value::Null,
        other   => Value::String(other.to_string()),
    }
}
