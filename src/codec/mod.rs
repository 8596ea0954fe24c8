//! Codec trait, built-in format identities, and the codec factory.
//!
//! # Identity rules
//! Every codec is identified by its format name: a lowercase ASCII string
//! such as `"json"` or `"yaml"`.  The name is the only lookup key the
//! registry uses.  There are no aliases (`yml` is not `yaml`) and no fuzzy
//! matching.
//!
//! # Text vs binary
//! Spreadsheet formats (`xls`, `xlsx`) are binary end to end; every other
//! format is UTF-8 text.  The choice is keyed purely off the format name
//! (see [`file_encoding`]) so an I/O layer can pick `read_to_string` or
//! `read` before any codec is consulted.
//!
//! # Failures
//! Codecs never wrap or reinterpret their library's errors beyond lifting
//! them into [`CodecError`].  The registry forwards a `CodecError`
//! unchanged.

use serde_json::Value;
use thiserror::Error;

pub mod cson;
pub mod csv;
pub mod hjson;
pub mod ini;
pub mod json;
pub mod json5;
pub mod sheet;
pub mod xml;
pub mod yaml;

pub use self::cson::CsonCodec;
pub use self::csv::CsvCodec;
pub use self::hjson::HjsonCodec;
pub use self::ini::IniCodec;
pub use self::json::JsonCodec;
pub use self::json5::Json5Codec;
pub use self::sheet::{XlsCodec, XlsxCodec};
pub use self::xml::XmlCodec;
pub use self::yaml::YamlCodec;

// ── Encoding ────────────────────────────────────────────────────────────────

/// How a format's encoded form is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// UTF-8 text.
    Utf8,
    /// Raw bytes; must not pass through a text decoder.
    Binary,
}

/// Format names whose encoded form is binary.
pub const BINARY_FORMATS: &[&str] = &["xls", "xlsx"];

/// Storage encoding for a format name.
///
/// The name is normalized the same way `decode` normalizes it (leading `.`
/// stripped, lowercased), so `".XLSX"` and `"xlsx"` agree.  Unknown names
/// are treated as text.
pub fn file_encoding(format: &str) -> Encoding {
    let name = format.strip_prefix('.').unwrap_or(format).to_ascii_lowercase();
    if BINARY_FORMATS.contains(&name.as_str()) {
        Encoding::Binary
    } else {
        Encoding::Utf8
    }
}

// ── Encoded output ──────────────────────────────────────────────────────────

/// The result of encoding a value: text for text formats, bytes for binary
/// ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Text(String),
    Binary(Vec<u8>),
}

impl Encoded {
    pub fn encoding(&self) -> Encoding {
        match self {
            Encoded::Text(_)   => Encoding::Utf8,
            Encoded::Binary(_) => Encoding::Binary,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Encoded::Text(s)   => s.as_bytes(),
            Encoded::Binary(b) => b,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Encoded::Text(s)   => s.into_bytes(),
            Encoded::Binary(b) => b,
        }
    }

    /// Borrow the text, or `None` for binary output.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Encoded::Text(s)   => Some(s),
            Encoded::Binary(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Encoded::Text(s)   => Some(s),
            Encoded::Binary(_) => None,
        }
    }
}

// ── FormatId enum ───────────────────────────────────────────────────────────

/// The closed set of formats this build ships codecs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    Cson,
    Csv,
    Hjson,
    Ini,
    Json,
    Json5,
    Xls,
    Xlsx,
    Xml,
    Yaml,
}

impl FormatId {
    /// Every built-in format, in registration order.
    pub const ALL: [FormatId; 10] = [
        FormatId::Cson,
        FormatId::Csv,
        FormatId::Hjson,
        FormatId::Ini,
        FormatId::Json,
        FormatId::Json5,
        FormatId::Xls,
        FormatId::Xlsx,
        FormatId::Xml,
        FormatId::Yaml,
    ];

    /// The registry key for this format.
    pub fn name(self) -> &'static str {
        match self {
            FormatId::Cson  => "cson",
            FormatId::Csv   => "csv",
            FormatId::Hjson => "hjson",
            FormatId::Ini   => "ini",
            FormatId::Json  => "json",
            FormatId::Json5 => "json5",
            FormatId::Xls   => "xls",
            FormatId::Xlsx  => "xlsx",
            FormatId::Xml   => "xml",
            FormatId::Yaml  => "yaml",
        }
    }

    /// Exact-name lookup.  The caller is responsible for normalization.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "cson"  => Some(FormatId::Cson),
            "csv"   => Some(FormatId::Csv),
            "hjson" => Some(FormatId::Hjson),
            "ini"   => Some(FormatId::Ini),
            "json"  => Some(FormatId::Json),
            "json5" => Some(FormatId::Json5),
            "xls"   => Some(FormatId::Xls),
            "xlsx"  => Some(FormatId::Xlsx),
            "xml"   => Some(FormatId::Xml),
            "yaml"  => Some(FormatId::Yaml),
            _       => None,
        }
    }
}

// ── Error type ──────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("JSON5 error: {0}")]
    Json5(#[from] ::json5::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("INI error: {0}")]
    Ini(#[from] ::ini::ParseError),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("Hjson error: {0}")]
    Hjson(#[from] deser_hjson::Error),
    #[error("XLSX read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),
    #[error("XLS read error: {0}")]
    XlsRead(#[from] calamine::XlsError),
    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),
    #[error("CSON error at {line}:{col}: {msg}")]
    Cson { line: usize, col: usize, msg: String },
    #[error("Input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// The value has a shape the format cannot represent.
    #[error("{format} cannot encode this value: {reason}")]
    UnsupportedValue { format: &'static str, reason: String },
    /// The format has no implementation of the requested direction.
    #[error("{format} does not support {operation}")]
    Unsupported { format: &'static str, operation: &'static str },
}

// ── Codec trait ─────────────────────────────────────────────────────────────

pub trait Codec: Send + Sync {
    /// Registry key; lowercase.
    fn name(&self) -> &'static str;

    fn encoding(&self) -> Encoding {
        Encoding::Utf8
    }

    /// Whether a reviver may be applied to this codec's decode output.
    fn supports_reviver(&self) -> bool {
        false
    }

    fn encode(&self, value: &Value) -> Result<Encoded, CodecError>;
    fn decode(&self, input: &[u8]) -> Result<Value, CodecError>;
}

/// Borrow `input` as UTF-8 for text codecs.
pub(crate) fn utf8(input: &[u8]) -> Result<&str, CodecError> {
    Ok(std::str::from_utf8(input)?)
}

// ── Factory ─────────────────────────────────────────────────────────────────

/// Resolve a built-in format to its codec.
pub fn get_codec(id: FormatId) -> Box<dyn Codec> {
    match id {
        FormatId::Cson  => Box::new(CsonCodec),
        FormatId::Csv   => Box::new(CsvCodec),
        FormatId::Hjson => Box::new(HjsonCodec),
        FormatId::Ini   => Box::new(IniCodec),
        FormatId::Json  => Box::new(JsonCodec),
        FormatId::Json5 => Box::new(Json5Codec),
        FormatId::Xls   => Box::new(XlsCodec),
        FormatId::Xlsx  => Box::new(XlsxCodec),
        FormatId::Xml   => Box::new(XmlCodec),
        FormatId::Yaml  => Box::new(YamlCodec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_back_to_ids() {
        for id in FormatId::ALL {
            assert_eq!(FormatId::from_name(id.name()), Some(id));
            assert_eq!(get_codec(id).name(), id.name());
        }
        assert_eq!(FormatId::from_name("yml"), None);
        assert_eq!(FormatId::from_name("JSON"), None);
    }

    #[test]
    fn encoding_follows_format_name() {
        assert_eq!(file_encoding("xlsx"), Encoding::Binary);
        assert_eq!(file_encoding(".XLS"), Encoding::Binary);
        assert_eq!(file_encoding("json"), Encoding::Utf8);
        assert_eq!(file_encoding("unknown"), Encoding::Utf8);
        for id in FormatId::ALL {
            assert_eq!(get_codec(id).encoding(), file_encoding(id.name()));
        }
    }

    #[test]
    fn reviver_capability_flags() {
        let supporting: Vec<&str> = FormatId::ALL
            .iter()
            .map(|id| get_codec(*id))
            .filter(|c| c.supports_reviver())
            .map(|c| c.name())
            .collect();
        assert_eq!(supporting, vec!["cson", "json", "json5"]);
    }
}
