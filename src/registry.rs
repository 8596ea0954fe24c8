//! Codec registry: name → codec dispatch.
//!
//! # Name normalization
//! The entry points normalize format names differently, and the difference
//! is part of the contract:
//!
//! | entry point | leading `.` stripped | lowercased |
//! |-------------|----------------------|------------|
//! | `encode`    | yes                  | **no**     |
//! | `decode`    | yes                  | yes        |
//! | `convert`   | yes                  | yes (via `decode`) |
//!
//! So `decode("JSON", ..)` finds the JSON codec but `encode(v, "JSON")`
//! fails with [`Error::UnknownFormat`].
//!
//! # Lifecycle
//! A registry is assembled once and then only read.  It is `Send + Sync`;
//! share it by reference.  [`default_registry`] is a lazily built instance
//! holding every built-in codec, used by the crate-level free functions.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use crate::codec::{get_codec, Codec, CodecError, Encoded, FormatId};
use crate::revive::{revive, Reviver};

// ── Error type ──────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum Error {
    /// No registered codec has this name.  Carries the name as requested.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),
    #[error("Missing format")]
    MissingFormat,
    /// A reviver was passed to a codec that cannot honor it.
    #[error("Format {0} does not support a reviver")]
    ReviverUnsupported(String),
    /// The codec's own failure, unchanged.
    #[error(transparent)]
    Conversion(#[from] CodecError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// ── Registry ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Registry {
    codecs: HashMap<&'static str, Box<dyn Codec>>,
    /// Registration order, for listing.
    order:  Vec<&'static str>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in codec.
    pub fn builtin() -> Self {
        FormatId::ALL.into_iter().fold(Self::new(), |reg, id| reg.with(get_codec(id)))
    }

    /// Only the named built-ins.  Unknown names fail with `UnknownFormat`.
    pub fn only(names: &[&str]) -> Result<Self> {
        names.iter().try_fold(Self::new(), |reg, name| {
            let id = FormatId::from_name(name).ok_or_else(|| Error::UnknownFormat(name.to_string()))?;
            Ok(reg.with(get_codec(id)))
        })
    }

    /// Add `codec`, replacing any codec already registered under its name.
    pub fn with(mut self, codec: Box<dyn Codec>) -> Self {
        let name = codec.name();
        if self.codecs.insert(name, codec).is_none() {
            self.order.push(name);
        }
        self
    }

    /// Exact-name lookup; no normalization.
    pub fn get(&self, name: &str) -> Option<&dyn Codec> {
        self.codecs.get(name).map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn formats(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Encode `value` in `format`.  Only a leading `.` is stripped; the name
    /// is otherwise matched exactly.
    pub fn encode(&self, value: &Value, format: &str) -> Result<Encoded> {
        let name = strip_dot(format);
        let codec = self.get(name).ok_or_else(|| Error::UnknownFormat(format.to_string()))?;
        debug!(format = name, "encode");
        Ok(codec.encode(value)?)
    }

    /// Decode `input` as `format` (dot-stripped, lowercased), then apply
    /// `reviver` if one is given.
    pub fn decode(&self, format: &str, input: impl AsRef<[u8]>, reviver: Option<Reviver<'_>>) -> Result<Value> {
        let name = normalize(format);
        let codec = self.get(&name).ok_or_else(|| Error::UnknownFormat(format.to_string()))?;
        if reviver.is_some() && !codec.supports_reviver() {
            return Err(Error::ReviverUnsupported(name));
        }

        let input = input.as_ref();
        debug!(format = %name, bytes = input.len(), "decode");
        let value = codec.decode(input)?;
        Ok(match reviver {
            Some(reviver) => {
                trace!(format = %name, "applying reviver");
                revive(value, reviver)
            }
            None => value,
        })
    }

    /// Legacy alias for [`Registry::decode`] that rejects an empty format.
    pub fn convert(&self, input: impl AsRef<[u8]>, format: &str) -> Result<Value> {
        if strip_dot(format).is_empty() {
            return Err(Error::MissingFormat);
        }
        self.decode(format, input, None)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("formats", &self.order).finish()
    }
}

fn strip_dot(format: &str) -> &str {
    format.strip_prefix('.').unwrap_or(format)
}

/// The decode-side normalization: dot-stripped and lowercased.
pub fn normalize(format: &str) -> String {
    strip_dot(format).to_lowercase()
}

// ── Process-wide default ────────────────────────────────────────────────────

/// The shared registry of every built-in codec.
pub fn default_registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::builtin)
}

/// [`Registry::encode`] on the [`default_registry`].
pub fn encode(value: &Value, format: &str) -> Result<Encoded> {
    default_registry().encode(value, format)
}

/// [`Registry::decode`] on the [`default_registry`].
pub fn decode(format: &str, input: impl AsRef<[u8]>, reviver: Option<Reviver<'_>>) -> Result<Value> {
    default_registry().decode(format, input, reviver)
}

/// [`Registry::convert`] on the [`default_registry`].
pub fn convert(input: impl AsRef<[u8]>, format: &str) -> Result<Value> {
    default_registry().convert(input, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts decode calls and echoes a fixed value.
    #[derive(Default)]
    struct Probe {
        calls: Arc<AtomicUsize>,
    }

    impl Codec for Probe {
        fn name(&self) -> &'static str { "probe" }

        fn encode(&self, _: &Value) -> std::result::Result<Encoded, CodecError> {
            Ok(Encoded::Text("probe".to_string()))
        }

        fn decode(&self, _: &[u8]) -> std::result::Result<Value, CodecError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"probe": true}))
        }
    }

    #[test]
    fn builtin_lists_every_format_in_order() {
        let names: Vec<&str> = Registry::builtin().formats().collect();
        assert_eq!(
            names,
            vec!["cson", "csv", "hjson", "ini", "json", "json5", "xls", "xlsx", "xml", "yaml"]
        );
    }

    #[test]
    fn subset_registry_rejects_missing_formats() {
        let reg = Registry::only(&["json"]).unwrap();
        assert_eq!(reg.len(), 1);
        assert!(matches!(reg.decode("yaml", "a: 1", None), Err(Error::UnknownFormat(f)) if f == "yaml"));
        assert!(matches!(Registry::only(&["bogus"]), Err(Error::UnknownFormat(f)) if f == "bogus"));
    }

    #[test]
    fn custom_codec_is_dispatched_once_by_convert() {
        let calls = Arc::new(AtomicUsize::new(0));
        let reg = Registry::new().with(Box::new(Probe { calls: Arc::clone(&calls) }));
        assert_eq!(reg.convert("anything", ".PROBE").unwrap(), json!({"probe": true}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(reg.encode(&json!(null), "probe").unwrap().as_text(), Some("probe"));
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let first = Probe::default();
        let second = Probe::default();
        let second_calls = Arc::clone(&second.calls);

        let reg = Registry::builtin().with(Box::new(first));
        let before = reg.len();
        let reg = reg.with(Box::new(second));
        assert_eq!(reg.len(), before);

        reg.decode("probe", "", None).unwrap();
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_format_is_missing_for_convert_only() {
        let reg = Registry::builtin();
        assert!(matches!(reg.convert("{}", ""), Err(Error::MissingFormat)));
        assert!(matches!(reg.convert("{}", "."), Err(Error::MissingFormat)));
        assert!(matches!(reg.decode("", "{}", None), Err(Error::UnknownFormat(f)) if f.is_empty()));
    }

    #[test]
    fn reviver_on_unsupported_codec_is_an_error() {
        let reviver = |_: &str, v: Value| Some(v);
        let err = Registry::builtin().decode("YAML", "a: 1", Some(&reviver)).unwrap_err();
        assert!(matches!(err, Error::ReviverUnsupported(f) if f == "yaml"));
    }

    #[test]
    fn codec_failures_pass_through_unchanged() {
        let err = Registry::builtin().decode("json", "{", None).unwrap_err();
        assert!(matches!(err, Error::Conversion(CodecError::Json(_))));
    }
}
