//! Format conversion between structured-data text formats and an in-memory
//! JSON-style value tree.
//!
//! ```
//! use serde_json::json;
//!
//! let value = fmtcodec::decode("yaml", "a: 1\nb:\n  - 2\n  - 3\n", None).unwrap();
//! assert_eq!(value, json!({"a": 1, "b": [2, 3]}));
//!
//! let text = fmtcodec::encode(&value, "json5").unwrap();
//! assert_eq!(fmtcodec::decode("json5", text.as_bytes(), None).unwrap(), value);
//! ```

pub mod batch;
pub mod codec;
pub mod file;
pub mod registry;
pub mod revive;

pub use codec::{file_encoding, get_codec, Codec, CodecError, Encoded, Encoding, FormatId};
pub use registry::{convert, decode, default_registry, encode, Error, Registry, Result};
pub use revive::Reviver;
