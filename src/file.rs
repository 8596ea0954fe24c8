//! Whole-file helpers.
//!
//! The format defaults to the path's extension.  Text formats are read with
//! `read_to_string`, so a non-UTF-8 file fails with an I/O error before any
//! codec sees it; binary formats are read as raw bytes.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::codec::{file_encoding, Encoding};
use crate::registry::{normalize, Error, Registry, Result};

/// The format named by `explicit`, or else by the file extension
/// (lowercased).  Neither present → `MissingFormat`.
pub fn format_of(path: &Path, explicit: Option<&str>) -> Result<String> {
    if let Some(format) = explicit {
        return Ok(format.to_string());
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_lowercase)
        .ok_or(Error::MissingFormat)
}

/// Read and decode the file at `path`.
pub fn read_value(registry: &Registry, path: impl AsRef<Path>, format: Option<&str>) -> Result<Value> {
    let path = path.as_ref();
    let format = format_of(path, format)?;
    let value = match file_encoding(&normalize(&format)) {
        Encoding::Utf8 => {
            let text = fs::read_to_string(path)?;
            debug!(path = %path.display(), format = %format, bytes = text.len(), "read text file");
            registry.decode(&format, text, None)?
        }
        Encoding::Binary => {
            let bytes = fs::read(path)?;
            debug!(path = %path.display(), format = %format, bytes = bytes.len(), "read binary file");
            registry.decode(&format, bytes, None)?
        }
    };
    Ok(value)
}

/// Encode `value` and write it to `path`, replacing any existing file.
pub fn write_value(registry: &Registry, value: &Value, path: impl AsRef<Path>, format: Option<&str>) -> Result<()> {
    let path = path.as_ref();
    let format = format_of(path, format)?;
    let encoded = registry.encode(value, &format)?;
    debug!(path = %path.display(), format = %format, bytes = encoded.as_bytes().len(), "write file");
    fs::write(path, encoded.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_format_wins_over_extension() {
        assert_eq!(format_of(Path::new("a.txt"), Some("yaml")).unwrap(), "yaml");
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(format_of(Path::new("dir/Data.JSON5"), None).unwrap(), "json5");
    }

    #[test]
    fn no_extension_is_missing_format() {
        assert!(matches!(format_of(Path::new("Makefile"), None), Err(Error::MissingFormat)));
        assert!(matches!(format_of(Path::new("trailing."), None), Err(Error::MissingFormat)));
    }
}
