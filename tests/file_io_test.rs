use fmtcodec::file::{read_value, write_value};
use fmtcodec::{Error, Registry};
use serde_json::json;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_write_then_read_by_extension() {
    let dir = tempdir().unwrap();
    let reg = Registry::builtin();
    let v = json!({"name": "demo", "tags": ["a", "b"], "nested": {"n": 1}});

    for ext in ["json", "json5", "yaml", "cson"] {
        let path = dir.path().join(format!("data.{ext}"));
        write_value(&reg, &v, &path, None).unwrap();
        assert_eq!(read_value(&reg, &path, None).unwrap(), v, "{ext}");
    }
}

#[test]
fn test_explicit_format_overrides_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.conf");
    fs::write(&path, "[server]\nport=8080\n").unwrap();

    let reg = Registry::builtin();
    assert_eq!(read_value(&reg, &path, Some("ini")).unwrap(), json!({"server": {"port": "8080"}}));
    assert!(matches!(read_value(&reg, &path, None), Err(Error::UnknownFormat(f)) if f == "conf"));
}

#[test]
fn test_uppercase_extension_is_accepted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("DATA.YAML");
    let reg = Registry::builtin();
    write_value(&reg, &json!({"k": [1, 2]}), &path, None).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "k:\n- 1\n- 2\n");
    assert_eq!(read_value(&reg, &path, None).unwrap(), json!({"k": [1, 2]}));
}

#[test]
fn test_xlsx_file_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    let reg = Registry::builtin();
    let v = json!({"Sheet1": [{"id": 1, "label": "first"}, {"id": 2, "label": "second"}]});

    write_value(&reg, &v, &path, None).unwrap();
    assert!(fs::read(&path).unwrap().starts_with(b"PK"));
    assert_eq!(read_value(&reg, &path, None).unwrap(), v);
}

#[test]
fn test_non_utf8_text_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, [0xffu8, 0xfe, 0x00]).unwrap();
    assert!(matches!(read_value(&Registry::builtin(), &path, None), Err(Error::Io(_))));
}

#[test]
fn test_missing_file_and_missing_extension() {
    let dir = tempdir().unwrap();
    let reg = Registry::builtin();
    assert!(matches!(read_value(&reg, dir.path().join("absent.json"), None), Err(Error::Io(_))));
    assert!(matches!(write_value(&reg, &json!(1), dir.path().join("noext"), None), Err(Error::MissingFormat)));
}
