//! XML codec using the xml2js value layout.
//!
//! # Layout
//! - The document decodes to `{root_name: root_value}`.
//! - Child elements are always collected into arrays, even when single.
//! - Attributes live in an object under `"$"`.
//! - Text lives under `"_"` when the element also has attributes or
//!   children; an element with only text decodes to that string.
//! - Whitespace-only text is dropped; an element with nothing left decodes
//!   to `""` (or to its whitespace).
//!
//! Encode is the inverse.  The root element takes its name from a
//! single-key top-level object; any other top-level value is wrapped in a
//! `<root>` element.  Output starts with an XML declaration and is indented
//! by 2 spaces.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use super::{utf8, Codec, CodecError, Encoded};

const ATTR_KEY: &str = "$";
const CHAR_KEY: &str = "_";
const DEFAULT_ROOT: &str = "root";

pub struct XmlCodec;

impl Codec for XmlCodec {
    fn name(&self) -> &'static str { "xml" }

    fn encode(&self, value: &Value) -> Result<Encoded, CodecError> {
        let single = value
            .as_object()
            .filter(|obj| obj.len() == 1)
            .and_then(|obj| obj.iter().next());
        let (root, body) = match single {
            Some((name, inner)) if name != ATTR_KEY && name != CHAR_KEY && !inner.is_array() => {
                (name.as_str(), inner)
            }
            _ => (DEFAULT_ROOT, value),
        };
        if body.is_array() {
            return Err(CodecError::UnsupportedValue {
                format: "xml",
                reason: "the root element cannot be an array".to_string(),
            });
        }

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        write_element(&mut writer, root, body)?;
        Ok(Encoded::Text(String::from_utf8_lossy(&writer.into_inner()).into_owned()))
    }

    fn decode(&self, input: &[u8]) -> Result<Value, CodecError> {
        let mut reader = Reader::from_str(utf8(input)?);
        let mut stack: Vec<Node> = Vec::new();
        let mut root: Option<(String, Value)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(Node::open(&e)?),
                Event::Empty(e) => {
                    let node = Node::open(&e)?;
                    close(node, &mut stack, &mut root);
                }
                Event::End(_) => {
                    if let Some(node) = stack.pop() {
                        close(node, &mut stack, &mut root);
                    }
                }
                Event::Text(t) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(std::str::from_utf8(&c)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(match root {
            Some((name, value)) => {
                let mut doc = Map::new();
                doc.insert(name, value);
                Value::Object(doc)
            }
            None => Value::Null,
        })
    }
}

// ── Decode ──────────────────────────────────────────────────────────────────

/// An element whose end tag has not been seen yet.
struct Node {
    name:     String,
    attrs:    Map<String, Value>,
    text:     String,
    children: Map<String, Value>,
}

impl Node {
    fn open(start: &BytesStart<'_>) -> Result<Self, CodecError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();
        let mut attrs = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            attrs.insert(key, Value::String(value));
        }
        Ok(Self { name, attrs, text: String::new(), children: Map::new() })
    }

    fn into_value(self) -> Value {
        let mut obj = Map::new();
        if !self.attrs.is_empty() {
            obj.insert(ATTR_KEY.to_string(), Value::Object(self.attrs));
        }
        let blank = self.text.trim().is_empty();
        if !blank {
            obj.insert(CHAR_KEY.to_string(), Value::String(self.text.clone()));
        }
        obj.extend(self.children);

        if obj.is_empty() {
            return Value::String(self.text);
        }
        if obj.len() == 1 {
            if let Some(Value::String(text)) = obj.get(CHAR_KEY) {
                return Value::String(text.clone());
            }
        }
        Value::Object(obj)
    }
}

fn close(node: Node, stack: &mut [Node], root: &mut Option<(String, Value)>) {
    let name = node.name.clone();
    let value = node.into_value();
    match stack.last_mut() {
        Some(parent) => match parent.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            _ => {
                parent.children.insert(name, Value::Array(vec![value]));
            }
        },
        None => {
            if root.is_none() {
                *root = Some((name, value));
            }
        }
    }
}

// ── Encode ──────────────────────────────────────────────────────────────────

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<(), CodecError> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
        }
        Value::Object(obj) => {
            let mut start = BytesStart::new(name);
            if let Some(Value::Object(attrs)) = obj.get(ATTR_KEY) {
                for (k, v) in attrs {
                    start.push_attribute((k.as_str(), text_of(v).as_str()));
                }
            }
            let text = obj.get(CHAR_KEY).map(text_of).unwrap_or_default();
            let children: Vec<(&String, &Value)> = obj
                .iter()
                .filter(|(k, _)| k.as_str() != ATTR_KEY && k.as_str() != CHAR_KEY)
                .collect();

            if text.is_empty() && children.is_empty() {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }
            writer.write_event(Event::Start(start))?;
            if !text.is_empty() {
                writer.write_event(Event::Text(BytesText::new(&text)))?;
            }
            for (child, v) in children {
                write_element(writer, child, v)?;
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        scalar => {
            let text = text_of(scalar);
            if text.is_empty() {
                writer.write_event(Event::Empty(BytesStart::new(name)))?;
            } else {
                writer.write_event(Event::Start(BytesStart::new(name)))?;
                writer.write_event(Event::Text(BytesText::new(&text)))?;
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
        }
    }
    Ok(())
}

fn text_of(value: &Value) -> String {
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
    fn decode_follows_xml2js_layout() {
        let text = r#"<?xml version="1.0"?>
<config version="2">
  <name>demo</name>
  <item>a</item>
  <item>b &amp; c</item>
  <empty/>
  <note lang="en">hello</note>
</config>"#;
        let v = XmlCodec.decode(text.as_bytes()).unwrap();
        assert_eq!(
            v,
            json!({"config": {
                "$": {"version": "2"},
                "name": ["demo"],
                "item": ["a", "b & c"],
                "empty": [""],
                "note": [{"$": {"lang": "en"}, "_": "hello"}]
            }})
        );
    }

    #[test]
    fn encode_is_indented_with_declaration() {
        let v = json!({"root": {"a": ["1"], "b": ["2", "3"]}});
        let text = XmlCodec.encode(&v).unwrap().into_text().unwrap();
        assert_eq!(
            text,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <root>\n  <a>1</a>\n  <b>2</b>\n  <b>3</b>\n</root>"
        );
    }

    #[test]
    fn decoded_documents_roundtrip() {
        let v = json!({"doc": {
            "$": {"id": "7"},
            "title": ["x < y"],
            "tags": [{"tag": ["a", "b"]}],
            "blank": [""]
        }});
        let text = XmlCodec.encode(&v).unwrap();
        assert_eq!(XmlCodec.decode(text.as_bytes()).unwrap(), v);
    }

    #[test]
    fn non_object_values_get_default_root() {
        let v = json!({"a": 1, "b": true});
        let text = XmlCodec.encode(&v).unwrap().into_text().unwrap();
        assert!(text.contains("<root>"));
        assert_eq!(
            XmlCodec.decode(text.as_bytes()).unwrap(),
            json!({"root": {"a": ["1"], "b": ["true"]}})
        );
    }

    #[test]
    fn array_root_is_rejected() {
        let err = XmlCodec.encode(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedValue { format: "xml", .. }));
    }
}
