// v2-samplesheet-maker: Conversion between Illumina v2 samplesheets, JSON and RunInfo.xml.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

use crate::parser::MalformedDocumentError;

use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

type E = Box<dyn std::error::Error>;

pub const ATTRIBUTE_PREFIX: &str = "@";
pub const TEXT_KEY: &str = "#text";

// An element that is still open.
struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(
        start: &BytesStart,
    ) -> Result<Self, E> {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
        let mut children = Map::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = ATTRIBUTE_PREFIX.to_string() + &String::from_utf8_lossy(attr.key.as_ref());
            children.insert(key, Value::String(attr.unescape_value()?.to_string()));
        }
        Ok(Frame { name, children, text: String::new() })
    }

    fn finish(self) -> (String, Value) {
        let value = if self.children.is_empty() {
            if self.text.is_empty() { Value::Null } else { Value::String(self.text) }
        } else {
            let mut children = self.children;
            if !self.text.is_empty() {
                children.insert(TEXT_KEY.to_string(), Value::String(self.text));
            }
            Value::Object(children)
        };
        (self.name, value)
    }
}

// Repeated elements are collected into an array.
fn insert_child(
    parent: &mut Map<String, Value>,
    name: String,
    value: Value,
) {
    match parent.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        },
        None => { parent.insert(name, value); },
    }
}

// A document has exactly one root element.
fn set_root(
    root: &mut Map<String, Value>,
    name: String,
    value: Value,
) -> Result<(), E> {
    if let Some(first) = root.keys().next() {
        return Err(Box::new(MalformedDocumentError{
            reason: format!("XML document has a second root element <{}> after <{}>", name, first),
        }))
    }
    root.insert(name, value);
    Ok(())
}

/// Read an XML document into a nested value.
///
/// Element attributes are stored as `@name` keys, child elements by name
/// and text next to attributes or children under `#text`. Elements that
/// repeat become arrays and empty elements are null.
///
/// ## Errors
///
/// Returns a [MalformedDocumentError] if `contents` is not well-formed XML
/// or does not contain exactly one root element.
///
/// ## Usage
///
/// ```rust
/// use v2_samplesheet_maker::parser::xml::read_xml;
/// use serde_json::json;
///
/// let data = "<Reads><Read Number=\"1\"/><Read Number=\"2\"/></Reads>";
/// let got = read_xml(data).unwrap();
///
/// assert_eq!(got, json!({"Reads": {"Read": [{"@Number": "1"}, {"@Number": "2"}]}}));
/// ```
///
pub fn read_xml(
    contents: &str,
) -> Result<Value, E> {
    let malformed = |e: E| -> E {
        Box::new(MalformedDocumentError{ reason: format!("invalid XML: {}", e) })
    };

    let mut reader = Reader::from_str(contents);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root = Map::new();

    loop {
        match reader.read_event().map_err(|e| malformed(Box::new(e)))? {
            Event::Start(e) => stack.push(Frame::new(&e).map_err(malformed)?),
            Event::Empty(e) => {
                let (name, value) = Frame::new(&e).map_err(malformed)?.finish();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => set_root(&mut root, name, value)?,
                }
            },
            Event::Text(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text += &e.unescape().map_err(|e| malformed(Box::new(e)))?;
                }
            },
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text += &String::from_utf8_lossy(&e.into_inner());
                }
            },
            Event::End(_) => {
                let Some(frame) = stack.pop() else { continue };
                let (name, value) = frame.finish();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => set_root(&mut root, name, value)?,
                }
            },
            Event::Eof => break,
            _ => (),
        }
    }

    if let Some(frame) = stack.last() {
        return Err(Box::new(MalformedDocumentError{ reason: format!("XML element <{}> is not closed", frame.name) }))
    }
    if root.is_empty() {
        return Err(Box::new(MalformedDocumentError{ reason: "XML document has no root element".to_string() }))
    }

    Ok(Value::Object(root))
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn read_run_info() {
        use super::read_xml;
        use serde_json::json;

        let mut data = String::new();
        data += "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";
        data += "<RunInfo Version=\"5\">\n";
        data += "\t<Run Id=\"240229_A01052_0184_AHNVH5DMXY\" Number=\"184\">\n";
        data += "\t\t<Flowcell>HNVH5DMXY</Flowcell>\n";
        data += "\t\t<Reads>\n";
        data += "\t\t\t<Read Number=\"1\" NumCycles=\"151\" IsIndexedRead=\"N\"/>\n";
        data += "\t\t\t<Read Number=\"2\" NumCycles=\"8\" IsIndexedRead=\"Y\"/>\n";
        data += "\t\t</Reads>\n";
        data += "\t\t<AlignToPhiX/>\n";
        data += "\t\t<ImageChannels>\n";
        data += "\t\t\t<Name>RED</Name>\n";
        data += "\t\t\t<Name>GREEN</Name>\n";
        data += "\t\t</ImageChannels>\n";
        data += "\t</Run>\n";
        data += "</RunInfo>\n";

        let expected = json!({
            "RunInfo": {
                "@Version": "5",
                "Run": {
                    "@Id": "240229_A01052_0184_AHNVH5DMXY",
                    "@Number": "184",
                    "Flowcell": "HNVH5DMXY",
                    "Reads": {"Read": [
                        {"@Number": "1", "@NumCycles": "151", "@IsIndexedRead": "N"},
                        {"@Number": "2", "@NumCycles": "8", "@IsIndexedRead": "Y"},
                    ]},
                    "AlignToPhiX": null,
                    "ImageChannels": {"Name": ["RED", "GREEN"]},
                },
            },
        });

        let got = read_xml(&data).unwrap();

        assert_eq!(got, expected);
    }

    #[test]
    fn read_text_next_to_attributes() {
        use super::read_xml;
        use serde_json::json;

        let got = read_xml("<Lane Number=\"1\">&lt;all&gt;</Lane>").unwrap();

        assert_eq!(got, json!({"Lane": {"@Number": "1", "#text": "<all>"}}));
    }

    #[test]
    fn read_malformed_xml() {
        use super::read_xml;
        use crate::parser::MalformedDocumentError;

        let got = read_xml("<RunInfo><Run></RunInfo>").unwrap_err();
        assert!(got.downcast_ref::<MalformedDocumentError>().is_some());

        let got = read_xml("").unwrap_err();
        assert!(got.downcast_ref::<MalformedDocumentError>().is_some());
    }

    #[test]
    fn read_unclosed_element() {
        use super::read_xml;
        use crate::parser::MalformedDocumentError;

        let got = read_xml("<A/><B>").unwrap_err();
        assert!(got.downcast_ref::<MalformedDocumentError>().is_some());
    }

    #[test]
    fn read_two_roots() {
        use super::read_xml;
        use crate::parser::MalformedDocumentError;

        let got = read_xml("<A/><B/>").unwrap_err();
        assert!(got.downcast_ref::<MalformedDocumentError>().is_some());

        let got = read_xml("<RunInfo></RunInfo><RunInfo></RunInfo>").unwrap_err();
        assert!(got.downcast_ref::<MalformedDocumentError>().is_some());
    }
}
