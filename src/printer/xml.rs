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

use crate::parser::xml::ATTRIBUTE_PREFIX;
use crate::parser::xml::TEXT_KEY;

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{Map, Value};

type E = Box<dyn std::error::Error>;

#[derive(Debug, Clone)]
pub struct XmlPrinterError {
    pub reason: String,
}

impl std::fmt::Display for XmlPrinterError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Can not write value as XML: {}", self.reason)
    }
}

impl std::error::Error for XmlPrinterError {}

fn scalar_text(
    value: &Value,
) -> Option<String> {
    match value {
        Value::String(x) => Some(x.clone()),
        Value::Number(x) => Some(x.to_string()),
        Value::Bool(x) => Some(x.to_string()),
        _ => None,
    }
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &Value,
) -> Result<(), E> {
    match value {
        Value::Array(items) => {
            for item in items.iter() {
                write_element(writer, name, item)?;
            }
        },
        Value::Null => {
            writer.write_event(Event::Empty(BytesStart::new(name)))?;
        },
        Value::Object(fields) => write_object(writer, name, fields)?,
        _ => {
            let text = scalar_text(value).unwrap_or_default();
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::new(&text)))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        },
    }
    Ok(())
}

fn write_object<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    fields: &Map<String, Value>,
) -> Result<(), E> {
    let mut start = BytesStart::new(name);
    let mut text: Option<String> = None;
    let mut children: Vec<(&String, &Value)> = Vec::new();

    for (key, value) in fields.iter() {
        if let Some(attribute) = key.strip_prefix(ATTRIBUTE_PREFIX) {
            // Null attributes are left out
            if value.is_null() {
                continue;
            }
            let Some(attribute_value) = scalar_text(value) else {
                return Err(Box::new(XmlPrinterError{ reason: format!("attribute '{}' of <{}> is not a scalar", key, name) }))
            };
            start.push_attribute((attribute, attribute_value.as_str()));
        } else if key == TEXT_KEY {
            text = scalar_text(value);
        } else {
            children.push((key, value));
        }
    }

    if children.is_empty() && text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(())
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = text {
        writer.write_event(Event::Text(BytesText::new(&text)))?;
    }
    for (key, value) in children {
        write_element(writer, key, value)?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;

    Ok(())
}

/// Format a nested value as a pretty printed XML document.
///
/// `value` must be an object with a single root key. `@name` keys are
/// written as attributes, `#text` as element text, arrays as repeated
/// elements and nulls as empty elements. Nested elements are indented by
/// one tab and the document starts with an XML declaration.
///
/// ## Usage
///
/// ```rust
/// use v2_samplesheet_maker::printer::xml::format_xml;
/// use serde_json::json;
///
/// let value = json!({"Reads": {"Read": [{"@Number": 1}, {"@Number": 2}]}});
/// let got = String::from_utf8(format_xml(&value).unwrap()).unwrap();
///
/// let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n".to_string()
///     + "<Reads>\n"
///     + "\t<Read Number=\"1\"/>\n"
///     + "\t<Read Number=\"2\"/>\n"
///     + "</Reads>\n";
/// assert_eq!(got, expected);
/// ```
///
pub fn format_xml(
    value: &Value,
) -> Result<Vec<u8>, E> {
    let root = match value.as_object() {
        Some(fields) if fields.len() == 1 => fields.iter().next(),
        _ => None,
    };
    let Some((name, body)) = root else {
        return Err(Box::new(XmlPrinterError{ reason: "document must have exactly one root element".to_string() }))
    };
    if body.is_array() {
        return Err(Box::new(XmlPrinterError{ reason: format!("root element <{}> can not repeat", name) }))
    }

    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_element(&mut writer, name, body)?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn format_run_info() {
        use super::format_xml;
        use serde_json::json;

        let value = json!({
            "RunInfo": {
                "@Version": "5",
                "Run": {
                    "@Id": "240229_A01052_0184_AHNVH5DMXY",
                    "@Number": "184",
                    "Flowcell": "HNVH5DMXY",
                    "Instrument": "A01052",
                    "Date": "2/29/2024 12:27:04 PM",
                    "Reads": {"Read": [
                        {"@Number": "1", "@NumCycles": "151", "@IsIndexedRead": "N"},
                        {"@Number": "2", "@NumCycles": "8", "@IsIndexedRead": "Y"},
                    ]},
                    "AlignToPhiX": null,
                    "ImageDimensions": {"@Width": "3200", "@Height": "3607"},
                    "ImageChannels": {"Name": ["RED", "GREEN"]},
                },
            },
        });

        let mut expected = String::new();
        expected += "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";
        expected += "<RunInfo Version=\"5\">\n";
        expected += "\t<Run Id=\"240229_A01052_0184_AHNVH5DMXY\" Number=\"184\">\n";
        expected += "\t\t<Flowcell>HNVH5DMXY</Flowcell>\n";
        expected += "\t\t<Instrument>A01052</Instrument>\n";
        expected += "\t\t<Date>2/29/2024 12:27:04 PM</Date>\n";
        expected += "\t\t<Reads>\n";
        expected += "\t\t\t<Read Number=\"1\" NumCycles=\"151\" IsIndexedRead=\"N\"/>\n";
        expected += "\t\t\t<Read Number=\"2\" NumCycles=\"8\" IsIndexedRead=\"Y\"/>\n";
        expected += "\t\t</Reads>\n";
        expected += "\t\t<AlignToPhiX/>\n";
        expected += "\t\t<ImageDimensions Width=\"3200\" Height=\"3607\"/>\n";
        expected += "\t\t<ImageChannels>\n";
        expected += "\t\t\t<Name>RED</Name>\n";
        expected += "\t\t\t<Name>GREEN</Name>\n";
        expected += "\t\t</ImageChannels>\n";
        expected += "\t</Run>\n";
        expected += "</RunInfo>\n";

        let got = String::from_utf8(format_xml(&value).unwrap()).unwrap();

        assert_eq!(got, expected);
    }

    #[test]
    fn format_escapes_text() {
        use super::format_xml;
        use serde_json::json;

        let got = String::from_utf8(format_xml(&json!({"Lane": {"@Number": 1, "#text": "<all>"}})).unwrap()).unwrap();

        assert_eq!(got, "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Lane Number=\"1\">&lt;all&gt;</Lane>\n");
    }

    #[test]
    fn format_requires_single_root() {
        use super::{format_xml, XmlPrinterError};
        use serde_json::json;

        let got = format_xml(&json!({"A": "1", "B": "2"})).unwrap_err();
        assert!(got.downcast_ref::<XmlPrinterError>().is_some());

        let got = format_xml(&json!({"A": ["1", "2"]})).unwrap_err();
        assert!(got.downcast_ref::<XmlPrinterError>().is_some());
    }

    #[test]
    fn xml_round_trip() {
        use super::format_xml;
        use crate::parser::xml::read_xml;
        use serde_json::json;

        let value = json!({"RunInfo": {"@Version": "5", "Run": {"@Id": "x", "Reads": {"Read": [{"@Number": "1"}, {"@Number": "2"}]}, "AlignToPhiX": null}}});
        let bytes = format_xml(&value).unwrap();
        let got = read_xml(&String::from_utf8(bytes).unwrap()).unwrap();

        assert_eq!(got, value);
    }
}
