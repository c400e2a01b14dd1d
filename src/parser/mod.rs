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

//! Parser for reading samplesheets and RunInfo documents from any [Format].
//!
//! The parser reads its whole input into memory on construction. The text
//! and JSON samplesheet formats are assembled into a [SampleSheet] with
//! [read_samplesheet](Parser::read_samplesheet), while JSON and XML can also
//! be read as plain nested values with [read_value](Parser::read_value).
//!
//! ## Usage
//!
//! ```rust
//! use v2_samplesheet_maker::Format;
//! use v2_samplesheet_maker::parser::Parser;
//! use std::io::Cursor;
//!
//! let mut input = Cursor::new(b"[Header]\nFileFormatVersion,2\n\n[Reads]\nRead1Cycles,151\n".to_vec());
//! let parser = Parser::new(&mut input).unwrap();
//! assert_eq!(parser.format, Format::Text);
//!
//! let samplesheet = parser.read_samplesheet().unwrap();
//! assert_eq!(samplesheet.len(), 2);
//! ```
//!

// Format specific implementations
pub mod json;
pub mod text;
pub mod xml;

use crate::Format;
use crate::samplesheet::SampleSheet;

use crate::parser::json::read_json;
use crate::parser::text::read_text;
use crate::parser::xml::read_xml;

use std::io::Read;

use serde_json::Value;

type E = Box<dyn std::error::Error>;

/// Input could not be read as the expected document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedDocumentError {
    pub reason: String,
}

impl std::fmt::Display for MalformedDocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Malformed input: {}", self.reason)
    }
}

impl std::error::Error for MalformedDocumentError {}

pub struct Parser {
    contents: String,
    pub format: Format,
}

impl Parser {
    /// Read all of `conn` and guess its format from the first character.
    pub fn new<R: Read>(
        conn: &mut R,
    ) -> Result<Self, E> {
        let mut contents = String::new();
        conn.read_to_string(&mut contents)?;

        if let Some(format) = guess_format(contents.as_bytes()) {
            log::debug!("Guessed input format {}", format);
            Ok(Self { contents, format })
        } else {
            Err(Box::new(MalformedDocumentError{ reason: "unrecognized input format".to_string() }))
        }
    }

    /// Read all of `conn`, which is expected to contain `format`.
    pub fn with_format<R: Read>(
        conn: &mut R,
        format: Format,
    ) -> Result<Self, E> {
        let mut contents = String::new();
        conn.read_to_string(&mut contents)?;
        Ok(Self { contents, format })
    }

    /// Assemble a [SampleSheet] from text or JSON input.
    ///
    /// ## Errors
    ///
    /// Returns a [MalformedDocumentError] if the input is not a samplesheet
    /// document, and otherwise any error from [SampleSheet::new].
    pub fn read_samplesheet(
        &self,
    ) -> Result<SampleSheet, E> {
        match self.format {
            Format::Text => {
                let sections = read_text(&self.contents)?;
                SampleSheet::new(sections.iter().map(|(name, payload)| (name.as_str(), payload)))
            },
            Format::Json => SampleSheet::from_json(&read_json(&self.contents)?),
            Format::Xml => Err(Box::new(MalformedDocumentError{ reason: "XML input is not a samplesheet".to_string() })),
        }
    }

    /// Read JSON or XML input as a nested value.
    ///
    /// XML is mapped so that attributes become `@name` keys, repeated child
    /// elements become arrays and mixed text content is stored under `#text`.
    pub fn read_value(
        &self,
    ) -> Result<Value, E> {
        match self.format {
            Format::Json => read_json(&self.contents),
            Format::Xml => read_xml(&self.contents),
            Format::Text => Err(Box::new(MalformedDocumentError{ reason: "samplesheet text has no nested value form".to_string() })),
        }
    }
}

/// Guess the format of `bytes` from the first non-whitespace character.
pub fn guess_format(
    bytes: &[u8],
) -> Option<Format> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let first = bytes.iter().find(|x| !x.is_ascii_whitespace())?;
    match *first {
        b'[' => Some(Format::Text),
        b'{' => Some(Format::Json),
        b'<' => Some(Format::Xml),
        _ => None,
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn guess_format_text() {
        use crate::Format;
        use super::guess_format;

        let data: Vec<u8> = b"[Header]\nFileFormatVersion,2\n".to_vec();
        assert_eq!(guess_format(&data).unwrap(), Format::Text);
    }

    #[test]
    fn guess_format_json() {
        use crate::Format;
        use super::guess_format;

        let data: Vec<u8> = b"\n  {\"header\": {\"file_format_version\": 2}}".to_vec();
        assert_eq!(guess_format(&data).unwrap(), Format::Json);
    }

    #[test]
    fn guess_format_xml() {
        use crate::Format;
        use super::guess_format;

        let data: Vec<u8> = b"\xEF\xBB\xBF<?xml version=\"1.0\"?>\n<RunInfo/>".to_vec();
        assert_eq!(guess_format(&data).unwrap(), Format::Xml);
    }

    #[test]
    fn guess_format_unrecognized() {
        use super::guess_format;

        assert!(guess_format(b"FileFormatVersion,2\n").is_none());
        assert!(guess_format(b"   ").is_none());
    }

    #[test]
    fn read_samplesheet_from_json() {
        use super::Parser;
        use crate::registry::SectionKind;
        use std::io::Cursor;

        let mut input = Cursor::new(b"{\"reads\": {\"read_1_cycles\": 151}}".to_vec());
        let got = Parser::new(&mut input).unwrap().read_samplesheet().unwrap();

        assert!(got.get(SectionKind::Reads).is_some());
    }

    #[test]
    fn read_samplesheet_from_xml_fails() {
        use super::{MalformedDocumentError, Parser};
        use std::io::Cursor;

        let mut input = Cursor::new(b"<RunInfo Version=\"5\"/>".to_vec());
        let got = Parser::new(&mut input).unwrap().read_samplesheet().unwrap_err();

        assert!(got.downcast_ref::<MalformedDocumentError>().is_some());
    }

    #[test]
    fn read_value_from_xml() {
        use super::Parser;
        use crate::Format;
        use serde_json::json;
        use std::io::Cursor;

        let mut input = Cursor::new(b"<RunInfo Version=\"5\"><Run Id=\"x\"/></RunInfo>".to_vec());
        let got = Parser::with_format(&mut input, Format::Xml).unwrap().read_value().unwrap();

        assert_eq!(got, json!({"RunInfo": {"@Version": "5", "Run": {"@Id": "x"}}}));
    }
}
