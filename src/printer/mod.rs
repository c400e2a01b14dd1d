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

//! Printer for outputting a [SampleSheet] in the text or JSON [Format].
//!
//! Returns one block of bytes at a time using next(). In the text format
//! each block is a single section, in JSON the whole samplesheet is a single
//! block.
//!
//! ## Usage
//!
//! ```rust
//! use v2_samplesheet_maker::Format;
//! use v2_samplesheet_maker::printer::Printer;
//! use v2_samplesheet_maker::samplesheet::SampleSheet;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "header": {"file_format_version": 2},
//!     "reads": {"read_1_cycles": 151, "index_1_cycles": 10},
//! });
//! let samplesheet = SampleSheet::from_json(&raw).unwrap();
//!
//! let mut printer = Printer::new(&samplesheet, Format::Text).unwrap();
//! let mut output: Vec<u8> = Vec::new();
//! for mut block in printer.by_ref() {
//!     output.append(&mut block);
//! }
//!
//! let mut expected: Vec<u8> = Vec::new();
//! expected.append(&mut b"[Header]\n".to_vec());
//! expected.append(&mut b"FileFormatVersion,2\n".to_vec());
//! expected.append(&mut b"\n".to_vec());
//! expected.append(&mut b"[Reads]\n".to_vec());
//! expected.append(&mut b"Read1Cycles,151\n".to_vec());
//! expected.append(&mut b"Index1Cycles,10\n".to_vec());
//!
//! assert_eq!(output, expected);
//! ```
//!

use crate::Format;
use crate::samplesheet::SampleSheet;
use crate::sections::Section;

use json::format_json;
use text::format_section_text;

// Format specific implementations
pub mod json;
pub mod text;
pub mod xml;

type E = Box<dyn std::error::Error>;

#[derive(Debug, Clone)]
pub struct UnsupportedOutputFormat {
    pub format: Format,
}

impl std::fmt::Display for UnsupportedOutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Samplesheets can not be written as {}", self.format)
    }
}

impl std::error::Error for UnsupportedOutputFormat {}

pub struct Printer<'a> {
    sections: Vec<&'a Section>,
    json: Option<Vec<u8>>,

    index: usize,
    pub format: Format,
}

impl<'a> Printer<'a> {
    pub fn new(
        samplesheet: &'a SampleSheet,
        format: Format,
    ) -> Result<Self, E> {
        let json = match format {
            Format::Text => None,
            Format::Json => Some(format_json(&samplesheet.to_json(), 2)?),
            Format::Xml => return Err(Box::new(UnsupportedOutputFormat{ format })),
        };

        Ok(Printer{
            sections: samplesheet.sections().collect(),
            json,
            index: 0,
            format,
        })
    }
}

impl Iterator for Printer<'_> {
    type Item = Vec<u8>;

    fn next(
        &mut self,
    ) -> Option<Vec<u8>> {
        let out = match self.format {
            Format::Text => {
                let section = self.sections.get(self.index)?;
                let mut out: Vec<u8> = Vec::new();
                // Blank line between sections
                if self.index > 0 {
                    out.push(b'\n');
                }
                format_section_text(section, &mut out);
                out
            },
            _ => self.json.take()?,
        };
        self.index += 1;
        Some(out)
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn print_json_output() {
        use super::Printer;
        use crate::Format;
        use crate::samplesheet::SampleSheet;
        use serde_json::json;

        let raw = json!({"reads": {"read_1_cycles": 151, "index_1_cycles": 10}});
        let samplesheet = SampleSheet::from_json(&raw).unwrap();

        let mut printer = Printer::new(&samplesheet, Format::Json).unwrap();
        let got = printer.next().unwrap();

        let mut expected: Vec<u8> = Vec::new();
        expected.append(&mut b"{\n".to_vec());
        expected.append(&mut b"  \"reads\": {\n".to_vec());
        expected.append(&mut b"    \"read_1_cycles\": 151,\n".to_vec());
        expected.append(&mut b"    \"index_1_cycles\": 10\n".to_vec());
        expected.append(&mut b"  }\n".to_vec());
        expected.append(&mut b"}\n".to_vec());

        assert_eq!(got, expected);
        assert!(printer.next().is_none());
    }

    #[test]
    fn print_text_blocks() {
        use super::Printer;
        use crate::Format;
        use crate::samplesheet::SampleSheet;
        use serde_json::json;

        let raw = json!({
            "reads": {"read_1_cycles": 151},
            "bclconvert_data": [{"sample_id": "S1", "index": "AAAA"}],
        });
        let samplesheet = SampleSheet::from_json(&raw).unwrap();

        let got: Vec<Vec<u8>> = Printer::new(&samplesheet, Format::Text).unwrap().collect();
        let expected: Vec<Vec<u8>> = vec![
            b"[Reads]\nRead1Cycles,151\n".to_vec(),
            b"\n[BCLConvert_Data]\nSample_ID,index\nS1,AAAA\n".to_vec(),
        ];

        assert_eq!(got, expected);
    }

    #[test]
    fn print_xml_is_unsupported() {
        use super::{Printer, UnsupportedOutputFormat};
        use crate::Format;
        use crate::samplesheet::SampleSheet;

        let samplesheet = SampleSheet::default();
        let got = Printer::new(&samplesheet, Format::Xml).err().unwrap();

        assert!(got.downcast_ref::<UnsupportedOutputFormat>().is_some());
    }
}
