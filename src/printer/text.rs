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

use crate::sections::Section;

/// Format a single section as a text block.
///
/// Appends the bracketed header and the section body to `out`. Every line,
/// the last one included, ends in `\n`.
///
pub fn format_section_text(
    section: &Section,
    out: &mut Vec<u8>,
) {
    out.extend_from_slice(section.render_text().as_bytes());
}

/// Format all sections as one text document.
///
/// Sections are separated by a single blank line.
pub fn format_text<'a, I: Iterator<Item = &'a Section>>(
    sections: I,
) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    sections.enumerate().for_each(|(idx, section)| {
        if idx > 0 {
            out.push(b'\n');
        }
        format_section_text(section, &mut out);
    });
    out
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn format_tso500l_blocks() {
        use super::format_text;
        use crate::samplesheet::SampleSheet;
        use serde_json::json;

        let raw = json!({
            "tso500l_settings": {"software_version": "2.5.2", "starts_from_fastq": true},
            "tso500l_data": [
                {"sample_id": "S2", "index_id": "UDP0002", "sample_type": "DNA", "index": "CCCC", "index2": "GGGG"},
                {"sample_id": "S1", "index_id": "UDP0001", "sample_type": "DNA", "index": "AAAA", "index2": "TTTT", "sample_description": "First"},
            ],
        });
        let samplesheet = SampleSheet::from_json(&raw).unwrap();

        let mut expected: Vec<u8> = Vec::new();
        expected.append(&mut b"[TSO500L_Settings]\n".to_vec());
        expected.append(&mut b"SoftwareVersion,2.5.2\n".to_vec());
        expected.append(&mut b"StartsFromFastq,true\n".to_vec());
        expected.append(&mut b"\n".to_vec());
        expected.append(&mut b"[TSO500L_Data]\n".to_vec());
        expected.append(&mut b"Sample_ID,Index_ID,Sample_Type,Sample_Description,Index,Index2\n".to_vec());
        expected.append(&mut b"S1,UDP0001,DNA,First,AAAA,TTTT\n".to_vec());
        expected.append(&mut b"S2,UDP0002,DNA,,CCCC,GGGG\n".to_vec());

        let got = format_text(samplesheet.sections());

        assert_eq!(got, expected);
    }

    #[test]
    fn format_no_sections() {
        use super::format_text;
        use crate::samplesheet::SampleSheet;

        let samplesheet = SampleSheet::default();
        assert!(format_text(samplesheet.sections()).is_empty());
    }
}
