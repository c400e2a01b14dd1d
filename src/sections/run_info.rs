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

//! Run setup sections: `[Header]`, `[Reads]` and `[Sequencing]`.
//!
//! See <https://support-docs.illumina.com/SHARE/SampleSheetv2/Content/SHARE/SampleSheetv2/SectionsRunSetup.htm>
//!
use crate::schema::Field;
use crate::schema::Schema;

pub static HEADER_FIELDS: [Field; 5] = [
    Field::integer("file_format_version", "FileFormatVersion").required().with_default("2"),
    Field::string("run_name", "RunName"),
    Field::string("run_description", "RunDescription"),
    Field::string("instrument_platform", "InstrumentPlatform"),
    Field::string("instrument_type", "InstrumentType"),
];
pub static HEADER_SCHEMA: Schema = Schema { fields: &HEADER_FIELDS };

// Index reads follow read 2 in the text format.
pub static READS_FIELDS: [Field; 4] = [
    Field::integer("read_1_cycles", "Read1Cycles").required(),
    Field::integer("read_2_cycles", "Read2Cycles"),
    Field::integer("index_1_cycles", "Index1Cycles"),
    Field::integer("index_2_cycles", "Index2Cycles"),
];
pub static READS_SCHEMA: Schema = Schema { fields: &READS_FIELDS };

pub static SEQUENCING_FIELDS: [Field; 5] = [
    Field::list("library_prep_kits", "LibraryPrepKits"),
    Field::boolean("custom_read_1_primer", "CustomRead1Primer"),
    Field::boolean("custom_read_2_primer", "CustomRead2Primer"),
    Field::boolean("custom_index_1_primer", "CustomIndex1Primer"),
    Field::boolean("custom_index_2_primer", "CustomIndex2Primer"),
];
pub static SEQUENCING_SCHEMA: Schema = Schema { fields: &SEQUENCING_FIELDS };

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn external_tokens_normalize_to_field_names() {
        use super::{HEADER_FIELDS, READS_FIELDS, SEQUENCING_FIELDS};
        use crate::schema::case::pascal_case_to_snake_case;

        HEADER_FIELDS.iter().chain(READS_FIELDS.iter()).chain(SEQUENCING_FIELDS.iter()).for_each(|field| {
            assert_eq!(pascal_case_to_snake_case(field.external), field.name);
        });
    }

    #[test]
    fn header_without_version_gets_default() {
        use super::HEADER_SCHEMA;
        use crate::schema::FieldValue;
        use serde_json::json;

        let raw = json!({"run_name": "my-run"});
        let validated = HEADER_SCHEMA.validate("Header", false, &raw).unwrap();
        let got = HEADER_SCHEMA.normalize(&validated);

        assert_eq!(got.get("file_format_version"), Some(&FieldValue::Int(2)));
    }

    #[test]
    fn reads_require_read_1_cycles() {
        use super::READS_SCHEMA;
        use serde_json::json;

        let raw = json!({"read_2_cycles": 151});
        let got = READS_SCHEMA.validate("Reads", false, &raw);

        assert!(got.is_err());
    }
}
