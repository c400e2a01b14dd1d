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

//! `[TSO500S_Settings]` and `[TSO500S_Data]`, plus their `Cloud_` variants.
//!
//! See <https://support-docs.illumina.com/SW/DRAGEN_TSO500_v2.5_ICA/Content/LP/TSO500/AutolaunchSampleSheetSettings.htm>
//!
use crate::schema::Field;
use crate::schema::Schema;
use crate::sections::bclconvert::ADAPTER_BEHAVIOUR;

pub const SAMPLE_TYPE: [&str; 2] = ["DNA", "RNA"];
pub const SAMPLE_FEATURE: [&str; 1] = ["HRD"];

pub static SETTINGS_FIELDS: [Field; 9] = [
    Field::string("adapter_read_1", "AdapterRead1"),
    Field::string("adapter_read_2", "AdapterRead2"),
    // British spelling in this section
    Field::one_of("adapter_behaviour", "AdapterBehaviour", &ADAPTER_BEHAVIOUR),
    Field::integer("minimum_trimmed_read_length", "MinimumTrimmedReadLength"),
    Field::integer("mask_short_reads", "MaskShortReads"),
    Field::string("override_cycles", "OverrideCycles"),
    Field::string("software_version", "SoftwareVersion"),
    Field::boolean("starts_from_fastq", "StartsFromFastq"),
    Field::string("urn", "Urn").cloud_only().hidden(),
];
pub static SETTINGS_SCHEMA: Schema = Schema { fields: &SETTINGS_FIELDS };

pub static DATA_FIELDS: [Field; 11] = [
    Field::string("sample_id", "Sample_ID").required(),
    // Use when writing [Cloud_TSO500S_Data]
    Field::string("index_id", "Index_ID"),
    Field::one_of("sample_type", "Sample_Type", &SAMPLE_TYPE).required(),
    Field::one_of("sample_feature", "Sample_Feature", &SAMPLE_FEATURE),
    Field::string("sample_description", "Sample_Description"),
    Field::integer("lane", "Lane"),
    Field::string("index", "Index").required(),
    Field::string("index2", "Index2").required(),
    Field::string("pair_id", "Pair_ID").required(),
    Field::string("library_prep_kit_name", "LibraryPrepKitName").hidden(),
    Field::string("index_adapter_kit_name", "IndexAdapterKitName").hidden(),
];
pub static DATA_SCHEMA: Schema = Schema { fields: &DATA_FIELDS };

pub const DATA_SORT_BY: [&str; 4] = ["sample_type", "pair_id", "sample_id", "index_id"];

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn external_tokens_normalize_to_field_names() {
        use super::{DATA_FIELDS, SETTINGS_FIELDS};
        use crate::schema::case::pascal_case_to_snake_case;

        SETTINGS_FIELDS.iter().chain(DATA_FIELDS.iter()).for_each(|field| {
            assert_eq!(pascal_case_to_snake_case(field.external), field.name);
        });
    }

    #[test]
    fn data_row_requires_pair_id() {
        use super::DATA_SCHEMA;
        use crate::schema::SchemaViolation;
        use serde_json::json;

        let raw = json!({"sample_id": "S1", "sample_type": "DNA", "index": "AAAA", "index2": "CCCC"});
        let got = DATA_SCHEMA.validate("TSO500S_Data", false, &raw).unwrap_err();

        assert_eq!(got.downcast_ref::<SchemaViolation>().unwrap().field, "pair_id");
    }
}
