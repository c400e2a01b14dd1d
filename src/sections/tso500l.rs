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

//! `[TSO500L_Settings]` and `[TSO500L_Data]`, plus their `Cloud_` variants.
//!
//! See <https://support.illumina.com/content/dam/illumina-support/documents/documentation/software_documentation/trusight/trusight-oncology-500/200034937-00-dragen-trusight-oncology-ctdna-500-analysis-software-v211-ica-user-guide.pdf>
//!
use crate::schema::Field;
use crate::schema::Schema;

pub const SAMPLE_TYPE: [&str; 1] = ["DNA"];

pub static SETTINGS_FIELDS: [Field; 3] = [
    Field::string("software_version", "SoftwareVersion"),
    Field::boolean("starts_from_fastq", "StartsFromFastq").required(),
    Field::string("urn", "Urn").cloud_only().hidden(),
];
pub static SETTINGS_SCHEMA: Schema = Schema { fields: &SETTINGS_FIELDS };

pub static DATA_FIELDS: [Field; 8] = [
    Field::string("sample_id", "Sample_ID").required(),
    Field::string("index_id", "Index_ID").required(),
    Field::one_of("sample_type", "Sample_Type", &SAMPLE_TYPE).required(),
    Field::string("sample_description", "Sample_Description"),
    Field::string("index", "Index"),
    Field::string("index2", "Index2"),
    Field::string("library_prep_kit_name", "LibraryPrepKitName").hidden(),
    Field::string("index_adapter_kit_name", "IndexAdapterKitName").hidden(),
];
pub static DATA_SCHEMA: Schema = Schema { fields: &DATA_FIELDS };

pub const DATA_SORT_BY: [&str; 3] = ["sample_type", "sample_id", "index_id"];

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
    fn urn_only_in_cloud_settings() {
        use super::SETTINGS_SCHEMA;
        use serde_json::json;

        let raw = json!({"starts_from_fastq": true, "urn": "urn:ilmn:ica:pipeline:123"});

        let local = SETTINGS_SCHEMA.validate("TSO500L_Settings", false, &raw).unwrap();
        let cloud = SETTINGS_SCHEMA.validate("Cloud_TSO500L_Settings", true, &raw).unwrap();

        assert_eq!(local.unused.len(), 1);
        assert!(SETTINGS_SCHEMA.normalize(&local).get("urn").is_none());
        assert!(cloud.unused.is_empty());
        assert!(SETTINGS_SCHEMA.normalize(&cloud).get("urn").is_some());
    }
}
