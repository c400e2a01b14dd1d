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

//! `[Cloud_Settings]` and `[Cloud_Data]`, the generic auto-launch sections.
//!
//! See <https://help.ica.illumina.com/sequencer-integration/analysis_autolaunch#secondary-analysis-settings>
//!
use crate::schema::Field;
use crate::schema::Record;
use crate::schema::Schema;

use serde_json::{Map, Value};

pub static SETTINGS_FIELDS: [Field; 3] = [
    Field::string("generated_version", "GeneratedVersion"),
    Field::string("cloud_workflow", "Cloud_Workflow").required().with_default("ica_workflow_1"),
    // `<Tool>_Pipeline,<urn>` lines
    Field::mapping("analysis_urns"),
];
pub static SETTINGS_SCHEMA: Schema = Schema { fields: &SETTINGS_FIELDS };

pub static DATA_FIELDS: [Field; 5] = [
    Field::string("sample_id", "Sample_ID"),
    Field::string("project_name", "ProjectName"),
    Field::string("library_name", "LibraryName"),
    Field::string("library_prep_kit_name", "LibraryPrepKitName"),
    Field::string("index_adapter_kit_name", "IndexAdapterKitName"),
];
pub static DATA_SCHEMA: Schema = Schema { fields: &DATA_FIELDS };

pub const DATA_SORT_BY: [&str; 3] = ["project_name", "sample_id", "library_name"];

/// Build a `[Cloud_Data]` row from a per-tool data row.
///
/// The library name is `<sample_id>_<index>_<index2>` with any absent part
/// left out.
pub fn cloud_data_row(
    row: &Record,
) -> Value {
    let library_name: Vec<String> = ["sample_id", "index", "index2"]
        .iter()
        .filter_map(|name| row.get(name).map(|value| value.to_string()))
        .collect();

    let mut out = Map::new();
    if let Some(sample_id) = row.get("sample_id") {
        out.insert("sample_id".to_string(), sample_id.to_json());
    }
    out.insert("library_name".to_string(), Value::String(library_name.join("_")));
    for name in ["library_prep_kit_name", "index_adapter_kit_name"] {
        if let Some(value) = row.get(name) {
            out.insert(name.to_string(), value.to_json());
        }
    }
    Value::Object(out)
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn external_tokens_normalize_to_field_names() {
        use super::{DATA_FIELDS, SETTINGS_FIELDS};
        use crate::schema::case::pascal_case_to_snake_case;

        SETTINGS_FIELDS.iter().chain(DATA_FIELDS.iter()).filter(|field| !field.external.is_empty()).for_each(|field| {
            assert_eq!(pascal_case_to_snake_case(field.external), field.name);
        });
    }

    #[test]
    fn cloud_data_row_library_name() {
        use super::cloud_data_row;
        use crate::schema::{FieldValue, Record};
        use serde_json::json;

        let mut row = Record::new();
        row.insert("sample_id", FieldValue::Str("MyFirstSample".to_string()));
        row.insert("index", FieldValue::Str("AAAAAAAAAA".to_string()));
        row.insert("index2", FieldValue::Str("CCCCCCCC".to_string()));
        row.insert("library_prep_kit_name", FieldValue::Str("KAPA".to_string()));

        let expected = json!({
            "sample_id": "MyFirstSample",
            "library_name": "MyFirstSample_AAAAAAAAAA_CCCCCCCC",
            "library_prep_kit_name": "KAPA",
        });

        assert_eq!(cloud_data_row(&row), expected);
    }

    #[test]
    fn cloud_data_row_skips_missing_index() {
        use super::cloud_data_row;
        use crate::schema::{FieldValue, Record};

        let mut row = Record::new();
        row.insert("sample_id", FieldValue::Str("S1".to_string()));
        row.insert("index2", FieldValue::Str("CCCCCCCC".to_string()));

        let got = cloud_data_row(&row);

        assert_eq!(got["library_name"], "S1_CCCCCCCC");
    }
}
