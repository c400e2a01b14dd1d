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
use crate::registry::lookup;
use crate::registry::DuplicateSectionError;
use crate::registry::SectionKind;
use crate::registry::Shape;
use crate::schema::case::pascal_case_to_snake_case;

use indexmap::IndexMap;
use serde_json::{Map, Value};

type E = Box<dyn std::error::Error>;

/// Split sectioned samplesheet text into raw section payloads.
///
/// Returns the bracketed header names mapped to a JSON object (key-value
/// sections) or a JSON array of row objects (row collections), with the
/// external tokens normalized to internal field names. Empty values are
/// read as null.
///
/// `LibraryPrepKits` in `[Sequencing]` is split on `;` and any
/// `<Tool>_Pipeline,urn:...` lines in `[Cloud_Settings]` are moved into
/// `analysis_urns` keyed as written.
///
/// ## Errors
///
/// Returns a [MalformedDocumentError] if there is content before the first
/// section header or a row has more values than its header line, an
/// [UnknownSectionError](crate::registry::UnknownSectionError) for an
/// unrecognized header and a [DuplicateSectionError] for a repeated one.
///
pub fn read_text(
    contents: &str,
) -> Result<IndexMap<String, Value>, E> {
    let mut blocks: IndexMap<String, Vec<&str>> = IndexMap::new();
    let mut current: Option<String> = None;

    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim().trim_start_matches('\u{feff}');
        if line.is_empty() {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..(line.len() - 1)].trim().to_string();
            if let Some(first) = blocks.keys().find(|x| x.eq_ignore_ascii_case(&name)) {
                return Err(Box::new(DuplicateSectionError{ first: first.clone(), second: name }))
            }
            blocks.insert(name.clone(), Vec::new());
            current = Some(name);
        } else if let Some(name) = &current {
            if let Some(lines) = blocks.get_mut(name) {
                lines.push(line);
            }
        } else {
            return Err(Box::new(MalformedDocumentError{
                reason: format!("line {} is not inside a section: '{}'", idx + 1, line),
            }))
        }
    }

    if blocks.is_empty() {
        return Err(Box::new(MalformedDocumentError{ reason: "no [Section] headers found".to_string() }))
    }

    let mut sections: IndexMap<String, Value> = IndexMap::new();
    for (name, lines) in blocks.iter() {
        let def = lookup(name)?;
        let mut payload = match (def.kind, def.shape) {
            (SectionKind::CloudSettings, _) => read_cloud_settings_lines(lines),
            (_, Shape::KeyValue) => read_key_value_lines(lines),
            (_, Shape::RowCollection) => read_row_lines(name, lines)?,
        };
        if def.kind == SectionKind::Sequencing {
            split_library_prep_kits(&mut payload);
        }
        sections.insert(name.clone(), payload);
    }

    Ok(sections)
}

fn cell_value(
    cell: &str,
) -> Value {
    let cell = cell.trim();
    if cell.is_empty() {
        Value::Null
    } else {
        Value::String(cell.to_string())
    }
}

fn read_key_value_lines(
    lines: &[&str],
) -> Value {
    let mut out = Map::new();
    lines.iter().for_each(|line| {
        let (key, value) = line.split_once(',').unwrap_or((*line, ""));
        out.insert(pascal_case_to_snake_case(key.trim()), cell_value(value));
    });
    Value::Object(out)
}

fn read_row_lines(
    section: &str,
    lines: &[&str],
) -> Result<Value, E> {
    let Some((header, rows)) = lines.split_first() else {
        return Ok(Value::Array(Vec::new()))
    };
    let columns: Vec<String> = header.split(',').map(|x| pascal_case_to_snake_case(x.trim())).collect();

    let mut out: Vec<Value> = Vec::with_capacity(rows.len());
    for (idx, line) in rows.iter().enumerate() {
        let cells: Vec<&str> = line.split(',').collect();
        if cells.len() > columns.len() {
            return Err(Box::new(MalformedDocumentError{
                reason: format!("row {} in [{}] has {} values but the header has {} columns", idx + 1, section, cells.len(), columns.len()),
            }))
        }
        let row: Map<String, Value> = columns.iter().enumerate().map(|(col, name)| {
            (name.clone(), cells.get(col).map(|x| cell_value(x)).unwrap_or(Value::Null))
        }).collect();
        out.push(Value::Object(row));
    }

    Ok(Value::Array(out))
}

fn split_library_prep_kits(
    payload: &mut Value,
) {
    if let Some(kits) = payload.get_mut("library_prep_kits") {
        if let Value::String(x) = kits {
            let items: Vec<Value> = x.split(';').map(|item| Value::String(item.trim().to_string())).collect();
            *kits = Value::Array(items);
        }
    }
}

/// `[Cloud_Settings]` lines, with `<Tool>_Pipeline,urn:...` lines moved
/// into `analysis_urns` under their key as written.
fn read_cloud_settings_lines(
    lines: &[&str],
) -> Value {
    let mut fields = Map::new();
    let mut urns = Map::new();
    lines.iter().for_each(|line| {
        let (key, value) = line.split_once(',').unwrap_or((*line, ""));
        let (key, value) = (key.trim(), value.trim());
        if key.to_ascii_lowercase().ends_with("_pipeline") && value.starts_with("urn:") {
            urns.insert(key.to_string(), Value::String(value.to_string()));
        } else {
            fields.insert(pascal_case_to_snake_case(key), cell_value(value));
        }
    });
    if !urns.is_empty() {
        fields.insert("analysis_urns".to_string(), Value::Object(urns));
    }
    Value::Object(fields)
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn read_key_value_sections() {
        use super::read_text;
        use serde_json::json;

        let data = "[Header]\nFileFormatVersion,2\nRunName,my-run\n\n[Reads]\nRead1Cycles,151\nIndex1Cycles,10\n";
        let got = read_text(data).unwrap();

        assert_eq!(got.get("Header").unwrap(), &json!({"file_format_version": "2", "run_name": "my-run"}));
        assert_eq!(got.get("Reads").unwrap(), &json!({"read_1_cycles": "151", "index_1_cycles": "10"}));
    }

    #[test]
    fn read_row_sections() {
        use super::read_text;
        use serde_json::json;

        let mut data = String::new();
        data += "[BCLConvert_Data]\n";
        data += "Lane,Sample_ID,index,index2\n";
        data += "1,MyFirstSample,AAAAAAAAAA,\n";
        data += "1,MySecondSample,GGGGGGGGGG\n";
        let got = read_text(&data).unwrap();

        let expected = json!([
            {"lane": "1", "sample_id": "MyFirstSample", "index": "AAAAAAAAAA", "index2": null},
            {"lane": "1", "sample_id": "MySecondSample", "index": "GGGGGGGGGG", "index2": null},
        ]);
        assert_eq!(got.get("BCLConvert_Data").unwrap(), &expected);
    }

    #[test]
    fn read_trims_lines_and_skips_blanks() {
        use super::read_text;
        use serde_json::json;

        let data = "\r\n  [Reads]  \r\n\r\n Read1Cycles,151 \r\n\r\n";
        let got = read_text(data).unwrap();

        assert_eq!(got.get("Reads").unwrap(), &json!({"read_1_cycles": "151"}));
    }

    #[test]
    fn read_library_prep_kits() {
        use super::read_text;
        use serde_json::json;

        let data = "[Sequencing]\nLibraryPrepKits,KitA;KitB\n";
        let got = read_text(data).unwrap();

        assert_eq!(got.get("Sequencing").unwrap(), &json!({"library_prep_kits": ["KitA", "KitB"]}));
    }

    #[test]
    fn read_cloud_settings_pipelines() {
        use super::read_text;
        use serde_json::json;

        let data = "[Cloud_Settings]\nGeneratedVersion,0.0.0\nCloud_Workflow,ica_workflow_1\nBCLConvert_Pipeline,urn:ica:pipeline:abc\nCloud_TSO500L_Pipeline,urn:ica:pipeline:tso\n";
        let got = read_text(data).unwrap();

        let expected = json!({
            "generated_version": "0.0.0",
            "cloud_workflow": "ica_workflow_1",
            "analysis_urns": {
                "BCLConvert_Pipeline": "urn:ica:pipeline:abc",
                "Cloud_TSO500L_Pipeline": "urn:ica:pipeline:tso",
            },
        });
        assert_eq!(got.get("Cloud_Settings").unwrap(), &expected);
    }

    #[test]
    fn unregistered_pipeline_key_round_trip() {
        use super::read_text;
        use crate::samplesheet::SampleSheet;

        let data = "[Cloud_Settings]\nCloud_Workflow,ica_workflow_1\nDragenGermline_Pipeline,urn:ica:pipeline:x\n";
        let sections = read_text(data).unwrap();
        let got = SampleSheet::new(sections.iter().map(|(name, payload)| (name.as_str(), payload))).unwrap().to_text();

        assert_eq!(got, data);
    }

    #[test]
    fn content_before_first_section() {
        use super::read_text;
        use crate::parser::MalformedDocumentError;

        let got = read_text("FileFormatVersion,2\n[Header]\n").unwrap_err();
        assert!(got.downcast_ref::<MalformedDocumentError>().is_some());

        let got = read_text("\n\n").unwrap_err();
        assert!(got.downcast_ref::<MalformedDocumentError>().is_some());
    }

    #[test]
    fn row_with_too_many_values() {
        use super::read_text;
        use crate::parser::MalformedDocumentError;

        let got = read_text("[BCLConvert_Data]\nSample_ID,index\nS1,AAAA,CCCC\n").unwrap_err();
        assert!(got.downcast_ref::<MalformedDocumentError>().is_some());
    }

    #[test]
    fn unknown_section_header() {
        use super::read_text;
        use crate::registry::UnknownSectionError;

        let got = read_text("[Header]\nFileFormatVersion,2\n[Settings]\nA,1\n").unwrap_err();
        assert_eq!(got.downcast_ref::<UnknownSectionError>().unwrap().name, "Settings");
    }

    #[test]
    fn repeated_section_header() {
        use super::read_text;
        use crate::registry::DuplicateSectionError;

        let got = read_text("[Reads]\nRead1Cycles,151\n[reads]\nRead1Cycles,151\n").unwrap_err();
        assert!(got.downcast_ref::<DuplicateSectionError>().is_some());
    }
}
