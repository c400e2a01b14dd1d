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

use serde_json::Value;

type E = Box<dyn std::error::Error>;

/// Read a JSON document.
///
/// ## Errors
///
/// Returns a [MalformedDocumentError] if `contents` is not valid JSON.
///
pub fn read_json(
    contents: &str,
) -> Result<Value, E> {
    serde_json::from_str(contents).map_err(|e| {
        Box::new(MalformedDocumentError{ reason: format!("invalid JSON: {}", e) }) as E
    })
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn read_json_object() {
        use super::read_json;
        use serde_json::json;

        let got = read_json("{\"reads\": {\"read_1_cycles\": 151}}").unwrap();
        assert_eq!(got, json!({"reads": {"read_1_cycles": 151}}));
    }

    #[test]
    fn read_json_invalid() {
        use super::read_json;
        use crate::parser::MalformedDocumentError;

        let got = read_json("{\"reads\": ").unwrap_err();
        assert!(got.downcast_ref::<MalformedDocumentError>().unwrap().reason.starts_with("invalid JSON"));
    }
}
