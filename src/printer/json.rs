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

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;
use serde_json::Value;

type E = Box<dyn std::error::Error>;

/// Format `value` as pretty printed JSON indented by `indent` spaces.
///
/// The output ends in a newline.
///
pub fn format_json(
    value: &Value,
    indent: usize,
) -> Result<Vec<u8>, E> {
    let indent = vec![b' '; indent];
    let mut out: Vec<u8> = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
    value.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}
