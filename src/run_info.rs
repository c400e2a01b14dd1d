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

//! RunInfo documents.
//!
//! RunInfo.xml describes the physical run: run id and number, flowcell,
//! instrument, date and the read structure. Documents are handled as nested
//! [serde_json::Value]s in the form produced by
//! [read_xml](crate::parser::xml::read_xml), so the same value can be
//! written as JSON or XML.
//!
//! A run id in the conventional `YYMMDD_<instrument>_<run number>_<A|B><flowcell>`
//! form, eg. `240229_A01052_0184_AHNVH5DMXY`, is enough to fill in the run
//! number, flowcell, instrument and date.
//!
use crate::registry::SectionKind;
use crate::samplesheet::SampleSheet;
use crate::schema::SchemaViolation;

use chrono::NaiveDate;
use chrono::NaiveTime;
use regex::Regex;
use serde_json::{json, Map, Value};

type E = Box<dyn std::error::Error>;

pub const RUN_INFO_VERSION: &str = "5";
pub const IMAGE_WIDTH: &str = "3200";
pub const IMAGE_HEIGHT: &str = "3607";
pub const IMAGE_CHANNELS: [&str; 2] = ["RED", "GREEN"];

const RUN_ID_PATTERN: &str = r"^(\d{6})_([A-Z0-9]+)_(\d+)_[AB]([A-Z0-9]+)$";

/// The run id does not follow the conventional format and the fields it
/// would provide were not given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdFormatError {
    pub run_id: String,
    pub missing: Vec<String>,
}

impl std::fmt::Display for RunIdFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Run id '{}' is not in the format YYMMDD_INSTRUMENT_NUMBER_[A|B]FLOWCELL, specify {} manually", self.run_id, self.missing.join(", "))
    }
}

impl std::error::Error for RunIdFormatError {}

/// Fields encoded in a conventional run id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdParts {
    pub date: NaiveDate,
    pub instrument: String,
    pub run_number: u32,
    pub flowcell: String,
}

/// Split a conventional run id into its parts.
///
/// Returns None if `run_id` does not match the format.
///
/// ## Usage
///
/// ```rust
/// use v2_samplesheet_maker::run_info::parse_run_id;
///
/// let got = parse_run_id("240229_A01052_0184_AHNVH5DMXY").unwrap();
///
/// assert_eq!(got.instrument, "A01052");
/// assert_eq!(got.run_number, 184);
/// assert_eq!(got.flowcell, "HNVH5DMXY");
/// assert_eq!(got.date.to_string(), "2024-02-29");
/// ```
///
pub fn parse_run_id(
    run_id: &str,
) -> Option<RunIdParts> {
    let re = Regex::new(RUN_ID_PATTERN).ok()?;
    let caps = re.captures(run_id)?;

    Some(RunIdParts {
        date: NaiveDate::parse_from_str(&caps[1], "%y%m%d").ok()?,
        instrument: caps[2].to_string(),
        run_number: caps[3].parse::<u32>().ok()?,
        flowcell: caps[4].to_string(),
    })
}

/// Format a run date the way RunInfo.xml stores it, at midnight.
///
/// `2024-02-29` gives `02/29/2024 12:00:00 AM`.
pub fn format_run_date(
    date: &NaiveDate,
) -> String {
    date.and_time(NaiveTime::default()).format("%m/%d/%Y %I:%M:%S %p").to_string()
}

/// Optional run fields for [samplesheet_to_run_info].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub run_id: String,
    pub run_number: Option<u32>,
    pub flowcell: Option<String>,
    pub instrument: Option<String>,
    pub date: Option<NaiveDate>,
    pub align_to_phix: bool,
}

/// Build the `Reads` element from the samplesheet's `[Reads]` section.
///
/// Reads are numbered from 1 in the order read 1, index 1, index 2, read 2,
/// skipping any read without a cycle count.
pub fn reads_element(
    samplesheet: &SampleSheet,
) -> Result<Value, E> {
    let Some(reads) = samplesheet.get(SectionKind::Reads).and_then(|x| x.as_key_value()) else {
        return Err(Box::new(SchemaViolation {
            section: "Reads".to_string(),
            field: String::new(),
            reason: "a [Reads] section is required to build RunInfo".to_string(),
        }))
    };

    let order = [
        ("read_1_cycles", "N"),
        ("index_1_cycles", "Y"),
        ("index_2_cycles", "Y"),
        ("read_2_cycles", "N"),
    ];

    let read: Vec<Value> = order.iter()
        .filter_map(|(name, is_indexed)| reads.get(name).and_then(|x| x.as_int()).map(|cycles| (cycles, is_indexed)))
        .enumerate()
        .map(|(idx, (cycles, is_indexed))| json!({
            "@Number": (idx + 1).to_string(),
            "@NumCycles": cycles.to_string(),
            "@IsIndexedRead": is_indexed,
        }))
        .collect();

    Ok(json!({"Read": read}))
}

/// Build a complete RunInfo document for a samplesheet.
///
/// Fields missing from `opts` are filled in by [complete_run_info].
///
/// ## Errors
///
/// Returns a [SchemaViolation] if the samplesheet has no `[Reads]` section
/// and a [RunIdFormatError] if fields are missing and can not be derived
/// from the run id.
///
pub fn samplesheet_to_run_info(
    samplesheet: &SampleSheet,
    opts: &RunOptions,
) -> Result<Value, E> {
    let mut run = Map::new();
    run.insert("@Id".to_string(), Value::String(opts.run_id.clone()));
    if let Some(number) = opts.run_number {
        run.insert("@Number".to_string(), Value::String(number.to_string()));
    }
    if let Some(flowcell) = &opts.flowcell {
        run.insert("Flowcell".to_string(), Value::String(flowcell.clone()));
    }
    if let Some(instrument) = &opts.instrument {
        run.insert("Instrument".to_string(), Value::String(instrument.clone()));
    }
    if let Some(date) = &opts.date {
        run.insert("Date".to_string(), Value::String(format_run_date(date)));
    }
    run.insert("Reads".to_string(), reads_element(samplesheet)?);
    if opts.align_to_phix {
        run.insert("AlignToPhiX".to_string(), Value::String("Y".to_string()));
    }

    complete_run_info(&json!({"RunInfo": {"@Version": RUN_INFO_VERSION, "Run": run}}))
}

fn missing_run_id() -> E {
    Box::new(SchemaViolation {
        section: "RunInfo".to_string(),
        field: "Run.@Id".to_string(),
        reason: "run id is required".to_string(),
    })
}

/// Fill in the fields of a minimal RunInfo document.
///
/// `value` is either a full `{"RunInfo": {...}}` document or just its body
/// with a `Run` key. `Run.@Id` is required. Missing `@Number`, `Flowcell`,
/// `Instrument` and `Date` are derived from the run id, and `@Version`,
/// `AlignToPhiX`, `ImageDimensions` and `ImageChannels` get defaults.
///
/// ## Errors
///
/// Returns a [SchemaViolation] if there is no run id and a
/// [RunIdFormatError] if a derived field is missing and the run id is not in
/// the conventional format.
///
/// ## Usage
///
/// ```rust
/// use v2_samplesheet_maker::run_info::complete_run_info;
/// use serde_json::json;
///
/// let got = complete_run_info(&json!({"Run": {"@Id": "240229_A01052_0184_AHNVH5DMXY"}})).unwrap();
///
/// assert_eq!(got["RunInfo"]["@Version"], "5");
/// assert_eq!(got["RunInfo"]["Run"]["@Number"], "184");
/// assert_eq!(got["RunInfo"]["Run"]["Date"], "02/29/2024 12:00:00 AM");
/// assert_eq!(got["RunInfo"]["Run"]["ImageChannels"]["Name"][1], "GREEN");
/// ```
///
pub fn complete_run_info(
    value: &Value,
) -> Result<Value, E> {
    let body = value.get("RunInfo").unwrap_or(value);
    let Some(body) = body.as_object() else { return Err(missing_run_id()) };
    let Some(input_run) = body.get("Run").and_then(|x| x.as_object()) else { return Err(missing_run_id()) };
    let Some(run_id) = input_run.get("@Id").and_then(|x| x.as_str()) else { return Err(missing_run_id()) };

    let derived_keys = ["@Number", "Flowcell", "Instrument", "Date"];
    let missing: Vec<String> = derived_keys.iter()
        .filter(|key| input_run.get(**key).map_or(true, |x| x.is_null()))
        .map(|key| key.to_string())
        .collect();

    let parts = if missing.is_empty() {
        None
    } else {
        let Some(parts) = parse_run_id(run_id) else {
            return Err(Box::new(RunIdFormatError{ run_id: run_id.to_string(), missing }))
        };
        log::info!("Filling {} from run id {}", missing.join(", "), run_id);
        Some(parts)
    };

    let mut run = Map::new();
    run.insert("@Id".to_string(), Value::String(run_id.to_string()));
    for key in derived_keys {
        let given = input_run.get(key).filter(|x| !x.is_null()).cloned();
        let value = given.or_else(|| parts.as_ref().map(|parts| match key {
            "@Number" => Value::String(parts.run_number.to_string()),
            "Flowcell" => Value::String(parts.flowcell.clone()),
            "Instrument" => Value::String(parts.instrument.clone()),
            _ => Value::String(format_run_date(&parts.date)),
        }));
        if let Some(value) = value {
            run.insert(key.to_string(), value);
        }
    }
    for (key, value) in input_run.iter() {
        if !run.contains_key(key) {
            run.insert(key.clone(), value.clone());
        }
    }

    if !run.contains_key("AlignToPhiX") {
        run.insert("AlignToPhiX".to_string(), Value::Null);
    }
    if run.get("ImageDimensions").map_or(true, |x| x.is_null()) {
        run.insert("ImageDimensions".to_string(), json!({"@Width": IMAGE_WIDTH, "@Height": IMAGE_HEIGHT}));
    }
    if run.get("ImageChannels").map_or(true, |x| x.is_null()) {
        run.insert("ImageChannels".to_string(), json!({"Name": IMAGE_CHANNELS}));
    }

    let mut run_info = Map::new();
    let version = body.get("@Version").filter(|x| !x.is_null()).cloned().unwrap_or(Value::String(RUN_INFO_VERSION.to_string()));
    run_info.insert("@Version".to_string(), version);
    body.iter().filter(|(key, _)| key.as_str() != "@Version").for_each(|(key, value)| {
        if key == "Run" {
            run_info.insert(key.clone(), Value::Object(run.clone()));
        } else {
            run_info.insert(key.clone(), value.clone());
        }
    });

    let mut out = Map::new();
    out.insert("RunInfo".to_string(), Value::Object(run_info));
    Ok(Value::Object(out))
}

/// Remove the `RunInfo.Run.FlowcellLayout` element.
///
/// Returns true if the element was present.
pub fn remove_flowcell_layout(
    value: &mut Value,
) -> bool {
    value.get_mut("RunInfo")
        .and_then(|x| x.get_mut("Run"))
        .and_then(|x| x.as_object_mut())
        .and_then(|x| x.remove("FlowcellLayout"))
        .is_some()
}
