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

//! The closed set of samplesheet sections.
//!
//! Every section kind is a [SectionKind] with a static [SectionDef] entry in
//! [REGISTRY]. The registry is stored in canonical order: run setup first,
//! then the per-tool settings and data pairs, and the generic `Cloud_Settings`
//! and `Cloud_Data` sections last. Sections are both processed and written
//! in this order.
//!
//! A section name is resolved with [lookup], which strips an optional
//! `Cloud_` prefix to find the base section and whether the cloud variant was
//! requested. `Cloud_Settings` and `Cloud_Data` are never prefix-stripped.
//!
use crate::schema::Schema;
use crate::sections::{bclconvert, cloud, run_info, tso500l, tso500s};

type E = Box<dyn std::error::Error>;

const CLOUD_PREFIX: &str = "Cloud_";

/// The section name does not match any registered section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSectionError {
    pub name: String,
}

impl std::fmt::Display for UnknownSectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "'{}' is not a known section name", self.name)
    }
}

impl std::error::Error for UnknownSectionError {}

/// Two input sections resolved to the same section kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSectionError {
    pub first: String,
    pub second: String,
}

impl std::fmt::Display for DuplicateSectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "sections '{}' and '{}' refer to the same section", self.first, self.second)
    }
}

impl std::error::Error for DuplicateSectionError {}

/// Known section kinds in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    Header,
    Reads,
    Sequencing,
    BclConvertSettings,
    BclConvertData,
    Tso500lSettings,
    CloudTso500lSettings,
    Tso500lData,
    CloudTso500lData,
    Tso500sSettings,
    CloudTso500sSettings,
    Tso500sData,
    CloudTso500sData,
    CloudSettings,
    CloudData,
}

impl SectionKind {
    pub fn def(self) -> &'static SectionDef {
        &REGISTRY[self as usize]
    }

    /// Whether this is one of the generic cloud sections that are assembled
    /// after every other section.
    pub fn is_generic_cloud(self) -> bool {
        matches!(self, SectionKind::CloudSettings | SectionKind::CloudData)
    }
}

/// Shape of a section body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One `Key,Value` line per field.
    KeyValue,
    /// A header line followed by one comma separated line per row.
    RowCollection,
}

#[derive(Debug)]
pub struct SectionDef {
    pub kind: SectionKind,
    pub class_header: &'static str,
    pub is_cloud: bool,
    pub shape: Shape,
    pub schema: &'static Schema,
    /// Columns used to order rows, compared left to right.
    pub sort_by: &'static [&'static str],
    /// Pipeline name used to build the `Cloud_Settings` key for this
    /// section's `urn`. Sections without an entry never contribute URNs.
    pub pipeline: Option<&'static str>,
    /// Data sections whose rows fill `Cloud_Data` when this section has a URN.
    pub data: &'static [SectionKind],
}

impl SectionDef {
    /// Bracketed header name, with the `Cloud_` prefix for cloud variants.
    pub fn header(&self) -> String {
        if self.is_cloud {
            format!("{}{}", CLOUD_PREFIX, self.class_header)
        } else {
            self.class_header.to_string()
        }
    }

    /// Key used for this section in the JSON format.
    pub fn json_key(&self) -> String {
        self.header().to_ascii_lowercase()
    }

    /// Key that this section's URN is stored under in `Cloud_Settings`.
    ///
    /// `BCLConvert_Settings` gives `BCLConvert_Pipeline` and
    /// `Cloud_TSO500L_Settings` gives `Cloud_TSO500L_Pipeline`.
    pub fn pipeline_key(&self) -> Option<String> {
        self.pipeline.map(|name| {
            if self.is_cloud {
                format!("{}{}_Pipeline", CLOUD_PREFIX, name)
            } else {
                format!("{}_Pipeline", name)
            }
        })
    }
}

const fn key_value(
    kind: SectionKind,
    class_header: &'static str,
    is_cloud: bool,
    schema: &'static Schema,
) -> SectionDef {
    SectionDef {
        kind, class_header, is_cloud,
        shape: Shape::KeyValue,
        schema,
        sort_by: &[],
        pipeline: None,
        data: &[],
    }
}

const fn row_collection(
    kind: SectionKind,
    class_header: &'static str,
    is_cloud: bool,
    schema: &'static Schema,
    sort_by: &'static [&'static str],
) -> SectionDef {
    SectionDef {
        kind, class_header, is_cloud,
        shape: Shape::RowCollection,
        schema, sort_by,
        pipeline: None,
        data: &[],
    }
}

const fn settings_with_urn(
    kind: SectionKind,
    class_header: &'static str,
    is_cloud: bool,
    schema: &'static Schema,
    pipeline: &'static str,
    data: &'static [SectionKind],
) -> SectionDef {
    SectionDef {
        kind, class_header, is_cloud,
        shape: Shape::KeyValue,
        schema,
        sort_by: &[],
        pipeline: Some(pipeline),
        data,
    }
}

const TSO500L_DATA: [SectionKind; 2] = [SectionKind::Tso500lData, SectionKind::CloudTso500lData];
const TSO500S_DATA: [SectionKind; 2] = [SectionKind::Tso500sData, SectionKind::CloudTso500sData];

/// All known sections, indexed by [SectionKind].
pub static REGISTRY: [SectionDef; 15] = [
    // Run setup
    key_value(SectionKind::Header, "Header", false, &run_info::HEADER_SCHEMA),
    key_value(SectionKind::Reads, "Reads", false, &run_info::READS_SCHEMA),
    key_value(SectionKind::Sequencing, "Sequencing", false, &run_info::SEQUENCING_SCHEMA),
    // BCLConvert
    settings_with_urn(SectionKind::BclConvertSettings, "BCLConvert_Settings", false, &bclconvert::SETTINGS_SCHEMA, "BCLConvert", &[SectionKind::BclConvertData]),
    row_collection(SectionKind::BclConvertData, "BCLConvert_Data", false, &bclconvert::DATA_SCHEMA, &bclconvert::DATA_SORT_BY),
    // TSO500L
    key_value(SectionKind::Tso500lSettings, "TSO500L_Settings", false, &tso500l::SETTINGS_SCHEMA),
    settings_with_urn(SectionKind::CloudTso500lSettings, "TSO500L_Settings", true, &tso500l::SETTINGS_SCHEMA, "TSO500L", &TSO500L_DATA),
    row_collection(SectionKind::Tso500lData, "TSO500L_Data", false, &tso500l::DATA_SCHEMA, &tso500l::DATA_SORT_BY),
    row_collection(SectionKind::CloudTso500lData, "TSO500L_Data", true, &tso500l::DATA_SCHEMA, &tso500l::DATA_SORT_BY),
    // TSO500S
    key_value(SectionKind::Tso500sSettings, "TSO500S_Settings", false, &tso500s::SETTINGS_SCHEMA),
    settings_with_urn(SectionKind::CloudTso500sSettings, "TSO500S_Settings", true, &tso500s::SETTINGS_SCHEMA, "TSO500S", &TSO500S_DATA),
    row_collection(SectionKind::Tso500sData, "TSO500S_Data", false, &tso500s::DATA_SCHEMA, &tso500s::DATA_SORT_BY),
    row_collection(SectionKind::CloudTso500sData, "TSO500S_Data", true, &tso500s::DATA_SCHEMA, &tso500s::DATA_SORT_BY),
    // Generic cloud sections
    key_value(SectionKind::CloudSettings, "Cloud_Settings", false, &cloud::SETTINGS_SCHEMA),
    row_collection(SectionKind::CloudData, "Cloud_Data", false, &cloud::DATA_SCHEMA, &cloud::DATA_SORT_BY),
];

/// Find the registered section for `name`.
///
/// Matching is case-insensitive, so both the bracketed text header
/// (`Cloud_TSO500L_Settings`) and the JSON key (`cloud_tso500l_settings`)
/// resolve to the same section.
///
/// ## Errors
///
/// Returns an [UnknownSectionError] if no section matches.
///
/// ## Usage
///
/// ```rust
/// use v2_samplesheet_maker::registry::{lookup, SectionKind};
///
/// assert_eq!(lookup("BCLConvert_Data").unwrap().kind, SectionKind::BclConvertData);
/// assert_eq!(lookup("cloud_tso500l_settings").unwrap().kind, SectionKind::CloudTso500lSettings);
/// assert_eq!(lookup("Cloud_Settings").unwrap().kind, SectionKind::CloudSettings);
/// assert!(lookup("Cloud_Header").is_err());
/// ```
///
pub fn lookup(
    name: &str,
) -> Result<&'static SectionDef, E> {
    let lower = name.trim().to_ascii_lowercase();
    let prefix = CLOUD_PREFIX.to_ascii_lowercase();

    let generic = REGISTRY.iter()
        .filter(|def| def.kind.is_generic_cloud())
        .any(|def| def.class_header.to_ascii_lowercase() == lower);

    let (stripped, is_cloud) = match lower.strip_prefix(&prefix) {
        Some(stripped) if !generic => (stripped.to_string(), true),
        _ => (lower.clone(), false),
    };

    REGISTRY.iter()
        .find(|def| def.is_cloud == is_cloud && def.class_header.to_ascii_lowercase() == stripped)
        .ok_or_else(|| Box::new(UnknownSectionError { name: name.to_string() }) as E)
}
