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

//! Samplesheet assembly.
//!
//! A [SampleSheet] is built once from an unordered mapping of section name
//! to raw payload. Sections are processed in canonical [SectionKind] order
//! so that `[Cloud_Settings]` and `[Cloud_Data]` see the pipeline URNs of
//! every per-tool settings section, and `[Cloud_Data]` is synthesized from
//! the per-tool data rows when it was not supplied.
//!
//! ## Usage
//!
//! ```rust
//! use v2_samplesheet_maker::samplesheet::SampleSheet;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "header": {"file_format_version": 2},
//!     "reads": {"read_1_cycles": 151, "index_1_cycles": 10},
//! });
//! let samplesheet = SampleSheet::from_json(&raw).unwrap();
//!
//! let expected = "[Header]\nFileFormatVersion,2\n\n[Reads]\nRead1Cycles,151\nIndex1Cycles,10\n";
//! assert_eq!(samplesheet.to_text(), expected);
//! ```
//!
use crate::registry::lookup;
use crate::registry::DuplicateSectionError;
use crate::registry::SectionKind;
use crate::printer::text::format_text;
use crate::schema::UnusedFieldWarning;
use crate::sections::cloud::cloud_data_row;
use crate::sections::Section;
use crate::sections::Urn;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};

type E = Box<dyn std::error::Error>;

const ANALYSIS_URNS: &str = "analysis_urns";

/// State threaded through a single assembly pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyContext {
    /// Pipeline key (eg. `BCLConvert_Pipeline`) to URN.
    pub urns: IndexMap<String, Urn>,
    /// Data sections whose rows fill `[Cloud_Data]` if it was not supplied.
    pub synthesize_from: Vec<SectionKind>,
}

impl AssemblyContext {
    /// Record the URN of a freshly built settings section, if it has one.
    pub fn harvest(
        &mut self,
        section: &Section,
    ) {
        let def = section.def();
        let Some(key) = def.pipeline_key() else { return };
        let Some(urn) = section.as_key_value().and_then(|x| x.urn()) else { return };

        log::debug!("Found {} in {}", key, def.header());
        self.urns.insert(key, urn);
        def.data.iter().for_each(|kind| {
            if !self.synthesize_from.contains(kind) {
                self.synthesize_from.push(*kind);
            }
        });
    }

    /// The accumulated URNs as a `Cloud_Settings` `analysis_urns` payload.
    fn urns_json(&self) -> Map<String, Value> {
        self.urns.iter().map(|(key, urn)| (key.clone(), Value::String(urn.0.clone()))).collect()
    }
}

/// A validated samplesheet holding at most one section of each kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSheet {
    sections: BTreeMap<SectionKind, Section>,
}

impl SampleSheet {
    /// Assemble a samplesheet from section name to raw payload pairs.
    ///
    /// Names are resolved with [lookup](crate::registry::lookup) and may be
    /// either bracketed headers or JSON keys. Key-value payloads are JSON
    /// objects and row collection payloads are JSON arrays of objects.
    ///
    /// ## Errors
    ///
    /// Aborts on the first failure and returns
    /// - [UnknownSectionError](crate::registry::UnknownSectionError) if a name matches no section,
    /// - [DuplicateSectionError] if two names resolve to the same section,
    /// - [SchemaViolation](crate::schema::SchemaViolation) if any section fails validation.
    ///
    pub fn new<'a, I>(
        raw: I,
    ) -> Result<Self, E>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        // Resolve every name before building anything
        let mut payloads: BTreeMap<SectionKind, (&'a str, &'a Value)> = BTreeMap::new();
        for (name, payload) in raw {
            let def = lookup(name)?;
            if let Some((first, _)) = payloads.get(&def.kind) {
                return Err(Box::new(DuplicateSectionError { first: first.to_string(), second: name.to_string() }))
            }
            payloads.insert(def.kind, (name, payload));
        }

        let mut ctx = AssemblyContext::default();
        let mut sections: BTreeMap<SectionKind, Section> = BTreeMap::new();

        for (kind, (name, payload)) in payloads.iter() {
            if kind.is_generic_cloud() {
                continue;
            }
            log::debug!("Building section {} from '{}'", kind.def().header(), name);
            let section = Section::new(*kind, payload)?;
            ctx.harvest(&section);
            sections.insert(*kind, section);
        }

        let cloud_settings = cloud_settings_payload(payloads.get(&SectionKind::CloudSettings).map(|x| x.1), &ctx);
        if let Some(payload) = cloud_settings {
            sections.insert(SectionKind::CloudSettings, Section::new(SectionKind::CloudSettings, &payload)?);
        }

        let cloud_data = match payloads.get(&SectionKind::CloudData) {
            Some((_, payload)) => Some((*payload).clone()),
            None => synthesize_cloud_data(&sections, &ctx),
        };
        if let Some(payload) = cloud_data {
            sections.insert(SectionKind::CloudData, Section::new(SectionKind::CloudData, &payload)?);
        }

        let samplesheet = SampleSheet { sections };
        log::info!("Assembled samplesheet with {} sections", samplesheet.sections.len());
        Ok(samplesheet)
    }

    /// Assemble a samplesheet from a JSON object keyed by section name.
    ///
    /// Sections with a `null` payload are skipped.
    pub fn from_json(
        raw: &Value,
    ) -> Result<Self, E> {
        let Some(raw) = raw.as_object() else {
            return Err(Box::new(crate::parser::MalformedDocumentError {
                reason: "expected a JSON object keyed by section name".to_string(),
            }))
        };
        SampleSheet::new(raw.iter().filter(|(_, payload)| !payload.is_null()).map(|(name, payload)| (name.as_str(), payload)))
    }

    /// Populated sections in canonical order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn get(
        &self,
        kind: SectionKind,
    ) -> Option<&Section> {
        self.sections.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Unused fields reported by every section.
    pub fn warnings(&self) -> Vec<&UnusedFieldWarning> {
        self.sections().flat_map(|section| section.unused_fields().iter()).collect()
    }

    /// Render in the sectioned text format.
    ///
    /// Sections are separated by a blank line with no blank line after the
    /// last one.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&format_text(self.sections())).into_owned()
    }

    /// Render as a JSON object keyed by the lowercased section names.
    pub fn to_json(&self) -> Value {
        Value::Object(self.sections().map(|section| (section.def().json_key(), section.render_body())).collect())
    }
}

/// Payload for `[Cloud_Settings]` with the harvested URNs merged in.
///
/// Returns None if the section was not supplied and no URNs were found.
fn cloud_settings_payload(
    supplied: Option<&Value>,
    ctx: &AssemblyContext,
) -> Option<Value> {
    if supplied.is_none() && ctx.urns.is_empty() {
        return None
    }

    let mut payload: Map<String, Value> = match supplied {
        Some(Value::Object(x)) => x.clone(),
        // Let validation report the wrong shape
        Some(other) => return Some(other.clone()),
        None => Map::new(),
    };

    let mut urns = ctx.urns_json();
    if let Some(Value::Object(supplied_urns)) = payload.get(ANALYSIS_URNS) {
        supplied_urns.iter().for_each(|(key, urn)| { urns.insert(key.clone(), urn.clone()); });
    }
    if !urns.is_empty() {
        payload.insert(ANALYSIS_URNS.to_string(), Value::Object(urns));
    }

    Some(Value::Object(payload))
}

/// Rows for `[Cloud_Data]` built from the data sections marked in `ctx`,
/// one per data row.
fn synthesize_cloud_data(
    sections: &BTreeMap<SectionKind, Section>,
    ctx: &AssemblyContext,
) -> Option<Value> {
    if ctx.synthesize_from.is_empty() {
        return None
    }

    let mut rows: Vec<Value> = Vec::new();
    for kind in ctx.synthesize_from.iter() {
        let Some(data) = sections.get(kind).and_then(|x| x.as_row_collection()) else { continue };
        log::debug!("Filling Cloud_Data from {}", kind.def().header());
        rows.extend(data.rows().iter().map(cloud_data_row));
    }

    if rows.is_empty() {
        None
    } else {
        Some(Value::Array(rows))
    }
}
