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

//! Validated samplesheet sections.
//!
//! A [Section] is either a [KeyValueSection] (a flat mapping such as
//! `[Header]`) or a [RowCollectionSection] (a table such as
//! `[BCLConvert_Data]`). Both are built from a raw [serde_json::Value]
//! payload and the static [SectionDef] of their kind, and are immutable
//! afterwards.
//!
//! ## Usage
//!
//! ```rust
//! use v2_samplesheet_maker::registry::SectionKind;
//! use v2_samplesheet_maker::sections::Section;
//! use serde_json::json;
//!
//! let raw = json!({"read_1_cycles": 151, "index_1_cycles": 10});
//! let section = Section::new(SectionKind::Reads, &raw).unwrap();
//!
//! assert_eq!(section.render_text(), "[Reads]\nRead1Cycles,151\nIndex1Cycles,10\n");
//! ```
//!
pub mod bclconvert;
pub mod cloud;
pub mod run_info;
pub mod tso500l;
pub mod tso500s;

use crate::registry::SectionDef;
use crate::registry::SectionKind;
use crate::registry::Shape;
use crate::schema::Field;
use crate::schema::FieldValue;
use crate::schema::Record;
use crate::schema::SchemaViolation;
use crate::schema::UnusedFieldWarning;

use std::cmp::Ordering;

use serde_json::{Map, Value};

type E = Box<dyn std::error::Error>;

/// Pipeline identifier of a cloud analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Urn(pub String);

impl Urn {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Urn {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A section holding one value per field.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueSection {
    kind: SectionKind,
    fields: Record,
    unused: Vec<UnusedFieldWarning>,
}

impl KeyValueSection {
    /// Validate and normalize `raw`, which must be a JSON object keyed by
    /// internal field names.
    pub fn new(
        kind: SectionKind,
        raw: &Value,
    ) -> Result<Self, E> {
        let def = kind.def();
        let validated = def.schema.validate(&def.header(), def.is_cloud, raw)?;
        let fields = def.schema.normalize(&validated);
        Ok(KeyValueSection { kind, fields, unused: validated.unused })
    }

    pub fn def(&self) -> &'static SectionDef {
        self.kind.def()
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// The section's pipeline URN, if the section declares one and it is set.
    pub fn urn(&self) -> Option<Urn> {
        self.def().schema.field("urn")?;
        self.fields.get("urn").and_then(|value| value.as_str()).map(|urn| Urn(urn.to_string()))
    }

    /// Write the section as a bracketed header and `Key,Value` lines.
    ///
    /// Fields are written in schema order, absent fields are omitted.
    pub fn render_text(&self) -> String {
        let mut out: String = format!("[{}]\n", self.def().header());
        for (name, value) in self.fields.iter() {
            let Some(field) = self.def().schema.field(name) else { continue };
            if !field.in_text {
                continue;
            }
            match value {
                FieldValue::Map(entries) => {
                    entries.iter().for_each(|(key, value)| {
                        out += &format!("{},{}\n", key, value);
                    });
                },
                _ => out += &format!("{},{}\n", field.external, value),
            }
        }
        out
    }

    /// The section body as a JSON object keyed by internal field names.
    pub fn render_body(&self) -> Value {
        Value::Object(self.fields.iter().map(|(name, value)| (name.to_string(), value.to_json())).collect())
    }
}

/// A section holding a table of uniform rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RowCollectionSection {
    kind: SectionKind,
    rows: Vec<Record>,
    unused: Vec<UnusedFieldWarning>,
}

impl RowCollectionSection {
    /// Validate each row in `raw`, which must be a JSON array of objects.
    ///
    /// Rows are sorted by the section's sort columns after validation.
    pub fn new(
        kind: SectionKind,
        raw: &Value,
    ) -> Result<Self, E> {
        let def = kind.def();
        let Some(raw_rows) = raw.as_array() else {
            return Err(Box::new(SchemaViolation {
                section: def.header(),
                field: String::new(),
                reason: format!("expected a list of rows, got {}", raw),
            }))
        };

        let mut rows: Vec<Record> = Vec::with_capacity(raw_rows.len());
        let mut unused: Vec<UnusedFieldWarning> = Vec::new();
        for (idx, raw_row) in raw_rows.iter().enumerate() {
            let label = format!("{} row {}", def.header(), idx + 1);
            let mut validated = def.schema.validate(&label, def.is_cloud, raw_row)?;
            rows.push(def.schema.normalize(&validated));
            unused.append(&mut validated.unused);
        }

        rows.sort_by(|a, b| compare_rows(a, b, def.sort_by));

        Ok(RowCollectionSection { kind, rows, unused })
    }

    pub fn def(&self) -> &'static SectionDef {
        self.kind.def()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Text columns that have a value in at least one row, in schema order.
    pub fn columns(&self) -> Vec<&'static Field> {
        self.def().schema.fields.iter()
            .filter(|field| field.in_text && field.accepted_in(self.def().is_cloud))
            .filter(|field| self.rows.iter().any(|row| row.contains_key(field.name)))
            .collect()
    }

    /// Write the section as a bracketed header, a column line and one line
    /// per row.
    ///
    /// Columns that are empty in every row are dropped, remaining empty cells
    /// are written as empty strings.
    pub fn render_text(&self) -> String {
        let mut out: String = format!("[{}]\n", self.def().header());
        let columns = self.columns();
        if columns.is_empty() {
            return out
        }

        out += &columns.iter().map(|field| field.external).collect::<Vec<&str>>().join(",");
        out += "\n";
        self.rows.iter().for_each(|row| {
            let cells: Vec<String> = columns.iter().map(|field| {
                row.get(field.name).map(|value| value.to_string()).unwrap_or_default()
            }).collect();
            out += &cells.join(",");
            out += "\n";
        });
        out
    }

    /// The section body as a JSON array of row objects.
    pub fn render_body(&self) -> Value {
        Value::Array(self.rows.iter().map(|row| {
            Value::Object(row.iter().map(|(name, value)| (name.to_string(), value.to_json())).collect())
        }).collect())
    }
}

fn compare_rows(
    a: &Record,
    b: &Record,
    sort_by: &[&str],
) -> Ordering {
    for column in sort_by {
        // Rows missing a sort value go last.
        let ordering = match (a.get(*column), b.get(*column)) {
            (Some(x), Some(y)) => x.sort_cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering
        }
    }
    Ordering::Equal
}

/// A validated section of either shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    KeyValue(KeyValueSection),
    RowCollection(RowCollectionSection),
}

impl Section {
    /// Build the section of `kind` from its raw payload.
    ///
    /// ## Errors
    ///
    /// Returns a [SchemaViolation] if the payload has the wrong shape or any
    /// field fails validation.
    pub fn new(
        kind: SectionKind,
        raw: &Value,
    ) -> Result<Self, E> {
        match kind.def().shape {
            Shape::KeyValue => Ok(Section::KeyValue(KeyValueSection::new(kind, raw)?)),
            Shape::RowCollection => Ok(Section::RowCollection(RowCollectionSection::new(kind, raw)?)),
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            Section::KeyValue(x) => x.kind,
            Section::RowCollection(x) => x.kind,
        }
    }

    pub fn def(&self) -> &'static SectionDef {
        self.kind().def()
    }

    pub fn as_key_value(&self) -> Option<&KeyValueSection> {
        match self {
            Section::KeyValue(x) => Some(x),
            Section::RowCollection(_) => None,
        }
    }

    pub fn as_row_collection(&self) -> Option<&RowCollectionSection> {
        match self {
            Section::KeyValue(_) => None,
            Section::RowCollection(x) => Some(x),
        }
    }

    /// Fields supplied to the section that were not used.
    pub fn unused_fields(&self) -> &[UnusedFieldWarning] {
        match self {
            Section::KeyValue(x) => &x.unused,
            Section::RowCollection(x) => &x.unused,
        }
    }

    pub fn render_text(&self) -> String {
        match self {
            Section::KeyValue(x) => x.render_text(),
            Section::RowCollection(x) => x.render_text(),
        }
    }

    pub fn render_body(&self) -> Value {
        match self {
            Section::KeyValue(x) => x.render_body(),
            Section::RowCollection(x) => x.render_body(),
        }
    }

    /// The section as a single entry JSON object keyed by its JSON name.
    pub fn render_structured(&self) -> Value {
        let mut out = Map::new();
        out.insert(self.def().json_key(), self.render_body());
        Value::Object(out)
    }
}
