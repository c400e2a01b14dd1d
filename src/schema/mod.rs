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

//! Declarative field schemas for samplesheet sections.
//!
//! Each section kind declares its fields as a static [Schema]: the internal
//! snake_case name, the external token used in the samplesheet text, the
//! [FieldKind] and whether the field is required, defaulted, hidden from the
//! text format or only accepted in the `Cloud_` variant of the section.
//!
//! Raw payloads arrive as [serde_json::Value] regardless of whether they
//! were read from JSON or from the text format, so [Schema::validate] is
//! lenient about numbers supplied as strings and vice versa.
//!
pub mod case;

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde_json::Value;

type E = Box<dyn std::error::Error>;

/// A validated section record, keyed by internal field name in schema order.
pub type Record = IndexMap<&'static str, FieldValue>;

/// A field value failed its type, enumeration or requiredness constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub section: String,
    pub field: String,
    pub reason: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.field.is_empty() {
            write!(f, "Invalid section '{}': {}", self.section, self.reason)
        } else {
            write!(f, "Invalid value for '{}' in section '{}': {}", self.field, self.section, self.reason)
        }
    }
}

impl std::error::Error for SchemaViolation {}

/// A supplied field that the section schema does not know about.
///
/// Unused fields are logged and discarded, they never abort a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedFieldWarning {
    pub section: String,
    pub field: String,
    pub value: String,
}

impl std::fmt::Display for UnusedFieldWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Field '{}={}' in section '{}' was not used", self.field, self.value, self.section)
    }
}

/// Semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    /// Closed set of permitted tokens.
    Enum(&'static [&'static str]),
    /// Rendered as a `;` separated string in the text format.
    StringList,
    /// Rendered as one `Key,Value` line per entry in the text format.
    NestedMap,
}

/// A single field declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub external: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
    /// Whether the field is written to the samplesheet text format.
    pub in_text: bool,
    /// Whether the field is only accepted in `Cloud_` sections.
    pub cloud_only: bool,
}

impl Field {
    pub const fn new(
        name: &'static str,
        external: &'static str,
        kind: FieldKind,
    ) -> Self {
        Field {
            name, external, kind,
            required: false,
            default: None,
            in_text: true,
            cloud_only: false,
        }
    }

    pub const fn string(name: &'static str, external: &'static str) -> Self {
        Field::new(name, external, FieldKind::String)
    }

    pub const fn integer(name: &'static str, external: &'static str) -> Self {
        Field::new(name, external, FieldKind::Integer)
    }

    pub const fn float(name: &'static str, external: &'static str) -> Self {
        Field::new(name, external, FieldKind::Float)
    }

    pub const fn boolean(name: &'static str, external: &'static str) -> Self {
        Field::new(name, external, FieldKind::Boolean)
    }

    pub const fn one_of(name: &'static str, external: &'static str, tokens: &'static [&'static str]) -> Self {
        Field::new(name, external, FieldKind::Enum(tokens))
    }

    pub const fn list(name: &'static str, external: &'static str) -> Self {
        Field::new(name, external, FieldKind::StringList)
    }

    /// Mapping fields have no external token of their own, their entries
    /// are written with the entry keys.
    pub const fn mapping(name: &'static str) -> Self {
        Field::new(name, "", FieldKind::NestedMap)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn hidden(mut self) -> Self {
        self.in_text = false;
        self
    }

    pub const fn cloud_only(mut self) -> Self {
        self.cloud_only = true;
        self
    }

    pub fn accepted_in(&self, is_cloud: bool) -> bool {
        !self.cloud_only || is_cloud
    }
}

/// A validated, typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
    Map(IndexMap<String, String>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, String>> {
        match self {
            FieldValue::Map(x) => Some(x),
            _ => None,
        }
    }

    /// Structured (JSON) representation.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Str(x) => Value::String(x.clone()),
            FieldValue::Int(x) => Value::from(*x),
            FieldValue::Float(x) => Value::from(*x),
            FieldValue::Bool(x) => Value::Bool(*x),
            FieldValue::List(x) => Value::from(x.clone()),
            FieldValue::Map(x) => Value::Object(x.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect()),
        }
    }

    /// Ordering used when sorting table rows.
    pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Str(a), FieldValue::Str(b)) => a.cmp(b),
            _ => self.to_string().cmp(&other.to_string()),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FieldValue::Str(x) => write!(f, "{}", x),
            FieldValue::Int(x) => write!(f, "{}", x),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Bool(x) => write!(f, "{}", x),
            FieldValue::List(x) => write!(f, "{}", x.join(";")),
            FieldValue::Map(x) => {
                let pairs: Vec<String> = x.iter().map(|(k, v)| format!("{},{}", k, v)).collect();
                write!(f, "{}", pairs.join("\n"))
            },
        }
    }
}

/// Fields that passed type checks but have not yet had defaults applied.
///
/// Absent fields are stored as None.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedFields {
    pub fields: IndexMap<&'static str, Option<FieldValue>>,
    pub unused: Vec<UnusedFieldWarning>,
}

/// Ordered set of field declarations for one section kind.
#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [Field],
}

impl Schema {
    pub fn field(
        &self,
        name: &str,
    ) -> Option<&'static Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Type check `raw` against the schema.
    ///
    /// `raw` must be a JSON object. Keys that the schema does not declare,
    /// or that are cloud-only while `is_cloud` is false, are logged and
    /// reported in [ValidatedFields::unused].
    ///
    /// ## Errors
    ///
    /// Returns a [SchemaViolation] naming `section` and the offending field if
    /// a value has the wrong type, is not a permitted enum token, or if a
    /// required field without a default is absent.
    ///
    pub fn validate(
        &self,
        section: &str,
        is_cloud: bool,
        raw: &Value,
    ) -> Result<ValidatedFields, E> {
        let Some(raw) = raw.as_object() else {
            return Err(Box::new(SchemaViolation {
                section: section.to_string(),
                field: String::new(),
                reason: format!("expected a key-value mapping, got {}", raw),
            }))
        };

        let mut unused: Vec<UnusedFieldWarning> = Vec::new();
        for (key, value) in raw.iter() {
            let known = self.field(key).is_some_and(|field| field.accepted_in(is_cloud));
            if !known {
                let warning = UnusedFieldWarning {
                    section: section.to_string(),
                    field: key.clone(),
                    value: match value { Value::String(x) => x.clone(), _ => value.to_string() },
                };
                log::warn!("{}", warning);
                unused.push(warning);
            }
        }

        let mut fields: IndexMap<&'static str, Option<FieldValue>> = IndexMap::new();
        for field in self.fields.iter().filter(|field| field.accepted_in(is_cloud)) {
            let value = match raw.get(field.name) {
                Some(value) => coerce(field, value).map_err(|reason| SchemaViolation {
                    section: section.to_string(),
                    field: field.name.to_string(),
                    reason,
                })?,
                None => None,
            };
            if value.is_none() && field.required && field.default.is_none() {
                return Err(Box::new(SchemaViolation {
                    section: section.to_string(),
                    field: field.name.to_string(),
                    reason: "required field is missing".to_string(),
                }))
            }
            fields.insert(field.name, value);
        }

        Ok(ValidatedFields { fields, unused })
    }

    /// Apply defaults and drop absent fields.
    ///
    /// The returned [Record] contains no null values and follows the schema
    /// declaration order.
    pub fn normalize(
        &self,
        validated: &ValidatedFields,
    ) -> Record {
        let mut record = Record::new();
        for field in self.fields.iter() {
            let value = match validated.fields.get(field.name) {
                Some(Some(value)) => Some(value.clone()),
                Some(None) => field.default.and_then(|default| {
                    coerce(field, &Value::String(default.to_string())).ok().flatten()
                }),
                None => None,
            };
            if let Some(value) = value {
                record.insert(field.name, value);
            }
        }
        record
    }
}

fn is_absent(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(x) => x.trim().is_empty(),
        _ => false,
    }
}

/// Coerce a raw value to the type declared by `field`.
///
/// Returns Ok(None) for null or empty values and Err with a human readable
/// reason if the value does not fit.
pub fn coerce(
    field: &Field,
    raw: &Value,
) -> Result<Option<FieldValue>, String> {
    if is_absent(raw) {
        return Ok(None)
    }

    let value = match field.kind {
        FieldKind::String => match raw {
            Value::String(x) => FieldValue::Str(x.clone()),
            Value::Number(x) => FieldValue::Str(x.to_string()),
            Value::Bool(x) => FieldValue::Str(x.to_string()),
            _ => return Err(format!("expected a string, got {}", raw)),
        },
        FieldKind::Integer => match raw {
            Value::Number(x) => {
                if let Some(int) = x.as_i64() {
                    FieldValue::Int(int)
                } else if let Some(float) = x.as_f64().filter(|float| float.fract() == 0.0) {
                    FieldValue::Int(float as i64)
                } else {
                    return Err(format!("expected an integer, got {}", x))
                }
            },
            Value::String(x) => FieldValue::Int(
                x.trim().parse::<i64>().map_err(|_| format!("expected an integer, got '{}'", x))?
            ),
            _ => return Err(format!("expected an integer, got {}", raw)),
        },
        FieldKind::Float => match raw {
            Value::Number(x) => FieldValue::Float(
                x.as_f64().ok_or(format!("expected a number, got {}", x))?
            ),
            Value::String(x) => FieldValue::Float(
                x.trim().parse::<f64>().map_err(|_| format!("expected a number, got '{}'", x))?
            ),
            _ => return Err(format!("expected a number, got {}", raw)),
        },
        FieldKind::Boolean => match raw {
            Value::Bool(x) => FieldValue::Bool(*x),
            Value::Number(x) if x.as_i64() == Some(0) => FieldValue::Bool(false),
            Value::Number(x) if x.as_i64() == Some(1) => FieldValue::Bool(true),
            Value::String(x) => match x.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => FieldValue::Bool(true),
                "false" | "0" => FieldValue::Bool(false),
                _ => return Err(format!("expected true or false, got '{}'", x)),
            },
            _ => return Err(format!("expected true or false, got {}", raw)),
        },
        FieldKind::Enum(tokens) => match raw {
            Value::String(x) if tokens.contains(&x.trim()) => FieldValue::Str(x.trim().to_string()),
            _ => {
                let got = match raw { Value::String(x) => x.clone(), _ => raw.to_string() };
                return Err(format!("'{}' is not one of {}", got, tokens.join(", ")))
            },
        },
        FieldKind::StringList => {
            let items: Vec<String> = match raw {
                Value::String(x) => x.split(';').map(|item| item.trim().to_string()).filter(|item| !item.is_empty()).collect(),
                Value::Array(x) => {
                    let mut items: Vec<String> = Vec::with_capacity(x.len());
                    for item in x.iter() {
                        match item {
                            Value::String(item) => items.push(item.clone()),
                            Value::Number(item) => items.push(item.to_string()),
                            _ => return Err(format!("expected a list of strings, got {}", raw)),
                        }
                    }
                    items
                },
                _ => return Err(format!("expected a list of strings, got {}", raw)),
            };
            if items.is_empty() {
                return Ok(None)
            }
            FieldValue::List(items)
        },
        FieldKind::NestedMap => {
            let Value::Object(x) = raw else {
                return Err(format!("expected a mapping, got {}", raw))
            };
            let mut entries: IndexMap<String, String> = IndexMap::new();
            for (key, value) in x.iter() {
                match value {
                    Value::String(value) => { entries.insert(key.clone(), value.clone()); },
                    Value::Null => (),
                    _ => return Err(format!("expected a string value for '{}', got {}", key, value)),
                }
            }
            if entries.is_empty() {
                return Ok(None)
            }
            FieldValue::Map(entries)
        },
    };

    Ok(Some(value))
}

// Tests
#[cfg(test)]
mod tests {
    use super::Field;
    use super::Schema;

    static TEST_FIELDS: [Field; 5] = [
        Field::integer("file_format_version", "FileFormatVersion").with_default("2"),
        Field::string("run_name", "RunName").required(),
        Field::one_of("adapter_behavior", "AdapterBehavior", &["trim", "mask"]),
        Field::list("kits", "Kits"),
        Field::string("urn", "Urn").cloud_only().hidden(),
    ];
    static TEST_SCHEMA: Schema = Schema { fields: &TEST_FIELDS };

    #[test]
    fn validate_and_apply_defaults() {
        use super::FieldValue;
        use serde_json::json;

        let raw = json!({"run_name": "run", "adapter_behavior": "trim"});
        let validated = TEST_SCHEMA.validate("Test", false, &raw).unwrap();
        let got = TEST_SCHEMA.normalize(&validated);

        assert_eq!(got.get("file_format_version"), Some(&FieldValue::Int(2)));
        assert_eq!(got.get("run_name"), Some(&FieldValue::Str("run".to_string())));
        assert_eq!(got.get("adapter_behavior"), Some(&FieldValue::Str("trim".to_string())));
        assert_eq!(got.len(), 3);
    }

    #[test]
    fn normalize_follows_schema_order() {
        use serde_json::json;

        let raw = json!({"kits": "a;b", "run_name": "run", "file_format_version": "1"});
        let validated = TEST_SCHEMA.validate("Test", false, &raw).unwrap();
        let got: Vec<&str> = TEST_SCHEMA.normalize(&validated).keys().copied().collect();

        assert_eq!(got, vec!["file_format_version", "run_name", "kits"]);
    }

    #[test]
    fn missing_required_field() {
        use super::SchemaViolation;
        use serde_json::json;

        let raw = json!({"file_format_version": 2});
        let got = TEST_SCHEMA.validate("Test", false, &raw).unwrap_err();
        let got = got.downcast_ref::<SchemaViolation>().unwrap();

        assert_eq!(got.section, "Test");
        assert_eq!(got.field, "run_name");
    }

    #[test]
    fn integer_from_non_numeric_string() {
        use super::SchemaViolation;
        use serde_json::json;

        let raw = json!({"run_name": "run", "file_format_version": "1b"});
        let got = TEST_SCHEMA.validate("Test", false, &raw).unwrap_err();

        assert_eq!(got.downcast_ref::<SchemaViolation>().unwrap().field, "file_format_version");
    }

    #[test]
    fn enum_outside_permitted_set() {
        use super::SchemaViolation;
        use serde_json::json;

        let raw = json!({"run_name": "run", "adapter_behavior": "tram"});
        let got = TEST_SCHEMA.validate("Test", false, &raw).unwrap_err();

        assert_eq!(got.downcast_ref::<SchemaViolation>().unwrap().field, "adapter_behavior");
    }

    #[test]
    fn unknown_and_cloud_only_fields_are_unused() {
        use serde_json::json;

        let raw = json!({"run_name": "run", "extra": "value", "urn": "urn:x"});
        let validated = TEST_SCHEMA.validate("Test", false, &raw).unwrap();
        let got: Vec<&str> = validated.unused.iter().map(|x| x.field.as_str()).collect();

        assert_eq!(got, vec!["extra", "urn"]);
        assert!(TEST_SCHEMA.normalize(&validated).get("urn").is_none());
    }

    #[test]
    fn cloud_only_field_in_cloud_section() {
        use super::FieldValue;
        use serde_json::json;

        let raw = json!({"run_name": "run", "urn": "urn:x"});
        let validated = TEST_SCHEMA.validate("Cloud_Test", true, &raw).unwrap();

        assert!(validated.unused.is_empty());
        assert_eq!(TEST_SCHEMA.normalize(&validated).get("urn"), Some(&FieldValue::Str("urn:x".to_string())));
    }

    #[test]
    fn coerce_lenient_values() {
        use super::{coerce, FieldValue};
        use serde_json::json;

        assert_eq!(coerce(&Field::integer("a", "A"), &json!("151")), Ok(Some(FieldValue::Int(151))));
        assert_eq!(coerce(&Field::integer("a", "A"), &json!(151.0)), Ok(Some(FieldValue::Int(151))));
        assert_eq!(coerce(&Field::float("a", "A"), &json!("0.9")), Ok(Some(FieldValue::Float(0.9))));
        assert_eq!(coerce(&Field::boolean("a", "A"), &json!("False")), Ok(Some(FieldValue::Bool(false))));
        assert_eq!(coerce(&Field::boolean("a", "A"), &json!(1)), Ok(Some(FieldValue::Bool(true))));
        assert_eq!(coerce(&Field::string("a", "A"), &json!(12)), Ok(Some(FieldValue::Str("12".to_string()))));
        assert_eq!(coerce(&Field::string("a", "A"), &json!("")), Ok(None));
        assert_eq!(coerce(&Field::list("a", "A"), &json!(["x", "y"])), Ok(Some(FieldValue::List(vec!["x".to_string(), "y".to_string()]))));
        assert!(coerce(&Field::boolean("a", "A"), &json!("maybe")).is_err());
        assert!(coerce(&Field::mapping("a"), &json!("x")).is_err());
    }
}
