//! The inbound crop record and its field constraints.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// Categorical fields, in the order they are one-hot expanded.
pub const CATEGORICAL_FIELDS: [&str; 5] = [
    "region",
    "crop_type",
    "irrigation_type",
    "fertilizer_type",
    "crop_disease_status",
];

/// A numeric input: its column name, the name it travels under on the wire
/// and the inclusive range it must fall in.
#[derive(Debug, Clone, Copy)]
pub struct NumericField {
    pub name: &'static str,
    pub wire: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

const fn field(
    name: &'static str,
    wire: &'static str,
    min: Option<f64>,
    max: Option<f64>,
) -> NumericField {
    NumericField { name, wire, min, max }
}

/// Numeric fields, in the same order as [`CropRecord::numeric_values`].
pub const NUMERIC_FIELDS: [NumericField; 8] = [
    field("soil_moisture", "soil_moisture_%", Some(0.0), Some(100.0)),
    field("soil_pH", "soil_pH", Some(0.0), Some(14.0)),
    field("temperature_C", "temperature_C", None, None),
    field("rainfall_mm", "rainfall_mm", Some(0.0), None),
    field("humidity", "humidity_%", Some(0.0), Some(100.0)),
    field("sunlight_hours", "sunlight_hours", Some(0.0), Some(24.0)),
    field("pesticide_usage_ml", "pesticide_usage_ml", Some(0.0), None),
    field("total_days", "total_days", Some(0.0), None),
];

/// Wire names of every field, in declaration order.
pub const REQUIRED_FIELDS: [&str; 13] = [
    "region",
    "crop_type",
    "soil_moisture_%",
    "soil_pH",
    "temperature_C",
    "rainfall_mm",
    "humidity_%",
    "sunlight_hours",
    "irrigation_type",
    "fertilizer_type",
    "pesticide_usage_ml",
    "total_days",
    "crop_disease_status",
];

/// One prediction request. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    pub region: String,
    pub crop_type: String,
    #[serde(rename = "soil_moisture_%")]
    pub soil_moisture: f64,
    #[serde(rename = "soil_pH")]
    pub soil_ph: f64,
    #[serde(rename = "temperature_C")]
    pub temperature_c: f64,
    pub rainfall_mm: f64,
    #[serde(rename = "humidity_%")]
    pub humidity: f64,
    pub sunlight_hours: f64,
    pub irrigation_type: String,
    pub fertilizer_type: String,
    pub pesticide_usage_ml: f64,
    #[serde(deserialize_with = "integral")]
    pub total_days: i64,
    pub crop_disease_status: String,
}

/// A single field that failed its constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub msg: String,
    pub kind: &'static str,
}

impl FieldViolation {
    /// Render as a client-facing `detail` entry.
    pub fn to_detail(&self) -> Value {
        json!({
            "loc": ["body", self.field],
            "msg": self.msg,
            "type": self.kind,
        })
    }
}

/// Accepts `120` and `120.0`, rejects `120.5`.
fn integral<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(v) => Ok(v),
        Number::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        Number::Float(v) => Err(D::Error::custom(format!("value is not a valid integer: {v}"))),
    }
}

fn type_error_kind(field: &str) -> &'static str {
    if CATEGORICAL_FIELDS.contains(&field) {
        "type_error.str"
    } else if field == "total_days" {
        "type_error.integer"
    } else {
        "type_error.float"
    }
}

impl CropRecord {
    /// Build a record from a parsed JSON body, naming the offending field on
    /// failure. Every missing field is reported; a type error stops at the
    /// first field that fails.
    pub fn from_json(body: Value) -> Result<Self, Vec<FieldViolation>> {
        let Some(object) = body.as_object() else {
            return Err(vec![FieldViolation {
                field: "__root__",
                msg: "value is not a valid dict".to_string(),
                kind: "type_error.dict",
            }]);
        };

        let missing: Vec<FieldViolation> = REQUIRED_FIELDS
            .iter()
            .filter(|name| !object.contains_key(**name))
            .map(|name| FieldViolation {
                field: *name,
                msg: "field required".to_string(),
                kind: "value_error.missing",
            })
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        serde_path_to_error::deserialize(body).map_err(|err| {
            let path = err.path().to_string();
            let field = REQUIRED_FIELDS
                .iter()
                .copied()
                .find(|name| *name == path)
                .unwrap_or("__root__");
            vec![FieldViolation {
                field,
                msg: err.into_inner().to_string(),
                kind: type_error_kind(field),
            }]
        })
    }

    /// Categorical values paired with their field names.
    pub fn categorical_values(&self) -> [(&'static str, &str); 5] {
        [
            (CATEGORICAL_FIELDS[0], self.region.as_str()),
            (CATEGORICAL_FIELDS[1], self.crop_type.as_str()),
            (CATEGORICAL_FIELDS[2], self.irrigation_type.as_str()),
            (CATEGORICAL_FIELDS[3], self.fertilizer_type.as_str()),
            (CATEGORICAL_FIELDS[4], self.crop_disease_status.as_str()),
        ]
    }

    /// Numeric values, ordered like [`NUMERIC_FIELDS`].
    pub fn numeric_values(&self) -> [f64; 8] {
        [
            self.soil_moisture,
            self.soil_ph,
            self.temperature_c,
            self.rainfall_mm,
            self.humidity,
            self.sunlight_hours,
            self.pesticide_usage_ml,
            self.total_days as f64,
        ]
    }

    /// Check every numeric field against its range. All violations are
    /// reported, not just the first.
    pub fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let violations: Vec<FieldViolation> = NUMERIC_FIELDS
            .iter()
            .zip(self.numeric_values())
            .filter_map(|(def, value)| check_range(def, value))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

fn check_range(def: &NumericField, value: f64) -> Option<FieldViolation> {
    if !value.is_finite() {
        return Some(FieldViolation {
            field: def.wire,
            msg: "value is not a finite number".to_string(),
            kind: "type_error.float",
        });
    }
    if let Some(min) = def.min {
        if value < min {
            return Some(FieldViolation {
                field: def.wire,
                msg: format!("ensure this value is greater than or equal to {min}"),
                kind: "value_error.number.not_ge",
            });
        }
    }
    if let Some(max) = def.max {
        if value > max {
            return Some(FieldViolation {
                field: def.wire,
                msg: format!("ensure this value is less than or equal to {max}"),
                kind: "value_error.number.not_le",
            });
        }
    }
    None
}
