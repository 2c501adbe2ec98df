//! One-hot encoding and alignment against the training-time column order.

use std::collections::HashMap;

use crate::record::{CropRecord, NUMERIC_FIELDS};

/// A record expanded into named columns, before alignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedRecord {
    /// Numeric columns with their raw values.
    pub numeric: Vec<(String, f64)>,
    /// One-hot indicator columns (`{field}_{value}`), all set to one.
    pub indicators: Vec<String>,
}

/// Expand a record into named columns.
///
/// Numeric fields with a wire alias are emitted under both names so that
/// alignment picks up whichever one the training columns used.
pub fn encode(record: &CropRecord) -> EncodedRecord {
    let mut numeric = Vec::with_capacity(NUMERIC_FIELDS.len() + 2);
    for (def, value) in NUMERIC_FIELDS.iter().zip(record.numeric_values()) {
        numeric.push((def.name.to_string(), value));
        if def.wire != def.name {
            numeric.push((def.wire.to_string(), value));
        }
    }

    let indicators = record
        .categorical_values()
        .iter()
        .map(|(field, value)| format!("{field}_{value}"))
        .collect();

    EncodedRecord { numeric, indicators }
}

/// A row laid out in training column order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub values: Vec<f64>,
    /// Indicator columns that were never seen at training time.
    pub unseen: Vec<String>,
}

/// The model-facing column order captured at training time.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        for (pos, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(pos);
        }
        Self { columns, index }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Categories of `field` that were one-hot expanded at training time.
    pub fn known_categories(&self, field: &str) -> Vec<&str> {
        let prefix = format!("{field}_");
        self.columns
            .iter()
            .filter_map(|c| c.strip_prefix(prefix.as_str()))
            .collect()
    }

    /// Lay `encoded` out in training order. Columns the schema does not know
    /// are dropped; columns the record did not produce are zero.
    pub fn align(&self, encoded: &EncodedRecord) -> AlignedRow {
        let mut values = vec![0.0; self.columns.len()];

        for (name, value) in &encoded.numeric {
            if let Some(pos) = self.position(name) {
                values[pos] = *value;
            }
        }

        let mut unseen = Vec::new();
        for name in &encoded.indicators {
            match self.position(name) {
                Some(pos) => values[pos] = 1.0,
                None => unseen.push(name.clone()),
            }
        }

        AlignedRow { values, unseen }
    }
}
