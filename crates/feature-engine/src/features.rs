//! Feature Vector Assembly

use crate::error::BuildError;
use crate::schema::{
    FieldKind, FieldSpec, CYCLE_IRREGULAR_CODE, CYCLE_REGULAR_CODE, FEATURE_SCHEMA,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Yes/No answer for a binary clinical field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    No,
    Yes,
}

impl YesNo {
    /// Choices in the order the form offers them
    pub const CHOICES: [&'static str; 2] = ["No", "Yes"];

    /// Parse the exact form choice
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "No" => Some(YesNo::No),
            "Yes" => Some(YesNo::Yes),
            _ => None,
        }
    }

    /// Encoded model value
    pub fn code(&self) -> f64 {
        match self {
            YesNo::No => 0.0,
            YesNo::Yes => 1.0,
        }
    }
}

/// Menstrual cycle regularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleRegularity {
    Regular,
    Irregular,
}

impl CycleRegularity {
    /// Choices in the order the form offers them
    pub const CHOICES: [&'static str; 2] = ["Regular", "Irregular"];

    /// Parse the exact form choice
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "Regular" => Some(CycleRegularity::Regular),
            "Irregular" => Some(CycleRegularity::Irregular),
            _ => None,
        }
    }

    /// Dataset ordinal code (2 or 4, never 0/1)
    pub fn code(&self) -> f64 {
        match self {
            CycleRegularity::Regular => CYCLE_REGULAR_CODE,
            CycleRegularity::Irregular => CYCLE_IRREGULAR_CODE,
        }
    }
}

/// Raw operator input for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    YesNo(YesNo),
    Cycle(CycleRegularity),
    Number(f64),
    Text(String),
}

impl RawValue {
    fn variant_name(&self) -> &'static str {
        match self {
            RawValue::YesNo(_) => "yes/no",
            RawValue::Cycle(_) => "cycle",
            RawValue::Number(_) => "number",
            RawValue::Text(_) => "text",
        }
    }
}

/// Raw inputs keyed by exact column name
pub type RawInputs = HashMap<String, RawValue>;

impl FieldSpec {
    /// Encode a raw value for this field. `None` selects the field default.
    pub fn encode(&self, raw: Option<&RawValue>) -> Result<f64, BuildError> {
        let raw = match raw {
            Some(raw) => raw,
            None => return Ok(self.default),
        };

        match (self.kind, raw) {
            (FieldKind::Binary, RawValue::YesNo(answer)) => Ok(answer.code()),
            (FieldKind::CategoricalOrdinal, RawValue::Cycle(cycle)) => Ok(cycle.code()),
            (FieldKind::Numeric, RawValue::Number(value)) => Ok(*value),
            (FieldKind::NumericOrTextFallback, RawValue::Number(value)) => Ok(*value),
            (FieldKind::NumericOrTextFallback, RawValue::Text(text)) => parse_fallback(self.name, text),
            (kind, other) => Err(BuildError::UnexpectedValue {
                field: self.name,
                expected: expected_variant(kind),
                actual: other.variant_name(),
            }),
        }
    }
}

fn expected_variant(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Binary => "yes/no",
        FieldKind::CategoricalOrdinal => "cycle",
        FieldKind::Numeric => "number",
        FieldKind::NumericOrTextFallback => "text",
    }
}

fn parse_fallback(field: &'static str, text: &str) -> Result<f64, BuildError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(BuildError::MalformedNumericField {
            field,
            text: text.to_string(),
        }),
    }
}

/// One named column of the model row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Feature {
    pub name: &'static str,
    pub value: f64,
}

/// Feature vector for ML inference, in trained column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    features: Vec<Feature>,
}

impl FeatureVector {
    /// Row produced when the operator submits the form untouched
    pub fn default_row() -> Self {
        Self {
            features: FEATURE_SCHEMA
                .iter()
                .map(|spec| Feature { name: spec.name, value: spec.default })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Value of a column by exact name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.features.iter().find(|f| f.name == name).map(|f| f.value)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.features.iter().map(|f| f.name).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.features.iter().map(|f| f.value).collect()
    }

    /// Single-precision row for the model input tensor
    pub fn to_f32_row(&self) -> Vec<f32> {
        self.features.iter().map(|f| f.value as f32).collect()
    }
}

/// Build the model row from raw operator inputs.
///
/// The output always follows schema order; the map is only consulted by
/// name, so its iteration order never leaks into the row.
pub fn build(inputs: &RawInputs) -> Result<FeatureVector, BuildError> {
    if let Some(unknown) = inputs
        .keys()
        .find(|name| !FEATURE_SCHEMA.iter().any(|spec| spec.name == name.as_str()))
    {
        return Err(BuildError::UnknownField(unknown.clone()));
    }

    let features = FEATURE_SCHEMA
        .iter()
        .map(|spec| {
            spec.encode(inputs.get(spec.name)).map(|value| Feature {
                name: spec.name,
                value,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "Built feature vector: {} columns from {} provided inputs",
        features.len(),
        inputs.len()
    );

    Ok(FeatureVector { features })
}
