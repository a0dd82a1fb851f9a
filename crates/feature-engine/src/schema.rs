//! Clinical Field Schema
//!
//! The closed list of columns the trained pipeline was fitted on. Names are
//! copied verbatim from the training data, including its spacing and
//! spelling quirks, because the model consumes the row positionally.

use crate::error::SchemaError;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Number of columns the predictor was trained on
pub const FEATURE_DIMENSION: usize = 41;

/// Ordinal code used by the training data for a regular cycle
pub const CYCLE_REGULAR_CODE: f64 = 2.0;

/// Ordinal code used by the training data for an irregular cycle
pub const CYCLE_IRREGULAR_CODE: f64 = 4.0;

/// Placeholder concentration used by the dataset for beta-HCG readings
pub const BETA_HCG_DEFAULT: f64 = 1.99;

/// How a field's raw operator input becomes a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Yes/No choice encoded as 1/0
    Binary,
    /// Regular/Irregular cycle encoded with the dataset's 2/4 codes
    CategoricalOrdinal,
    /// Free decimal passed through unchanged
    Numeric,
    /// Free text parsed as a decimal (dirty column in the training data)
    NumericOrTextFallback,
}

impl FieldKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Binary => "binary",
            FieldKind::CategoricalOrdinal => "categorical_ordinal",
            FieldKind::Numeric => "numeric",
            FieldKind::NumericOrTextFallback => "numeric_or_text_fallback",
        }
    }
}

/// Static description of one clinical attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Exact column name expected by the predictor
    pub name: &'static str,
    /// Encoding rule
    pub kind: FieldKind,
    /// Value used when the operator leaves the field untouched
    pub default: f64,
    /// Input granularity offered to the operator
    pub step: f64,
}

impl FieldSpec {
    const fn binary(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Binary, default: 0.0, step: 1.0 }
    }

    const fn ordinal(name: &'static str) -> Self {
        Self { name, kind: FieldKind::CategoricalOrdinal, default: CYCLE_REGULAR_CODE, step: 1.0 }
    }

    const fn numeric(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Numeric, default: 0.0, step: 0.1 }
    }

    const fn concentration(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Numeric, default: BETA_HCG_DEFAULT, step: 0.01 }
    }

    const fn text_fallback(name: &'static str) -> Self {
        Self { name, kind: FieldKind::NumericOrTextFallback, default: BETA_HCG_DEFAULT, step: 0.01 }
    }

    /// Default rendered the way the form pre-fills it
    pub fn default_text(&self) -> String {
        match self.kind {
            FieldKind::Binary => "No".to_string(),
            FieldKind::CategoricalOrdinal => "Regular".to_string(),
            _ if self.step < 0.1 => format!("{:.2}", self.default),
            _ => format!("{:.1}", self.default),
        }
    }
}

/// Column schema in trained order
pub static FEATURE_SCHEMA: [FieldSpec; FEATURE_DIMENSION] = [
    FieldSpec::numeric("Age (yrs)"),
    FieldSpec::numeric("Weight (Kg)"),
    FieldSpec::numeric("Height(Cm)"),
    FieldSpec::numeric("BMI"),
    FieldSpec::numeric("Blood Group"),
    FieldSpec::numeric("Pulse rate(bpm)"),
    FieldSpec::numeric("RR (breaths/min)"),
    FieldSpec::numeric("Hb(g/dl)"),
    FieldSpec::ordinal("Cycle(R/I)"),
    FieldSpec::numeric("Cycle length(days)"),
    FieldSpec::numeric("Marraige Status (Yrs)"),
    FieldSpec::binary("Pregnant(Y/N)"),
    FieldSpec::numeric("No. of abortions"),
    FieldSpec::concentration("I   beta-HCG(mIU/mL)"),
    FieldSpec::text_fallback("II    beta-HCG(mIU/mL)"),
    FieldSpec::numeric("FSH(mIU/mL)"),
    FieldSpec::numeric("LH(mIU/mL)"),
    FieldSpec::numeric("FSH/LH"),
    FieldSpec::numeric("Hip(inch)"),
    FieldSpec::numeric("Waist(inch)"),
    FieldSpec::numeric("Waist:Hip Ratio"),
    FieldSpec::numeric("TSH (mIU/L)"),
    FieldSpec::numeric("AMH(ng/mL)"),
    FieldSpec::numeric("PRL(ng/mL)"),
    FieldSpec::numeric("Vit D3 (ng/mL)"),
    FieldSpec::numeric("PRG(ng/mL)"),
    FieldSpec::numeric("RBS(mg/dl)"),
    FieldSpec::binary("Weight gain(Y/N)"),
    FieldSpec::binary("hair growth(Y/N)"),
    FieldSpec::binary("Skin darkening (Y/N)"),
    FieldSpec::binary("Hair loss(Y/N)"),
    FieldSpec::binary("Pimples(Y/N)"),
    FieldSpec::binary("Fast food (Y/N)"),
    FieldSpec::binary("Reg.Exercise(Y/N)"),
    FieldSpec::numeric("BP _Systolic (mmHg)"),
    FieldSpec::numeric("BP _Diastolic (mmHg)"),
    FieldSpec::numeric("Follicle No. (L)"),
    FieldSpec::numeric("Follicle No. (R)"),
    FieldSpec::numeric("Avg. F size (L) (mm)"),
    FieldSpec::numeric("Avg. F size (R) (mm)"),
    FieldSpec::numeric("Endometrium (mm)"),
];

/// Full schema in trained order
pub fn schema() -> &'static [FieldSpec] {
    &FEATURE_SCHEMA
}

/// Look up a field by its exact column name
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FEATURE_SCHEMA.iter().find(|spec| spec.name == name)
}

/// Position of a field in the trained column order
pub fn position(name: &str) -> Option<usize> {
    FEATURE_SCHEMA.iter().position(|spec| spec.name == name)
}

/// Check the schema against the column count the predictor declares.
///
/// Run once at startup; a mismatch means every vector we build would be
/// read with shifted columns.
pub fn verify_schema(expected_columns: usize) -> Result<(), SchemaError> {
    if FEATURE_SCHEMA.len() != expected_columns {
        return Err(SchemaError::ColumnCount {
            expected: expected_columns,
            actual: FEATURE_SCHEMA.len(),
        });
    }

    let mut seen = HashSet::with_capacity(FEATURE_SCHEMA.len());
    for spec in FEATURE_SCHEMA.iter() {
        if !seen.insert(spec.name) {
            return Err(SchemaError::DuplicateField(spec.name));
        }
    }

    debug!("Schema verified: {} columns", expected_columns);
    Ok(())
}
