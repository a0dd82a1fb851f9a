//! Submission Validator

use crate::error::ValidationError;
use feature_engine::{
    field, schema, CycleRegularity, FieldKind, FieldSpec, RawInputs, RawValue, YesNo,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Longest free text accepted for the fallback field
    pub max_text_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { max_text_len: 32 }
    }
}

/// Every problem found in one submission
#[derive(Debug, Clone, Error, Serialize)]
#[error("{} of {fields_checked} submitted fields are invalid", .errors.len())]
pub struct ValidationReport {
    /// Individual field errors, in submission order
    pub errors: Vec<ValidationError>,
    /// Number of fields examined
    pub fields_checked: usize,
}

/// Validator for operator form submissions
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate one submitted field.
    ///
    /// `Ok(None)` means the operator left a numeric entry blank and the
    /// field default applies.
    pub fn validate_field(
        &self,
        spec: &'static FieldSpec,
        text: &str,
    ) -> Result<Option<RawValue>, ValidationError> {
        let trimmed = text.trim();

        match spec.kind {
            FieldKind::Binary => YesNo::from_choice(trimmed)
                .map(|answer| Some(RawValue::YesNo(answer)))
                .ok_or_else(|| ValidationError::InvalidChoice {
                    field: spec.name,
                    value: text.to_string(),
                    allowed: YesNo::CHOICES,
                }),
            FieldKind::CategoricalOrdinal => CycleRegularity::from_choice(trimmed)
                .map(|cycle| Some(RawValue::Cycle(cycle)))
                .ok_or_else(|| ValidationError::InvalidChoice {
                    field: spec.name,
                    value: text.to_string(),
                    allowed: CycleRegularity::CHOICES,
                }),
            FieldKind::Numeric if trimmed.is_empty() => Ok(None),
            FieldKind::Numeric => match trimmed.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Some(RawValue::Number(value))),
                _ => Err(ValidationError::InvalidNumber {
                    field: spec.name,
                    value: text.to_string(),
                }),
            },
            FieldKind::NumericOrTextFallback if trimmed.is_empty() => Ok(None),
            FieldKind::NumericOrTextFallback => {
                if text.chars().count() > self.config.max_text_len {
                    return Err(ValidationError::TextTooLong {
                        field: spec.name,
                        max: self.config.max_text_len,
                    });
                }
                // Parsing belongs to the feature builder.
                Ok(Some(RawValue::Text(text.to_string())))
            }
        }
    }

    /// Validate a whole submission keyed by column name.
    ///
    /// All field errors are collected so the operator can fix them in one
    /// pass.
    pub fn validate_submission<I, K, V>(&self, submission: I) -> Result<RawInputs, ValidationReport>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut inputs = RawInputs::with_capacity(schema().len());
        let mut errors = Vec::new();
        let mut fields_checked = 0;

        for (name, text) in submission {
            fields_checked += 1;
            let name = name.as_ref();

            let Some(spec) = field(name) else {
                errors.push(ValidationError::UnknownField {
                    field: name.to_string(),
                });
                continue;
            };

            match self.validate_field(spec, text.as_ref()) {
                Ok(Some(raw)) => {
                    inputs.insert(spec.name.to_string(), raw);
                }
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            debug!("Submission valid: {} fields checked", fields_checked);
            Ok(inputs)
        } else {
            debug!("Submission rejected: {} invalid fields", errors.len());
            Err(ValidationReport {
                errors,
                fields_checked,
            })
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::build;
    use proptest::prelude::*;

    fn spec(name: &str) -> &'static FieldSpec {
        field(name).unwrap()
    }

    #[test]
    fn test_binary_choices() {
        let validator = Validator::default();
        let pimples = spec("Pimples(Y/N)");
        assert_eq!(
            validator.validate_field(pimples, "Yes").unwrap(),
            Some(RawValue::YesNo(YesNo::Yes))
        );
        assert_eq!(
            validator.validate_field(pimples, "No").unwrap(),
            Some(RawValue::YesNo(YesNo::No))
        );
        assert!(validator.validate_field(pimples, "yes please").is_err());
        assert!(validator.validate_field(pimples, "1").is_err());
    }

    #[test]
    fn test_cycle_choices() {
        let validator = Validator::default();
        let cycle = spec("Cycle(R/I)");
        assert_eq!(
            validator.validate_field(cycle, "Irregular").unwrap(),
            Some(RawValue::Cycle(CycleRegularity::Irregular))
        );
        let err = validator.validate_field(cycle, "4").unwrap_err();
        assert_eq!(err.field(), "Cycle(R/I)");
    }

    #[test]
    fn test_numeric_fields() {
        let validator = Validator::default();
        let bmi = spec("BMI");
        assert_eq!(
            validator.validate_field(bmi, " 24.5 ").unwrap(),
            Some(RawValue::Number(24.5))
        );
        assert_eq!(validator.validate_field(bmi, "").unwrap(), None);
        assert!(validator.validate_field(bmi, "NaN").is_err());
        assert!(validator.validate_field(bmi, "24,5").is_err());
    }

    #[test]
    fn test_fallback_text_forwarded_raw() {
        let validator = Validator::default();
        let hcg = spec("II    beta-HCG(mIU/mL)");
        assert_eq!(
            validator.validate_field(hcg, "1.99.").unwrap(),
            Some(RawValue::Text("1.99.".into()))
        );
        assert!(matches!(
            validator.validate_field(hcg, &"9".repeat(64)),
            Err(ValidationError::TextTooLong { max: 32, .. })
        ));
    }

    #[test]
    fn test_submission_collects_all_errors() {
        let validator = Validator::default();
        let submission = vec![
            ("Pimples(Y/N)", "maybe"),
            ("BMI", "tall"),
            ("Shoe size", "38"),
            ("Age (yrs)", "29"),
        ];

        let report = validator.validate_submission(submission).unwrap_err();
        assert_eq!(report.fields_checked, 4);
        let fields: Vec<_> = report.errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["Pimples(Y/N)", "BMI", "Shoe size"]);
    }

    #[test]
    fn test_submission_feeds_builder() {
        let validator = Validator::default();
        let submission = vec![
            ("Cycle(R/I)", "Irregular"),
            ("Weight gain(Y/N)", "Yes"),
            ("II    beta-HCG(mIU/mL)", "3.5"),
            ("Follicle No. (R)", "12"),
        ];

        let inputs = validator.validate_submission(submission).unwrap();
        let features = build(&inputs).unwrap();
        assert_eq!(features.get("Cycle(R/I)"), Some(4.0));
        assert_eq!(features.get("Weight gain(Y/N)"), Some(1.0));
        assert_eq!(features.get("II    beta-HCG(mIU/mL)"), Some(3.5));
        assert_eq!(features.get("Follicle No. (R)"), Some(12.0));
    }

    proptest! {
        #[test]
        fn prop_finite_numbers_accepted(value in -1.0e9..1.0e9f64) {
            let validator = Validator::default();
            let raw = validator.validate_field(spec("RBS(mg/dl)"), &value.to_string()).unwrap();
            prop_assert_eq!(raw, Some(RawValue::Number(value)));
        }
    }
}
