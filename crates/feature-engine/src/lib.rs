//! Feature Vector Builder
//!
//! Maps operator-entered clinical values onto the fixed-order numeric row
//! the PCOS risk model was trained on.

mod error;
mod features;
mod schema;

pub use error::{BuildError, SchemaError};
pub use features::{
    build, CycleRegularity, Feature, FeatureVector, RawInputs, RawValue, YesNo,
};
pub use schema::{
    field, position, schema, verify_schema, FieldKind, FieldSpec, BETA_HCG_DEFAULT,
    CYCLE_IRREGULAR_CODE, CYCLE_REGULAR_CODE, FEATURE_DIMENSION, FEATURE_SCHEMA,
};
