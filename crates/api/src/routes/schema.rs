//! Schema Routes

use axum::Json;
use feature_engine::{schema, FieldKind};
use serde::Serialize;

use crate::page::column_of;

/// One form field as described to clients
#[derive(Debug, Serialize)]
pub struct FieldDescriptor {
    pub position: usize,
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: String,
    pub step: f64,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<[&'static str; 2]>,
}

/// Response for schema endpoint
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub fields: Vec<FieldDescriptor>,
    pub count: usize,
}

/// Get the field schema in model column order
pub async fn get_schema() -> Json<SchemaResponse> {
    let fields: Vec<_> = schema()
        .iter()
        .enumerate()
        .map(|(position, spec)| FieldDescriptor {
            position,
            name: spec.name,
            kind: spec.kind,
            default: spec.default_text(),
            step: spec.step,
            column: column_of(position),
            choices: match spec.kind {
                FieldKind::Binary => Some(feature_engine::YesNo::CHOICES),
                FieldKind::CategoricalOrdinal => Some(feature_engine::CycleRegularity::CHOICES),
                _ => None,
            },
        })
        .collect();

    Json(SchemaResponse {
        count: fields.len(),
        fields,
    })
}
