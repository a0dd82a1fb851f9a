//! HTTP route handlers

pub mod assess;
pub mod form;
pub mod metrics;
pub mod schema;
