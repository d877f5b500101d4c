//! # modelpy Model
//!
//! Resolved domain-model definitions consumed by the Python backend.
//!
//! This crate provides:
//! - Type, attribute, condition and expression definitions
//! - A lookup index over a set of models
//! - Pre-generation validation

pub mod error;
pub mod expr;
pub mod functions;
pub mod index;
pub mod types;
pub mod validation;

pub use error::ModelError;
pub use expr::{CmpOp, Condition, Expr, Literal};
pub use functions::{Assignment, Function, FunctionInput, FunctionOutput};
pub use index::{ModelIndex, TypeEntry};
pub use types::{
    Attribute, BasicType, Cardinality, Composite, EnumType, EnumValue, MetaTag, Model,
    ParamConstraints, TypeRef,
};
pub use validation::{ValidationReport, validate_models};

/// Parses a resolved model set from its JSON interchange form.
///
/// The upstream resolver emits either a single model object or an array
/// of models, one per namespace.
///
/// # Errors
/// Returns `ModelError` if the JSON is malformed.
pub fn parse_models(json: &str) -> Result<Vec<Model>, ModelError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}
