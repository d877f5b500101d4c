//! Model validation.
//!
//! The backend consumes an already-resolved model; validation here only
//! rejects input the upstream resolver should never have produced, before
//! any generation starts.

use std::collections::HashSet;

use crate::error::ModelError;
use crate::index::{ModelIndex, TypeEntry};
use crate::types::{Composite, Model, TypeRef};

/// Outcome of validating a model set.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Fatal problems; generation must not proceed for the affected unit.
    pub errors: Vec<ModelError>,
    /// Non-fatal observations.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Returns true when no errors were recorded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates a set of models against structural invariants.
#[must_use]
pub fn validate_models(models: &[Model]) -> ValidationReport {
    let index = ModelIndex::from_models(models);
    let mut report = ValidationReport::default();

    let mut seen_types = HashSet::new();
    for model in models {
        for composite in &model.composites {
            if !seen_types.insert(composite.qualified_name()) {
                report
                    .errors
                    .push(ModelError::duplicate("type", composite.qualified_name()));
            }
            validate_composite(&index, composite, &mut report);
        }
        for enum_type in &model.enums {
            if !seen_types.insert(enum_type.qualified_name()) {
                report
                    .errors
                    .push(ModelError::duplicate("enum", enum_type.qualified_name()));
            }
            let mut seen_values = HashSet::new();
            for value in &enum_type.values {
                if !seen_values.insert(value.name.as_str()) {
                    report.errors.push(ModelError::duplicate(
                        "enum value",
                        format!("{}.{}", enum_type.qualified_name(), value.name),
                    ));
                }
            }
            if enum_type.values.is_empty() {
                report
                    .warnings
                    .push(format!("enum '{}' has no values", enum_type.qualified_name()));
            }
        }
        for function in &model.functions {
            validate_function(&index, function, &mut report);
        }
    }

    report
}

fn validate_composite(index: &ModelIndex<'_>, composite: &Composite, report: &mut ValidationReport) {
    let qualified = composite.qualified_name();

    if let Some(supertype) = &composite.supertype {
        match index.resolve(supertype) {
            Some(TypeEntry::Composite(_)) => {}
            Some(TypeEntry::Enum(_)) => {
                report.errors.push(ModelError::validation(format!(
                    "supertype of '{qualified}' is an enum"
                )));
            }
            None => {
                report
                    .errors
                    .push(ModelError::unresolved(&qualified, ref_name(supertype)));
            }
        }
    }

    let mut seen_attrs = HashSet::new();
    for attribute in &composite.attributes {
        let path = format!("{qualified}.{}", attribute.name);
        if !seen_attrs.insert(attribute.name.as_str()) {
            report.errors.push(ModelError::duplicate("attribute", &path));
        }
        if !index.contains(&attribute.type_ref) {
            report
                .errors
                .push(ModelError::unresolved(&path, ref_name(&attribute.type_ref)));
        }
        let card = attribute.cardinality;
        if let Some(max) = card.max
            && (max == 0 || card.min > max)
        {
            report.errors.push(ModelError::InvalidCardinality {
                attribute: path,
                min: card.min,
                max: max.to_string(),
            });
        }
    }
}

fn validate_function(
    index: &ModelIndex<'_>,
    function: &crate::functions::Function,
    report: &mut ValidationReport,
) {
    let qualified = function.qualified_name();
    let mut seen_inputs = HashSet::new();
    for input in &function.inputs {
        let path = format!("{qualified}.{}", input.name);
        if !seen_inputs.insert(input.name.as_str()) {
            report.errors.push(ModelError::duplicate("input", &path));
        }
        if !index.contains(&input.type_ref) {
            report
                .errors
                .push(ModelError::unresolved(&path, ref_name(&input.type_ref)));
        }
    }
    if let Some(output) = &function.output
        && !index.contains(&output.type_ref)
    {
        let path = format!("{qualified}.{}", output.name);
        report
            .errors
            .push(ModelError::unresolved(path, ref_name(&output.type_ref)));
    }
}

fn ref_name(type_ref: &TypeRef) -> String {
    match type_ref {
        TypeRef::Basic(b) => format!("{b:?}"),
        TypeRef::Named { namespace, name } => format!("{namespace}.{name}"),
    }
}
