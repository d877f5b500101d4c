//! Function body emission.
//!
//! Functions are emitted into the namespace bundle under their flattened
//! name, decorated `@replaceable` so deployments can swap in a native
//! implementation, and `@validate_call` so inputs are coerced and checked
//! at the boundary.

use modelpy_model::{Function, ModelIndex};

use crate::error::CodegenError;
use crate::mangle::mangle_name;
use crate::python::expr::ExprCompiler;
use crate::python::types::{format_cardinality, lower_type};
use crate::writer::PyWriter;

/// Flattened bundle-local name of a function.
#[must_use]
pub fn function_bundle_name(function: &Function) -> String {
    format!(
        "{}_functions_{}",
        function.namespace.replace('.', "_"),
        function.name
    )
}

/// Emits one function definition for the namespace bundle.
///
/// # Errors
/// Fails on unresolved input/output types or unsupported expressions.
pub fn emit_function(function: &Function, index: &ModelIndex<'_>) -> Result<String, CodegenError> {
    let qualified = function.qualified_name();
    let bundle_name = function_bundle_name(function);

    let mut params = Vec::with_capacity(function.inputs.len());
    let mut doc_params = Vec::with_capacity(function.inputs.len());
    for input in &function.inputs {
        let lowered = lower_type(&input.type_ref, index)?;
        let ty = format_cardinality(&lowered.local_name(), input.cardinality, true);
        let name = mangle_name(&input.name);
        params.push(format!("{name}: {ty}"));
        doc_params.push((name, ty, input.definition.clone()));
    }

    let return_type = match &function.output {
        Some(output) => {
            let lowered = lower_type(&output.type_ref, index)?;
            format_cardinality(&lowered.local_name(), output.cardinality, true)
        }
        None => "None".to_string(),
    };

    let mut writer = PyWriter::new();
    writer.push_line("@replaceable");
    writer.push_line("@validate_call(config=dict(arbitrary_types_allowed=True))");
    writer.push_line(&format!(
        "def {bundle_name}({}) -> {return_type}:",
        params.join(", ")
    ));
    writer.indent();

    writer.push_line("\"\"\"");
    if let Some(definition) = &function.definition {
        writer.push_block(definition);
        writer.blank();
    }
    writer.push_line("Parameters");
    writer.push_line("----------");
    for (name, ty, definition) in &doc_params {
        writer.push_line(&format!("{name} : {ty}"));
        if let Some(definition) = definition {
            writer.indent();
            writer.push_block(definition);
            writer.unindent();
        }
    }
    writer.blank();
    writer.push_line("Returns");
    writer.push_line("-------");
    writer.push_line(&return_type);
    writer.blank();
    writer.push_line("\"\"\"");

    writer.push_line("_pre_registry = {}");
    writer.push_line("self = inspect.currentframe()");

    for (i, condition) in function.conditions.iter().enumerate() {
        writer.blank();
        let mut compiler = ExprCompiler::new();
        let body = compiler.compile(&condition.expr, &qualified)?;
        writer.push_line("@rune_local_condition(_pre_registry)");
        let method = match &condition.name {
            Some(name) => format!("condition_{i}_{name}"),
            None => format!("condition_{i}_"),
        };
        // Local conditions close over the frame object bound to `self`
        // above, so they take no parameters.
        writer.push_line(&format!("def {method}():"));
        writer.indent();
        if let Some(definition) = &condition.definition {
            writer.push_line("\"\"\"");
            writer.push_block(definition);
            writer.push_line("\"\"\"");
        }
        writer.push_line("item = self");
        for block in compiler.take_blocks() {
            writer.push_block(&block);
            writer.blank();
        }
        writer.push_line(&format!("return {body}"));
        writer.unindent();
    }
    if !function.conditions.is_empty() {
        writer.blank();
        writer.push_line("rune_execute_local_conditions(_pre_registry, 'Pre-condition')");
    }

    // One compiler for the whole body keeps closure names unique within
    // the shared function scope.
    let mut compiler = ExprCompiler::new();
    for assignment in &function.assignments {
        writer.blank();
        let value = compiler.compile(&assignment.expr, &qualified)?;
        for block in compiler.take_blocks() {
            writer.push_block(&block);
            writer.blank();
        }
        writer.push_line(&format!("{} = {value}", mangle_name(&assignment.target)));
    }

    if let Some(output) = &function.output {
        writer.push_line(&format!("return {}", mangle_name(&output.name)));
    }
    writer.unindent();
    Ok(writer.finish())
}
