//! Enumeration module emission.
//!
//! Each enumeration becomes its own module holding a single `Enum`
//! subclass mixed with the runtime metadata mixin, so enum-valued fields
//! can carry schemes like any other metadata-bearing value.

use modelpy_model::EnumType;

use crate::mangle::mangle_name;
use crate::writer::PyWriter;

/// Emits the module text for one enumeration.
#[must_use]
pub fn emit_enum(enum_type: &EnumType) -> String {
    let mut writer = PyWriter::new();
    writer.push_line("# pylint: disable=missing-module-docstring, invalid-name, line-too-long");
    writer.push_line("from enum import Enum");
    writer.push_line("import rune.runtime.metadata");
    writer.blank();
    writer.push_line(&format!("__all__ = ['{}']", enum_type.name));
    writer.blank();
    writer.push_line(&format!(
        "class {}(rune.runtime.metadata.EnumWithMetaMixin, Enum):",
        enum_type.name
    ));
    writer.indent();
    if let Some(definition) = &enum_type.definition {
        writer.push_line("\"\"\"");
        writer.push_block(definition);
        writer.push_line("\"\"\"");
    }

    let mut values: Vec<_> = enum_type.values.iter().collect();
    values.sort_by(|a, b| a.name.cmp(&b.name));

    if values.is_empty() {
        writer.push_line("pass");
    }
    for value in values {
        let symbol = mangle_name(&value.name);
        let display = value.display.as_deref().unwrap_or(&value.name);
        writer.push_line(&format!("{symbol} = \"{display}\""));
        if let Some(definition) = &value.definition {
            writer.push_line("\"\"\"");
            writer.push_block(definition);
            writer.push_line("\"\"\"");
        }
    }
    writer.unindent();
    writer.finish()
}
