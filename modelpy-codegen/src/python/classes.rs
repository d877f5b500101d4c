//! Two-phase composite class emission.
//!
//! A composite becomes a pydantic `BaseDataClass` subclass. Fields whose
//! target class is already drafted in the bundle are annotated inline;
//! fields pointing forward (cycle back-edges) are declared with a quoted
//! annotation and repaired after all classes exist via an
//! `__annotations__` patch plus `model_rebuild()`.

use indexmap::IndexSet;
use modelpy_model::{Attribute, Composite, MetaTag, ModelIndex};

use crate::error::CodegenError;
use crate::mangle::mangle_name;
use crate::python::expr::emit_condition;
use crate::python::meta::{resolve_attribute_meta, resolve_class_meta, MetaProfile};
use crate::python::types::{
    bundle_class_name, element_props, format_cardinality, lower_type, sequence_props, LoweredType,
};
use crate::writer::PyWriter;

/// One emitted class plus its deferred repair work.
#[derive(Debug, Clone)]
pub struct EmissionUnit {
    /// Model-level class name.
    pub class_name: String,
    /// Flattened bundle-local class name.
    pub bundle_name: String,
    /// Phase-1 class body.
    pub body: String,
    /// Phase-2 `__annotations__` patch statements.
    pub patches: Vec<String>,
    /// True when the class needs `model_rebuild()` after patching.
    pub needs_rebuild: bool,
}

/// Emits one composite. `drafted` holds the qualified names of composites
/// already declared earlier in the bundle; references to anything else
/// are deferred to phase 2.
///
/// # Errors
/// Fails on unresolved references, unsupported metadata, or a supertype
/// outside the composite's namespace.
pub fn emit_composite(
    composite: &Composite,
    index: &ModelIndex<'_>,
    drafted: &IndexSet<String>,
) -> Result<EmissionUnit, CodegenError> {
    let qualified = composite.qualified_name();
    let bundle_name = bundle_class_name(&composite.namespace, &composite.name);

    let base = match &composite.supertype {
        Some(super_ref) => {
            let super_composite = index.resolve_composite(super_ref).ok_or_else(|| {
                CodegenError::unsupported("unresolved supertype", qualified.as_str())
            })?;
            if super_composite.namespace != composite.namespace {
                return Err(CodegenError::unsupported(
                    "cross-namespace supertype",
                    qualified.as_str(),
                ));
            }
            bundle_class_name(&super_composite.namespace, &super_composite.name)
        }
        None => "BaseDataClass".to_string(),
    };

    let mut writer = PyWriter::new();
    let mut patches = Vec::new();

    writer.push_line(&format!("class {bundle_name}({base}):"));
    writer.indent();

    let allowed = resolve_class_meta(&composite.metadata, &qualified)?;
    if !allowed.is_empty() {
        let quoted: Vec<String> = allowed.iter().map(|t| format!("'{t}'")).collect();
        writer.push_line(&format!("_ALLOWED_METADATA = {{{}}}", quoted.join(", ")));
    }
    if let Some(definition) = &composite.definition {
        writer.push_line("\"\"\"");
        writer.push_block(definition);
        writer.push_line("\"\"\"");
    }
    writer.push_line(&format!("_FQRTN = '{qualified}'"));

    let mut key_ref_constraints = Vec::new();
    let mut has_wrapped_field = false;
    for attribute in &composite.attributes {
        let field = emit_attribute(composite, attribute, index, drafted, &bundle_name)?;
        writer.push_line(&field.declaration);
        if let Some(definition) = &attribute.definition {
            writer.push_line("\"\"\"");
            writer.push_block(definition);
            writer.push_line("\"\"\"");
        }
        has_wrapped_field |= field.uses_wrapper;
        if let Some(patch) = field.patch {
            patches.push(patch);
        }
        if let Some(tags) = field.key_ref_tags {
            key_ref_constraints.push((attribute.name.clone(), tags));
        }
    }

    if !key_ref_constraints.is_empty() {
        let entries: Vec<String> = key_ref_constraints
            .iter()
            .map(|(name, tags)| format!("'{name}': {tags}"))
            .collect();
        writer.push_line(&format!(
            "_KEY_REF_CONSTRAINTS = {{{}}}",
            entries.join(", ")
        ));
    }

    for (i, condition) in composite.conditions.iter().enumerate() {
        writer.blank();
        emit_condition(&mut writer, i, condition, &qualified)?;
    }

    writer.unindent();

    // A composite-typed field uses the wrapper machinery even when its
    // annotation was inlined, so the class still needs a rebuild.
    let needs_rebuild = !patches.is_empty() || has_wrapped_field;
    Ok(EmissionUnit {
        class_name: composite.name.clone(),
        bundle_name,
        body: writer.finish(),
        patches,
        needs_rebuild,
    })
}

struct EmittedField {
    declaration: String,
    patch: Option<String>,
    key_ref_tags: Option<String>,
    uses_wrapper: bool,
}

fn emit_attribute(
    composite: &Composite,
    attribute: &Attribute,
    index: &ModelIndex<'_>,
    drafted: &IndexSet<String>,
    bundle_name: &str,
) -> Result<EmittedField, CodegenError> {
    let path = format!("{}.{}", composite.qualified_name(), attribute.name);
    let field_name = mangle_name(&attribute.name);
    let lowered = lower_type(&attribute.type_ref, index)?;
    let mut profile = resolve_attribute_meta(&attribute.metadata, &path)?;

    if lowered.is_composite() {
        let target = index.resolve_composite(&attribute.type_ref).ok_or_else(|| {
            CodegenError::unsupported("unresolved attribute type", path.as_str())
        })?;
        if target.namespace != composite.namespace {
            return Err(CodegenError::unsupported(
                "cross-namespace composite reference",
                path.as_str(),
            ));
        }
        // A reference to a keyed type accepts the key tags as well.
        if profile.has_reference
            && target
                .metadata
                .iter()
                .any(|t| matches!(t, MetaTag::Key | MetaTag::KeyExternal | MetaTag::Id))
        {
            profile.union_key_tags();
        }
    }

    let multi = attribute.cardinality.is_multi();
    let mut core = annotated_core(&lowered, &profile);
    if multi {
        let element = element_props(lowered.kind, &attribute.constraints, true);
        if !element.is_empty() {
            core = format!("Annotated[{core}, Field({})]", render_props(&element));
        }
    }
    let full_type = format_cardinality(&core, attribute.cardinality, false);

    // A metadata-carrying composite field cannot be annotated inline:
    // the wrapper is built from the class object, so the full type is
    // attached in phase 2. A plain composite field is deferred only when
    // the target class is not drafted yet. Deferred fields declare the
    // bare flattened name in phase 1.
    let wrapped_meta = lowered.is_composite() && !profile.is_plain();
    let delayed =
        lowered.is_composite() && (wrapped_meta || !drafted.contains(&lowered.qualified));
    let phase1_type = if delayed {
        format_cardinality(&lowered.local_name(), attribute.cardinality, false)
    } else {
        full_type.clone()
    };
    let annotation = if lowered.is_composite() && !drafted.contains(&lowered.qualified) {
        format!("\"{phase1_type}\"")
    } else {
        phase1_type
    };

    let mut args = vec![if attribute.cardinality.is_optional() {
        "None".to_string()
    } else {
        "...".to_string()
    }];
    args.push(format!(
        "description='{}'",
        escape_single(attribute.definition.as_deref().unwrap_or(""))
    ));
    if multi {
        let sequence = sequence_props(&attribute.constraints, attribute.cardinality);
        if !sequence.is_empty() {
            args.push(render_props(&sequence));
        }
    } else {
        let element = element_props(lowered.kind, &attribute.constraints, false);
        if !element.is_empty() {
            args.push(render_props(&element));
        }
    }

    let declaration = format!("{field_name}: {annotation} = Field({})", args.join(", "));
    let patch = delayed.then(|| {
        format!("{bundle_name}.__annotations__[\"{field_name}\"] = {full_type}")
    });
    let key_ref_tags = key_ref_set(&profile);

    Ok(EmittedField {
        declaration,
        patch,
        key_ref_tags,
        uses_wrapper: lowered.is_composite(),
    })
}

/// The element type with its serializer/validator pair. Composite
/// references always carry the pair (with empty validator arguments when
/// the field has no metadata) so nested objects serialize their
/// key/reference state; plain scalars and enums stay bare.
fn annotated_core(lowered: &LoweredType, profile: &MetaProfile) -> String {
    if profile.is_plain() {
        if lowered.is_composite() {
            let name = lowered.local_name();
            return format!("Annotated[{name}, {name}.serializer(), {name}.validator()]");
        }
        return lowered.local_name();
    }
    let wrapper = lowered.with_meta();
    let inner = if profile.has_reference {
        format!("{wrapper} | BaseReference")
    } else {
        wrapper.clone()
    };
    format!(
        "Annotated[{inner}, {wrapper}.serializer(), {wrapper}.validator({})]",
        profile.tag_tuple()
    )
}

/// Key/reference tag set for `_KEY_REF_CONSTRAINTS`; scheme tags are
/// serializer-only and excluded.
fn key_ref_set(profile: &MetaProfile) -> Option<String> {
    let tags: Vec<String> = profile
        .tags
        .iter()
        .filter(|t| **t != "@scheme")
        .map(|t| format!("'{t}'"))
        .collect();
    if tags.is_empty() {
        None
    } else {
        Some(format!("{{{}}}", tags.join(", ")))
    }
}

fn render_props(props: &[(String, String)]) -> String {
    props
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_single(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', " ")
}
