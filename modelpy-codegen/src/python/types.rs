//! Type and constraint lowering.
//!
//! Maps a resolved type plus its parameter constraints to the Python type
//! expression used in field declarations, and to the metadata-wrapped
//! variant used when an attribute carries key/reference/scheme metadata.

use modelpy_model::{BasicType, Cardinality, ModelIndex, ParamConstraints, TypeEntry, TypeRef};

use crate::error::CodegenError;

/// Kind of a lowered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoweredKind {
    /// Recognized scalar type.
    Basic(BasicType),
    /// Enumeration reference.
    Enum,
    /// Composite reference.
    Composite,
}

/// A resolved type lowered to its Python spelling.
#[derive(Debug, Clone)]
pub struct LoweredType {
    /// Kind of the target type.
    pub kind: LoweredKind,
    /// Dotted qualified name (or bare scalar name for basics).
    pub qualified: String,
}

impl LoweredType {
    /// Name usable inside the bundle: composites are flattened to
    /// underscore form, basics and enums keep their qualified spelling.
    #[must_use]
    pub fn local_name(&self) -> String {
        match self.kind {
            LoweredKind::Composite => self.qualified.replace('.', "_"),
            _ => self.qualified.clone(),
        }
    }

    /// The metadata-wrapped variant of this type. Each scalar has exactly
    /// one wrapper; composites and enums are their own wrapper.
    #[must_use]
    pub fn with_meta(&self) -> String {
        match self.kind {
            LoweredKind::Basic(basic) => with_meta_wrapper(basic).to_string(),
            _ => self.local_name(),
        }
    }

    /// Returns true for composite references, whose annotated form cannot
    /// be inlined until the target class object exists.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self.kind, LoweredKind::Composite)
    }
}

/// Lowers a type reference to its Python spelling.
///
/// Enum references carry the historical double `.<Name>` suffix selecting
/// the nested enumeration symbol within its namespace module; preserved
/// for output compatibility.
///
/// # Errors
/// Returns `CodegenError` if a named reference does not bind.
pub fn lower_type(type_ref: &TypeRef, index: &ModelIndex<'_>) -> Result<LoweredType, CodegenError> {
    match type_ref {
        TypeRef::Basic(basic) => Ok(LoweredType {
            kind: LoweredKind::Basic(*basic),
            qualified: python_basic_type(*basic).to_string(),
        }),
        TypeRef::Named { namespace, name } => match index.resolve(type_ref) {
            Some(TypeEntry::Enum(_)) => Ok(LoweredType {
                kind: LoweredKind::Enum,
                qualified: format!("{namespace}.{name}.{name}"),
            }),
            Some(TypeEntry::Composite(_)) => Ok(LoweredType {
                kind: LoweredKind::Composite,
                qualified: format!("{namespace}.{name}"),
            }),
            None => Err(modelpy_model::ModelError::unresolved(
                format!("{namespace}.{name}"),
                name,
            )
            .into()),
        },
    }
}

/// Maps a scalar to its Python type name.
#[must_use]
pub const fn python_basic_type(basic: BasicType) -> &'static str {
    match basic {
        BasicType::Boolean => "bool",
        BasicType::Int => "int",
        BasicType::Number => "Decimal",
        BasicType::String => "str",
        BasicType::Date => "datetime.date",
        BasicType::DateTime => "datetime.datetime",
        BasicType::Time => "datetime.time",
    }
}

/// Maps a scalar to its metadata-aware wrapper type.
#[must_use]
pub const fn with_meta_wrapper(basic: BasicType) -> &'static str {
    match basic {
        BasicType::Boolean => "BoolWithMeta",
        BasicType::Int => "IntWithMeta",
        BasicType::Number => "NumberWithMeta",
        BasicType::String => "StrWithMeta",
        BasicType::Date => "DateWithMeta",
        BasicType::DateTime => "DateTimeWithMeta",
        BasicType::Time => "TimeWithMeta",
    }
}

/// Flattened bundle-local class name for a namespaced type.
#[must_use]
pub fn bundle_class_name(namespace: &str, name: &str) -> String {
    format!("{}_{name}", namespace.replace('.', "_"))
}

/// Wraps a base type according to cardinality: sequences for multi-valued
/// attributes, `Optional[...]` (or `| None` in signature position) when
/// the lower bound is zero.
#[must_use]
pub fn format_cardinality(base: &str, cardinality: Cardinality, signature: bool) -> String {
    let mut ty = base.to_string();
    if cardinality.is_multi() {
        ty = format!("list[{ty}]");
    }
    if cardinality.is_optional() {
        ty = if signature {
            format!("{ty} | None")
        } else {
            format!("Optional[{ty}]")
        };
    }
    ty
}

/// Anchors a pattern with `^...$`; already-anchored patterns are not
/// double-anchored.
#[must_use]
pub fn anchor_pattern(pattern: &str) -> String {
    let body = pattern.strip_prefix('^').unwrap_or(pattern);
    let body = body.strip_suffix('$').unwrap_or(body);
    format!("^{body}$")
}

/// Constraint keywords that apply to the element type.
///
/// For single-valued attributes this includes length bounds; for
/// multi-valued attributes length bounds move to the sequence (see
/// [`sequence_props`]) and only pattern/digit constraints stay here.
#[must_use]
pub fn element_props(
    kind: LoweredKind,
    constraints: &ParamConstraints,
    multi: bool,
) -> Vec<(String, String)> {
    let mut props = Vec::new();
    match kind {
        LoweredKind::Basic(BasicType::String) => {
            if !multi {
                if let Some(min) = constraints.min_length
                    && min > 0
                {
                    props.push(("min_length".to_string(), min.to_string()));
                }
            }
            if let Some(pattern) = &constraints.pattern {
                props.push((
                    "pattern".to_string(),
                    format!("r'{}'", anchor_pattern(pattern)),
                ));
            }
            if !multi && let Some(max) = constraints.max_length {
                props.push(("max_length".to_string(), max.to_string()));
            }
        }
        LoweredKind::Basic(BasicType::Number) => {
            if let Some(digits) = constraints.digits {
                props.push(("max_digits".to_string(), digits.to_string()));
            }
            if let Some(fractional) = constraints.fractional_digits {
                props.push(("decimal_places".to_string(), fractional.to_string()));
            }
        }
        _ => {}
    }
    props
}

/// Sequence-level length constraints for a multi-valued attribute:
/// explicit `minLength`/`maxLength` constraints override the bounds
/// derived from cardinality.
#[must_use]
pub fn sequence_props(
    constraints: &ParamConstraints,
    cardinality: Cardinality,
) -> Vec<(String, String)> {
    let mut props = Vec::new();

    let min = match constraints.min_length {
        Some(min) if min > 0 => Some(min),
        _ if cardinality.min >= 1 => Some(cardinality.min.max(1)),
        _ => None,
    };
    if let Some(min) = min {
        props.push(("min_length".to_string(), min.to_string()));
    }

    let max = constraints
        .max_length
        .or(cardinality.max.filter(|&m| m > 1));
    if let Some(max) = max {
        props.push(("max_length".to_string(), max.to_string()));
    }

    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelpy_model::{Composite, EnumType, Model};

    fn model_with_types() -> Model {
        Model {
            namespace: "demo".to_string(),
            version: "0.0.0".to_string(),
            composites: vec![Composite {
                name: "Party".to_string(),
                namespace: "demo".to_string(),
                definition: None,
                attributes: vec![],
                supertype: None,
                conditions: vec![],
                metadata: vec![],
            }],
            enums: vec![EnumType {
                name: "Side".to_string(),
                namespace: "demo".to_string(),
                definition: None,
                values: vec![],
            }],
            functions: vec![],
        }
    }

    #[test]
    fn test_basic_lowering() {
        let index = ModelIndex::from_models(&[]);
        let lowered = lower_type(&TypeRef::Basic(BasicType::Number), &index).expect("lower");
        assert_eq!(lowered.qualified, "Decimal");
        assert_eq!(lowered.with_meta(), "NumberWithMeta");
    }

    #[test]
    fn test_enum_double_suffix() {
        let models = vec![model_with_types()];
        let index = ModelIndex::from_models(&models);
        let lowered = lower_type(&TypeRef::named("demo", "Side"), &index).expect("lower");
        assert_eq!(lowered.qualified, "demo.Side.Side");
        assert_eq!(lowered.local_name(), "demo.Side.Side");
    }

    #[test]
    fn test_composite_flattening() {
        let models = vec![model_with_types()];
        let index = ModelIndex::from_models(&models);
        let lowered = lower_type(&TypeRef::named("demo", "Party"), &index).expect("lower");
        assert_eq!(lowered.qualified, "demo.Party");
        assert_eq!(lowered.local_name(), "demo_Party");
        assert_eq!(lowered.with_meta(), "demo_Party");
    }

    #[test]
    fn test_format_cardinality() {
        assert_eq!(
            format_cardinality("bool", Cardinality::REQUIRED, false),
            "bool"
        );
        assert_eq!(
            format_cardinality("str", Cardinality::OPTIONAL, false),
            "Optional[str]"
        );
        assert_eq!(
            format_cardinality("str", Cardinality::new(0, None), false),
            "Optional[list[str]]"
        );
        assert_eq!(
            format_cardinality("str", Cardinality::new(1, None), false),
            "list[str]"
        );
        assert_eq!(
            format_cardinality("int", Cardinality::OPTIONAL, true),
            "int | None"
        );
    }

    #[test]
    fn test_anchor_pattern_idempotent() {
        assert_eq!(anchor_pattern("[a-z]+"), "^[a-z]+$");
        assert_eq!(anchor_pattern("^[a-z]+$"), "^[a-z]+$");
        assert_eq!(anchor_pattern(anchor_pattern("[a-z]+").as_str()), "^[a-z]+$");
    }

    #[test]
    fn test_string_props_single_valued() {
        let constraints = ParamConstraints {
            min_length: Some(1),
            max_length: Some(20),
            pattern: Some("[a-zA-Z]*".to_string()),
            ..Default::default()
        };
        let props = element_props(LoweredKind::Basic(BasicType::String), &constraints, false);
        assert_eq!(
            props,
            vec![
                ("min_length".to_string(), "1".to_string()),
                ("pattern".to_string(), "r'^[a-zA-Z]*$'".to_string()),
                ("max_length".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_length_moves_to_sequence_when_multi() {
        let constraints = ParamConstraints {
            min_length: Some(2),
            pattern: Some("[0-9]+".to_string()),
            ..Default::default()
        };
        let element = element_props(LoweredKind::Basic(BasicType::String), &constraints, true);
        assert_eq!(element.len(), 1);
        assert_eq!(element[0].0, "pattern");

        let sequence = sequence_props(&constraints, Cardinality::new(0, None));
        assert_eq!(
            sequence,
            vec![("min_length".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_sequence_min_one_only_when_required() {
        let constraints = ParamConstraints::default();
        assert!(sequence_props(&constraints, Cardinality::new(0, None)).is_empty());
        assert_eq!(
            sequence_props(&constraints, Cardinality::new(1, None)),
            vec![("min_length".to_string(), "1".to_string())]
        );
        assert_eq!(
            sequence_props(&constraints, Cardinality::new(0, Some(5))),
            vec![("max_length".to_string(), "5".to_string())]
        );
    }

    #[test]
    fn test_decimal_props() {
        let constraints = ParamConstraints {
            digits: Some(18),
            fractional_digits: Some(2),
            ..Default::default()
        };
        let props = element_props(LoweredKind::Basic(BasicType::Number), &constraints, true);
        assert_eq!(
            props,
            vec![
                ("max_digits".to_string(), "18".to_string()),
                ("decimal_places".to_string(), "2".to_string()),
            ]
        );
    }
}
