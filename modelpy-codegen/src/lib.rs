//! Python code generation backend.
//!
//! Turns resolved domain models into a complete Python package: one
//! pydantic-based `_bundle.py` per namespace, per-type proxy modules,
//! enum modules, and packaging scaffolding. Generation is deterministic;
//! the same models always produce byte-identical output.
//!
//! ```
//! use modelpy_model::Model;
//! use modelpy_codegen::generate;
//!
//! let models: Vec<Model> = vec![];
//! let files = generate(&models).unwrap();
//! assert!(files.is_empty());
//! ```

pub mod error;
pub mod mangle;
pub mod python;
pub mod writer;

use std::collections::BTreeMap;

use indexmap::IndexSet;
use modelpy_model::{Model, ModelIndex};
use tracing::{debug, warn};

pub use error::CodegenError;
pub use writer::PyWriter;

use crate::mangle::mangle_name;
use crate::python::bundle::build_bundle;
use crate::python::project::emit_project;

/// Generates the full output tree for a set of models, keyed by path
/// relative to the output root.
///
/// # Errors
/// Fails on the first namespace that cannot be generated; use
/// [`generate_all`] to keep going past failing namespaces.
pub fn generate(models: &[Model]) -> Result<BTreeMap<String, String>, CodegenError> {
    let index = ModelIndex::from_models(models);
    let mut files = BTreeMap::new();
    for model in models {
        check_collisions(model)?;
        let bundle = build_bundle(model, &index)?;
        files.extend(bundle.files);
    }
    files.extend(emit_project(models));
    debug!(files = files.len(), "generation complete");
    Ok(files)
}

/// Result of [`generate_all`]: the files of every namespace that
/// generated cleanly, plus the per-namespace failures.
#[derive(Debug, Default)]
pub struct GeneratedOutput {
    /// Generated files keyed by relative path.
    pub files: BTreeMap<String, String>,
    /// Namespaces that failed, with their first error.
    pub failures: Vec<(String, CodegenError)>,
}

/// Generates every namespace independently; one namespace's failure does
/// not block the others. Packaging scaffolding covers the namespaces
/// that succeeded.
#[must_use]
pub fn generate_all(models: &[Model]) -> GeneratedOutput {
    let index = ModelIndex::from_models(models);
    let mut output = GeneratedOutput::default();
    let mut generated: Vec<&Model> = Vec::with_capacity(models.len());
    for model in models {
        let result = check_collisions(model).and_then(|()| build_bundle(model, &index));
        match result {
            Ok(bundle) => {
                output.files.extend(bundle.files);
                generated.push(model);
            }
            Err(error) => {
                warn!(namespace = %model.namespace, %error, "namespace skipped");
                output.failures.push((model.namespace.clone(), error));
            }
        }
    }
    let scaffold: Vec<Model> = generated.iter().map(|m| (*m).clone()).collect();
    output.files.extend(emit_project(&scaffold));
    output
}

/// Rejects sibling identifiers that mangle to the same Python name.
fn check_collisions(model: &Model) -> Result<(), CodegenError> {
    for composite in &model.composites {
        let mut seen = IndexSet::new();
        for attribute in &composite.attributes {
            let mangled = mangle_name(&attribute.name);
            if !seen.insert(mangled.clone()) {
                return Err(CodegenError::NameCollision {
                    name: mangled,
                    path: format!("{}.{}", composite.qualified_name(), attribute.name),
                });
            }
        }
    }
    for function in &model.functions {
        let mut seen = IndexSet::new();
        for input in &function.inputs {
            let mangled = mangle_name(&input.name);
            if !seen.insert(mangled.clone()) {
                return Err(CodegenError::NameCollision {
                    name: mangled,
                    path: format!("{}.{}", function.qualified_name(), input.name),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelpy_model::{Attribute, BasicType, Cardinality, Composite, ParamConstraints, TypeRef};

    fn attr(name: &str) -> Attribute {
        Attribute {
            name: name.to_string(),
            type_ref: TypeRef::Basic(BasicType::String),
            cardinality: Cardinality::OPTIONAL,
            definition: None,
            constraints: ParamConstraints::default(),
            metadata: vec![],
        }
    }

    fn model(namespace: &str, composites: Vec<Composite>) -> Model {
        Model {
            namespace: namespace.to_string(),
            version: "1.0.0".to_string(),
            composites,
            enums: vec![],
            functions: vec![],
        }
    }

    fn composite(namespace: &str, name: &str, attributes: Vec<Attribute>) -> Composite {
        Composite {
            name: name.to_string(),
            namespace: namespace.to_string(),
            definition: None,
            attributes,
            supertype: None,
            conditions: vec![],
            metadata: vec![],
        }
    }

    #[test]
    fn test_generate_emits_bundle_and_scaffolding() {
        let models = vec![model(
            "demo",
            vec![composite("demo", "Foo", vec![attr("bar")])],
        )];
        let files = generate(&models).expect("generate");
        assert!(files.contains_key("src/demo/_bundle.py"));
        assert!(files.contains_key("src/demo/Foo.py"));
        assert!(files.contains_key("pyproject.toml"));
        assert!(files.contains_key("src/demo/version.py"));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let models = vec![model(
            "demo",
            vec![
                composite("demo", "Foo", vec![attr("bar"), attr("type")]),
                composite("demo", "Bar", vec![]),
            ],
        )];
        let first = generate(&models).expect("generate");
        let second = generate(&models).expect("generate");
        assert_eq!(first, second);
    }

    #[test]
    fn test_mangled_sibling_collision_is_rejected() {
        let models = vec![model(
            "demo",
            vec![composite(
                "demo",
                "Foo",
                vec![attr("type"), attr("rune_attr_type")],
            )],
        )];
        let err = generate(&models).unwrap_err();
        assert!(matches!(err, CodegenError::NameCollision { .. }));
    }

    #[test]
    fn test_if_else_condition_scenario() {
        use modelpy_model::{CmpOp, Condition, Expr};

        let inner = Expr::IfThenElse {
            cond: Box::new(Expr::Any(vec![
                Expr::cmp(CmpOp::Eq, Expr::attr("bar"), Expr::str_lit("I")),
                Expr::cmp(CmpOp::Eq, Expr::attr("bar"), Expr::str_lit("N")),
            ])),
            then: Box::new(Expr::IsAbsent(Box::new(Expr::attr("baz")))),
            otherwise: None,
        };
        let mut foo = composite("demo", "Foo", vec![attr("bar"), attr("baz")]);
        foo.conditions = vec![Condition {
            name: None,
            definition: None,
            expr: Expr::IfThenElse {
                cond: Box::new(Expr::cmp(CmpOp::Eq, Expr::attr("bar"), Expr::str_lit("Y"))),
                then: Box::new(Expr::Exists(Box::new(Expr::attr("baz")))),
                otherwise: Some(Box::new(inner)),
            },
        }];
        let models = vec![model("demo", vec![foo])];
        let files = generate(&models).expect("generate");
        let bundle = &files["src/demo/_bundle.py"];

        assert!(bundle.contains("bar: Optional[str] = Field(None, description='')"));
        assert!(bundle.contains("baz: Optional[str] = Field(None, description='')"));
        assert!(bundle.contains("def condition_0_(self):"));
        assert!(bundle.contains(
            "return if_cond_fn(rune_all_elements(rune_resolve_attr(self, \"bar\"), \"=\", \
             \"Y\"), _then_fn0, _else_fn0)"
        ));
        // The else branch dispatches into the nested conditional.
        assert!(bundle.contains("def _else_fn0():"));
        assert!(bundle.contains("_then_fn1, _else_fn1)"));
        assert!(bundle.contains("return (not rune_attr_exists(rune_resolve_attr(self, \"baz\")))"));
        assert!(bundle.contains("def _else_fn1():\n            return True"));
    }

    #[test]
    fn test_generate_all_isolates_failures() {
        let good = model("good", vec![composite("good", "Foo", vec![])]);
        let mut bad_composite = composite("bad", "A", vec![]);
        bad_composite.attributes = vec![Attribute {
            name: "a".to_string(),
            type_ref: TypeRef::named("bad", "A"),
            cardinality: Cardinality::REQUIRED,
            definition: None,
            constraints: ParamConstraints::default(),
            metadata: vec![],
        }];
        let bad = model("bad", vec![bad_composite]);

        let output = generate_all(&[bad, good]);
        assert!(output.files.contains_key("src/good/_bundle.py"));
        assert!(!output.files.contains_key("src/bad/_bundle.py"));
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].0, "bad");
        assert!(matches!(
            output.failures[0].1,
            CodegenError::IrreducibleCycle { .. }
        ));
    }
}
