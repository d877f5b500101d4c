//! Namespace bundle assembly.
//!
//! All composites and functions of one namespace are emitted into a
//! single `_bundle.py` module, topologically ordered so that phase-1
//! class bodies resolve; unresolvable forward references become phase-2
//! annotation patches followed by `model_rebuild()` calls. Each public
//! type then gets a small proxy module re-exporting its bundle symbol
//! under the model-level name.

use indexmap::{IndexMap, IndexSet};
use modelpy_model::{Cardinality, Model, ModelIndex, TypeEntry, TypeRef};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::error::CodegenError;
use crate::python::classes::{emit_composite, EmissionUnit};
use crate::python::enums::emit_enum;
use crate::python::functions::{emit_function, function_bundle_name};
use crate::python::meta::resolve_attribute_meta;
use crate::python::PYLINT_HEADER;

/// Fixed import prologue of every bundle module.
const BUNDLE_PROLOGUE: &str = "\
from __future__ import annotations
from typing import Annotated, Optional
import datetime
import inspect
import sys
from decimal import Decimal
from pydantic import Field, validate_call
from rune.runtime.base_data_class import BaseDataClass
from rune.runtime.metadata import *
from rune.runtime.utils import *
from rune.runtime.conditions import *
from rune.runtime.func_proxy import *
";

/// Generated sources for one namespace, keyed by path relative to the
/// package root.
#[derive(Debug)]
pub struct NamespaceBundle {
    /// Dotted namespace.
    pub namespace: String,
    /// Relative path to generated module text.
    pub files: IndexMap<String, String>,
}

/// Builds the bundle and proxy modules for one model namespace.
///
/// # Errors
/// Fails on irreducible required cycles or any per-type emission error.
pub fn build_bundle(model: &Model, index: &ModelIndex<'_>) -> Result<NamespaceBundle, CodegenError> {
    let namespace = &model.namespace;
    let ns_path = namespace.replace('.', "/");
    debug!(namespace, composites = model.composites.len(), "bundling namespace");

    let order = emission_order(model, index)?;

    let mut drafted: IndexSet<String> = IndexSet::new();
    let mut units: Vec<EmissionUnit> = Vec::with_capacity(order.len());
    for i in order {
        let composite = &model.composites[i];
        let unit = emit_composite(composite, index, &drafted)?;
        drafted.insert(composite.qualified_name());
        units.push(unit);
    }

    let mut function_bodies = Vec::with_capacity(model.functions.len());
    for function in &model.functions {
        function_bodies.push(emit_function(function, index)?);
    }

    let mut bundle = String::new();
    bundle.push_str(PYLINT_HEADER);
    bundle.push_str(BUNDLE_PROLOGUE);
    for import in enum_imports(model, index) {
        bundle.push_str(&import);
        bundle.push('\n');
    }
    for unit in &units {
        bundle.push('\n');
        bundle.push_str(&unit.body);
    }
    for body in &function_bodies {
        bundle.push('\n');
        bundle.push_str(body);
    }
    bundle.push('\n');
    bundle.push_str("# Phase 2: Delayed Annotation Updates\n");
    for unit in &units {
        for patch in &unit.patches {
            bundle.push_str(patch);
            bundle.push('\n');
        }
    }
    bundle.push('\n');
    bundle.push_str("# Phase 3: Rebuild\n");
    for unit in &units {
        if unit.needs_rebuild {
            bundle.push_str(&format!("{}.model_rebuild()\n", unit.bundle_name));
        }
    }
    if !model.functions.is_empty() {
        // The guardian rebinds the module class so stray attribute
        // lookups on the bundle fail loudly.
        bundle.push('\n');
        bundle.push_str(
            "sys.modules[__name__].__class__ = \
             create_module_attr_guardian(sys.modules[__name__].__class__)\n",
        );
    }
    bundle.push('\n');
    bundle.push_str("# EOF\n");

    let mut files = IndexMap::new();
    files.insert(format!("src/{ns_path}/_bundle.py"), bundle);

    for unit in &units {
        files.insert(
            format!("src/{ns_path}/{}.py", unit.class_name),
            format!(
                "from {namespace}._bundle import {} as {}\n\n# EOF\n",
                unit.bundle_name, unit.class_name
            ),
        );
    }
    for enum_type in &model.enums {
        files.insert(
            format!("src/{ns_path}/{}.py", enum_type.name),
            emit_enum(enum_type),
        );
    }
    for function in &model.functions {
        files.insert(
            format!("src/{ns_path}/functions/{}.py", function.name),
            format!(
                "# pylint: disable=unused-import\nimport sys\n\
                 from rune.runtime.func_proxy import create_module_attr_guardian\n\
                 from {namespace}._bundle import {} as {}\n\n\
                 sys.modules[__name__].__class__ = \
                 create_module_attr_guardian(sys.modules[__name__].__class__)\n\n# EOF\n",
                function_bundle_name(function),
                function.name
            ),
        );
    }

    Ok(NamespaceBundle {
        namespace: namespace.clone(),
        files,
    })
}

/// Computes a deterministic emission order for the namespace's
/// composites. Supertype edges are hard; composite-typed attribute edges
/// are satisfied when possible and otherwise deferred to phase 2.
fn emission_order(model: &Model, index: &ModelIndex<'_>) -> Result<Vec<usize>, CodegenError> {
    let n = model.composites.len();
    let slot: IndexMap<String, usize> = model
        .composites
        .iter()
        .enumerate()
        .map(|(i, c)| (c.qualified_name(), i))
        .collect();

    // deps[i] = (dependency slot, hard)
    let mut deps: Vec<Vec<(usize, bool)>> = vec![Vec::new(); n];
    let mut required = DiGraph::<usize, ()>::new();
    let nodes: Vec<NodeIndex> = (0..n).map(|i| required.add_node(i)).collect();

    for (i, composite) in model.composites.iter().enumerate() {
        if let Some(super_ref) = &composite.supertype
            && let TypeRef::Named { namespace, name } = super_ref
            && let Some(&j) = slot.get(&format!("{namespace}.{name}"))
        {
            deps[i].push((j, true));
            required.add_edge(nodes[j], nodes[i], ());
        }
        for attribute in &composite.attributes {
            let TypeRef::Named { namespace, name } = &attribute.type_ref else {
                continue;
            };
            if !matches!(index.resolve(&attribute.type_ref), Some(TypeEntry::Composite(_))) {
                continue;
            }
            let Some(&j) = slot.get(&format!("{namespace}.{name}")) else {
                continue;
            };
            deps[i].push((j, false));
            let path = format!("{}.{}", composite.qualified_name(), attribute.name);
            let profile = resolve_attribute_meta(&attribute.metadata, &path)?;
            // Wrapped fields are always deferred to phase 2, so only a
            // plain required reference forces ordering.
            if is_required_single(attribute.cardinality) && profile.is_plain() {
                required.add_edge(nodes[j], nodes[i], ());
            }
        }
    }

    check_required_cycles(model, &required)?;

    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let ready = |deps: &[(usize, bool)], placed: &[bool], hard_only: bool| {
        deps.iter()
            .filter(|(_, hard)| *hard || !hard_only)
            .all(|&(j, _)| placed[j])
    };
    while order.len() < n {
        let next = (0..n)
            .find(|&i| !placed[i] && ready(&deps[i], &placed, false))
            .or_else(|| (0..n).find(|&i| !placed[i] && ready(&deps[i], &placed, true)));
        // Hard edges are acyclic after check_required_cycles, so a
        // candidate always exists.
        let Some(i) = next else {
            return Err(CodegenError::generation(format!(
                "no admissible emission order in namespace '{}'",
                model.namespace
            )));
        };
        placed[i] = true;
        order.push(i);
    }
    Ok(order)
}

const fn is_required_single(cardinality: Cardinality) -> bool {
    cardinality.min >= 1 && matches!(cardinality.max, Some(1))
}

fn check_required_cycles(
    model: &Model,
    required: &DiGraph<usize, ()>,
) -> Result<(), CodegenError> {
    for scc in tarjan_scc(required) {
        let cyclic = scc.len() > 1
            || (scc.len() == 1 && required.find_edge(scc[0], scc[0]).is_some());
        if cyclic {
            let mut members: Vec<usize> = scc.iter().map(|ix| required[*ix]).collect();
            members.sort_unstable();
            let mut names: Vec<String> = members
                .iter()
                .map(|&i| model.composites[i].qualified_name())
                .collect();
            names.push(names[0].clone());
            return Err(CodegenError::IrreducibleCycle {
                path: names.join(" -> "),
            });
        }
    }
    Ok(())
}

/// Import statements for every enumeration referenced from this
/// namespace's composites and functions, sorted and deduplicated.
fn enum_imports(model: &Model, index: &ModelIndex<'_>) -> Vec<String> {
    let mut imports: IndexSet<String> = IndexSet::new();
    let mut add = |type_ref: &TypeRef| {
        if let TypeRef::Named { namespace, name } = type_ref
            && matches!(index.resolve(type_ref), Some(TypeEntry::Enum(_)))
        {
            imports.insert(format!("import {namespace}.{name}"));
        }
    };
    for composite in &model.composites {
        for attribute in &composite.attributes {
            add(&attribute.type_ref);
        }
    }
    for function in &model.functions {
        for input in &function.inputs {
            add(&input.type_ref);
        }
        if let Some(output) = &function.output {
            add(&output.type_ref);
        }
    }
    let mut sorted: Vec<String> = imports.into_iter().collect();
    sorted.sort();
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelpy_model::{Attribute, BasicType, Composite, EnumType, ParamConstraints};

    fn attr(name: &str, type_ref: TypeRef, cardinality: Cardinality) -> Attribute {
        Attribute {
            name: name.to_string(),
            type_ref,
            cardinality,
            definition: None,
            constraints: ParamConstraints::default(),
            metadata: vec![],
        }
    }

    fn composite(name: &str, attributes: Vec<Attribute>) -> Composite {
        Composite {
            name: name.to_string(),
            namespace: "demo".to_string(),
            definition: None,
            attributes,
            supertype: None,
            conditions: vec![],
            metadata: vec![],
        }
    }

    fn model(composites: Vec<Composite>) -> Model {
        Model {
            namespace: "demo".to_string(),
            version: "1.0.0".to_string(),
            composites,
            enums: vec![],
            functions: vec![],
        }
    }

    #[test]
    fn test_required_dependency_orders_target_first() {
        // Foo is declared first but requires Bar, so Bar is drafted first
        // and no patch is needed.
        let m = model(vec![
            composite(
                "Foo",
                vec![attr("bar", TypeRef::named("demo", "Bar"), Cardinality::REQUIRED)],
            ),
            composite("Bar", vec![]),
        ]);
        let models = vec![m];
        let index = ModelIndex::from_models(&models);
        let bundle = build_bundle(&models[0], &index).expect("bundle");
        let text = &bundle.files["src/demo/_bundle.py"];
        let bar = text.find("class demo_Bar(").expect("Bar emitted");
        let foo = text.find("class demo_Foo(").expect("Foo emitted");
        assert!(bar < foo);
        assert!(!text.contains("__annotations__"));
        // The inline composite annotation still carries the wrapper, so
        // Foo rebuilds while Bar does not.
        assert!(text.contains("demo_Foo.model_rebuild()"));
        assert!(!text.contains("demo_Bar.model_rebuild()"));
    }

    #[test]
    fn test_optional_cycle_becomes_patch_and_rebuild() {
        let m = model(vec![
            composite(
                "A",
                vec![attr("b", TypeRef::named("demo", "B"), Cardinality::OPTIONAL)],
            ),
            composite(
                "B",
                vec![attr("a", TypeRef::named("demo", "A"), Cardinality::OPTIONAL)],
            ),
        ]);
        let models = vec![m];
        let index = ModelIndex::from_models(&models);
        let bundle = build_bundle(&models[0], &index).expect("bundle");
        let text = &bundle.files["src/demo/_bundle.py"];
        assert!(text.contains("# Phase 2: Delayed Annotation Updates"));
        assert!(text.contains(
            "demo_A.__annotations__[\"b\"] = Optional[Annotated[\
             demo_B, demo_B.serializer(), demo_B.validator()]]"
        ));
        assert!(text.contains("# Phase 3: Rebuild"));
        assert!(text.contains("demo_A.model_rebuild()"));
        assert!(text.contains("demo_B.model_rebuild()"));
        // B is emitted after A here, so its reference to A resolves inline.
        assert!(!text.contains("demo_B.__annotations__"));
    }

    #[test]
    fn test_required_cycle_is_irreducible() {
        let m = model(vec![
            composite(
                "A",
                vec![attr("b", TypeRef::named("demo", "B"), Cardinality::REQUIRED)],
            ),
            composite(
                "B",
                vec![attr("a", TypeRef::named("demo", "A"), Cardinality::REQUIRED)],
            ),
        ]);
        let models = vec![m];
        let index = ModelIndex::from_models(&models);
        let err = build_bundle(&models[0], &index).unwrap_err();
        match err {
            CodegenError::IrreducibleCycle { path } => {
                assert_eq!(path, "demo.A -> demo.B -> demo.A");
            }
            other => panic!("expected IrreducibleCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_ties_break_by_declaration_order() {
        let m = model(vec![
            composite("C", vec![]),
            composite("A", vec![]),
            composite("B", vec![]),
        ]);
        let models = vec![m];
        let index = ModelIndex::from_models(&models);
        let bundle = build_bundle(&models[0], &index).expect("bundle");
        let text = &bundle.files["src/demo/_bundle.py"];
        let c = text.find("class demo_C(").expect("C");
        let a = text.find("class demo_A(").expect("A");
        let b = text.find("class demo_B(").expect("B");
        assert!(c < a && a < b);
    }

    #[test]
    fn test_enum_import_and_proxy_files() {
        let mut m = model(vec![composite(
            "Foo",
            vec![attr("side", TypeRef::named("demo", "Side"), Cardinality::REQUIRED)],
        )]);
        m.enums = vec![EnumType {
            name: "Side".to_string(),
            namespace: "demo".to_string(),
            definition: None,
            values: vec![],
        }];
        let models = vec![m];
        let index = ModelIndex::from_models(&models);
        let bundle = build_bundle(&models[0], &index).expect("bundle");

        let text = &bundle.files["src/demo/_bundle.py"];
        assert!(text.contains("import demo.Side\n"));
        assert!(text.contains("side: demo.Side.Side = Field(..., description='')"));

        assert_eq!(
            bundle.files["src/demo/Foo.py"],
            "from demo._bundle import demo_Foo as Foo\n\n# EOF\n"
        );
        assert!(bundle.files["src/demo/Side.py"].contains("class Side("));
    }

    #[test]
    fn test_function_namespace_gets_module_guardians() {
        use modelpy_model::{Function, FunctionInput, FunctionOutput};
        let mut m = model(vec![]);
        m.functions = vec![Function {
            name: "Abs".to_string(),
            namespace: "demo".to_string(),
            definition: None,
            inputs: vec![FunctionInput {
                name: "arg".to_string(),
                type_ref: TypeRef::Basic(BasicType::Number),
                cardinality: Cardinality::REQUIRED,
                definition: None,
            }],
            output: Some(FunctionOutput {
                name: "result".to_string(),
                type_ref: TypeRef::Basic(BasicType::Number),
                cardinality: Cardinality::REQUIRED,
            }),
            conditions: vec![],
            assignments: vec![],
        }];
        let models = vec![m];
        let index = ModelIndex::from_models(&models);
        let bundle = build_bundle(&models[0], &index).expect("bundle");

        let guardian = "sys.modules[__name__].__class__ = \
                        create_module_attr_guardian(sys.modules[__name__].__class__)";
        let text = &bundle.files["src/demo/_bundle.py"];
        assert!(text.contains("import sys\n"));
        assert!(text.contains(guardian));

        let proxy = &bundle.files["src/demo/functions/Abs.py"];
        assert!(proxy.starts_with("# pylint: disable=unused-import\nimport sys\n"));
        assert!(proxy.contains("from demo._bundle import demo_functions_Abs as Abs"));
        assert!(proxy.contains(guardian));
        assert!(proxy.ends_with("# EOF\n"));
    }

    #[test]
    fn test_class_only_bundle_has_no_guardian() {
        let m = model(vec![composite("Foo", vec![])]);
        let models = vec![m];
        let index = ModelIndex::from_models(&models);
        let bundle = build_bundle(&models[0], &index).expect("bundle");
        let text = &bundle.files["src/demo/_bundle.py"];
        assert!(!text.contains("create_module_attr_guardian("));
        assert!(text.starts_with(
            "# pylint: disable=line-too-long, invalid-name, missing-function-docstring\n\
             # pylint: disable=bad-indentation, trailing-whitespace, superfluous-parens\n"
        ));
        assert!(text.contains(
            "# pylint: disable=missing-module-docstring\nfrom __future__ import annotations\n"
        ));
    }

    #[test]
    fn test_bundle_is_deterministic() {
        let make = || {
            let m = model(vec![
                composite(
                    "A",
                    vec![
                        attr("b", TypeRef::named("demo", "B"), Cardinality::OPTIONAL),
                        attr("n", TypeRef::Basic(BasicType::Number), Cardinality::REQUIRED),
                    ],
                ),
                composite("B", vec![]),
            ]);
            let models = vec![m];
            let index = ModelIndex::from_models(&models);
            build_bundle(&models[0], &index).expect("bundle").files
        };
        assert_eq!(make(), make());
    }
}
