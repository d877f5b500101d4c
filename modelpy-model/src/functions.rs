//! Resolved function definitions.

use serde::{Deserialize, Serialize};

use crate::expr::{Condition, Expr};
use crate::types::{Cardinality, TypeRef};

/// A generated function: typed inputs, optional output, pre-conditions
/// and a sequence of output assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    /// Function name.
    pub name: String,
    /// Dotted namespace the function is declared in.
    pub namespace: String,
    /// Optional definition text.
    #[serde(default)]
    pub definition: Option<String>,
    /// Input parameters in declaration order.
    #[serde(default)]
    pub inputs: Vec<FunctionInput>,
    /// Optional output declaration.
    #[serde(default)]
    pub output: Option<FunctionOutput>,
    /// Pre-conditions evaluated against the inputs.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Output assignments in declaration order.
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl Function {
    /// Returns the fully qualified dotted name, functions living in a
    /// `functions` sub-package of their namespace.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.functions.{}", self.namespace, self.name)
    }
}

/// A typed function input parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionInput {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub type_ref: TypeRef,
    /// Cardinality bounds.
    pub cardinality: Cardinality,
    /// Optional definition text.
    #[serde(default)]
    pub definition: Option<String>,
}

/// A function output declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionOutput {
    /// Output name.
    pub name: String,
    /// Output type.
    pub type_ref: TypeRef,
    /// Cardinality bounds.
    pub cardinality: Cardinality,
}

/// A single assignment to the function output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Target name (the output, or a local alias).
    pub target: String,
    /// Assigned expression.
    pub expr: Expr,
}
