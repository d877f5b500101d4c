//! Rule expression trees.
//!
//! A condition's expression is a closed variant tree; every lowering site
//! in the backend matches exhaustively so a new node kind is a
//! compile-time obligation.

use serde::{Deserialize, Serialize};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    /// Equality (`=`).
    Eq,
    /// Inequality (`!=`).
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl CmpOp {
    /// Returns the source-level operator token.
    #[must_use]
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Literal values.
///
/// Decimals are carried as exact strings so emission never rounds through
/// a binary float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Decimal literal, exact textual form.
    Decimal(String),
    /// String literal.
    Str(String),
}

/// A boolean/value rule expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Attribute navigation from the instance under validation.
    AttributePath(Vec<String>),
    /// A literal value.
    Literal(Literal),
    /// Presence check.
    Exists(Box<Expr>),
    /// Absence check.
    IsAbsent(Box<Expr>),
    /// Element-wise comparison.
    Comparison {
        /// Operator.
        op: CmpOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Logical conjunction over two or more operands.
    All(Vec<Expr>),
    /// Logical disjunction over two or more operands.
    Any(Vec<Expr>),
    /// Element count of a sequence-valued expression.
    Count(Box<Expr>),
    /// Exactly-one-of / at-most-one-of constraint over sibling attributes.
    OneOf {
        /// Attribute names the constraint ranges over.
        attributes: Vec<String>,
        /// True for "exactly one of", false for "at most one of".
        required: bool,
    },
    /// Conditional expression; a missing else branch is vacuously true.
    IfThenElse {
        /// Branch condition.
        cond: Box<Expr>,
        /// Then branch.
        then: Box<Expr>,
        /// Optional else branch.
        otherwise: Option<Box<Expr>>,
    },
    /// Invocation of a generated function, arguments positional.
    FunctionCall {
        /// Dotted namespace of the function.
        namespace: String,
        /// Function name.
        name: String,
        /// Argument expressions.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Shorthand for a single-segment attribute path.
    pub fn attr(name: impl Into<String>) -> Self {
        Self::AttributePath(vec![name.into()])
    }

    /// Shorthand for a string literal.
    pub fn str_lit(value: impl Into<String>) -> Self {
        Self::Literal(Literal::Str(value.into()))
    }

    /// Shorthand for a comparison node.
    #[must_use]
    pub fn cmp(op: CmpOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Comparison {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// A validation rule attached to a composite or function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    /// Optional rule name; part of the generated method name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional definition text, carried into the docstring.
    #[serde(default)]
    pub definition: Option<String>,
    /// The rule expression.
    pub expr: Expr,
}
