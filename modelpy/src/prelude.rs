//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions.
//!
//! ```
//! use modelpy::prelude::*;
//! ```

// Model types
pub use modelpy_model::{
    Attribute, BasicType, Cardinality, CmpOp, Composite, Condition, EnumType, EnumValue, Expr,
    Function, FunctionInput, FunctionOutput, Literal, MetaTag, Model, ModelError, ModelIndex,
    ParamConstraints, TypeEntry, TypeRef,
};
pub use modelpy_model::{parse_models, validate_models, ValidationReport};

// Code generation
pub use modelpy_codegen::{generate, generate_all, CodegenError, GeneratedOutput};
