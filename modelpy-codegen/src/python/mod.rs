//! Python source emission.
//!
//! Split by concern: type lowering, metadata resolution, expression
//! compilation, class/enum/function emission, bundle assembly, and
//! package scaffolding.

pub mod bundle;
pub mod classes;
pub mod enums;
pub mod expr;
pub mod functions;
pub mod meta;
pub mod project;
pub mod types;

pub use bundle::NamespaceBundle;
pub use classes::{emit_composite, EmissionUnit};
pub use expr::ExprCompiler;
pub use meta::MetaProfile;
pub use types::{LoweredKind, LoweredType};

/// Lint suppression prologue of every bundle module.
pub const PYLINT_HEADER: &str = "\
# pylint: disable=line-too-long, invalid-name, missing-function-docstring
# pylint: disable=bad-indentation, trailing-whitespace, superfluous-parens
# pylint: disable=wrong-import-position, unused-import, unused-wildcard-import
# pylint: disable=wildcard-import, wrong-import-order, missing-class-docstring
# pylint: disable=missing-module-docstring
";
