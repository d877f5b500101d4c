//! # modelpy
//!
//! Python code generation backend for resolved domain models.
//!
//! modelpy turns a resolved model set (composites, enumerations,
//! functions and their validation rules) into a complete, installable
//! Python package built on pydantic and the rune runtime.
//!
//! ## Features
//!
//! - **Namespace bundles** - One topologically ordered module per
//!   namespace, with forward references repaired in a second phase
//! - **Metadata-aware fields** - Keys, references and schemes lower to
//!   annotated wrapper types with validator tag sets
//! - **Rule compilation** - Conditions become runtime-checked methods,
//!   functions become replaceable, input-validated defs
//! - **Deterministic output** - The same model set always produces a
//!   byte-identical tree
//!
//! ## Quick Start
//!
//! ```
//! use modelpy::prelude::*;
//!
//! let models = parse_models(r#"{"namespace": "demo", "version": "1.0.0"}"#)?;
//! let files = generate(&models)?;
//! assert!(files.contains_key("pyproject.toml"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Organization
//!
//! - [`model`] - Model definitions, lookup index, validation
//! - [`codegen`] - Python emission: bundles, proxies, packaging

pub mod prelude;

/// Model definitions, index and validation.
pub mod model {
    pub use modelpy_model::*;
}

/// Python code generation.
pub mod codegen {
    pub use modelpy_codegen::*;
}
