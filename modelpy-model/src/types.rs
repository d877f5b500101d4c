//! Resolved-model type definitions.
//!
//! These structures mirror what the upstream resolver hands the backend:
//! record types with typed, cardinality-bounded attributes, enumerations,
//! and boolean business rules. The backend only reads them.

use serde::{Deserialize, Serialize};

use crate::expr::Condition;
use crate::functions::Function;

/// One unit of compilation: a namespace with its types and functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Dotted namespace, e.g. `demo.base`.
    pub namespace: String,
    /// Semantic version string for the generated package.
    pub version: String,
    /// Composite (record) types in declaration order.
    #[serde(default)]
    pub composites: Vec<Composite>,
    /// Enumerations in declaration order.
    #[serde(default)]
    pub enums: Vec<EnumType>,
    /// Functions in declaration order.
    #[serde(default)]
    pub functions: Vec<Function>,
}

/// Scalar types recognized by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicType {
    /// Boolean value.
    Boolean,
    /// Arbitrary-precision integer.
    Int,
    /// Arbitrary-precision decimal number.
    Number,
    /// Unicode string.
    String,
    /// Calendar date.
    Date,
    /// Date with time (zoned or unzoned).
    DateTime,
    /// Time of day.
    Time,
}

impl BasicType {
    /// Resolves a source-model scalar name, including the legacy aliases
    /// the original grammar treats as strings.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(Self::Boolean),
            "int" => Some(Self::Int),
            "number" => Some(Self::Number),
            "string" | "eventType" | "calculation" | "productType" => Some(Self::String),
            "date" => Some(Self::Date),
            "dateTime" | "zonedDateTime" => Some(Self::DateTime),
            "time" => Some(Self::Time),
            _ => None,
        }
    }
}

/// Reference from an attribute (or function signature) to a resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// A recognized scalar type.
    Basic(BasicType),
    /// A named composite or enum, bound by namespace-qualified lookup.
    Named {
        /// Dotted namespace of the target type.
        namespace: String,
        /// Type name within the namespace.
        name: String,
    },
}

impl TypeRef {
    /// Creates a named reference.
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Returns true for scalar references.
    #[must_use]
    pub const fn is_basic(&self) -> bool {
        matches!(self, Self::Basic(_))
    }
}

/// Metadata annotation on a type or attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetaTag {
    /// Keyed identity.
    Key,
    /// Externally keyed identity.
    KeyExternal,
    /// Synonym for key at attribute level.
    Id,
    /// Cross-reference to a keyed value.
    Reference,
    /// Cross-reference to an external key.
    ReferenceExternal,
    /// Scheme-qualified value.
    Scheme,
    /// Scoped key (location semantics).
    Location,
    /// Scoped reference (address semantics).
    Address,
    /// Scoped marker.
    Scoped,
}

/// Cardinality bounds of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cardinality {
    /// Minimum number of elements.
    pub min: u32,
    /// Maximum number of elements; `None` is unbounded.
    pub max: Option<u32>,
}

impl Cardinality {
    /// `(1..1)` required scalar.
    pub const REQUIRED: Self = Self {
        min: 1,
        max: Some(1),
    };

    /// `(0..1)` optional scalar.
    pub const OPTIONAL: Self = Self {
        min: 0,
        max: Some(1),
    };

    /// Creates bounds from explicit values.
    #[must_use]
    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Returns true if more than one element is allowed.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.max.is_none_or(|m| m > 1)
    }

    /// Returns true if the attribute may be absent.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.min == 0
    }
}

/// Parameter constraints on a scalar attribute type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParamConstraints {
    /// Total digit count for decimals.
    pub digits: Option<u32>,
    /// Fractional digit count for decimals.
    pub fractional_digits: Option<u32>,
    /// Minimum length (string or, for multi-valued attributes, sequence).
    pub min_length: Option<u32>,
    /// Maximum length (string or, for multi-valued attributes, sequence).
    pub max_length: Option<u32>,
    /// Regular expression the value must match; anchored at lowering.
    pub pattern: Option<String>,
}

impl ParamConstraints {
    /// Returns true when no constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digits.is_none()
            && self.fractional_digits.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
    }
}

/// A named, typed, cardinality-bounded attribute of a composite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name as declared in the source model.
    pub name: String,
    /// Reference to the attribute's resolved type.
    pub type_ref: TypeRef,
    /// Cardinality bounds.
    pub cardinality: Cardinality,
    /// Optional definition text, carried into the generated docstring.
    #[serde(default)]
    pub definition: Option<String>,
    /// Scalar parameter constraints.
    #[serde(default)]
    pub constraints: ParamConstraints,
    /// Metadata annotations in declaration order.
    #[serde(default)]
    pub metadata: Vec<MetaTag>,
}

/// A record type with attributes, optional supertype and conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composite {
    /// Type name.
    pub name: String,
    /// Dotted namespace the type is declared in.
    pub namespace: String,
    /// Optional definition text.
    #[serde(default)]
    pub definition: Option<String>,
    /// Attributes declared on this type (not inherited), in order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Optional supertype reference.
    #[serde(default)]
    pub supertype: Option<TypeRef>,
    /// Conditions declared on this type, in order.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Type-level metadata annotations.
    #[serde(default)]
    pub metadata: Vec<MetaTag>,
}

impl Composite {
    /// Returns the fully qualified dotted name.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// An enumeration type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumType {
    /// Enum name.
    pub name: String,
    /// Dotted namespace the enum is declared in.
    pub namespace: String,
    /// Optional definition text.
    #[serde(default)]
    pub definition: Option<String>,
    /// Enum values in declaration order.
    #[serde(default)]
    pub values: Vec<EnumValue>,
}

impl EnumType {
    /// Returns the fully qualified dotted name.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// A single enumeration value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumValue {
    /// Value name.
    pub name: String,
    /// Optional display string; defaults to the name in generated output.
    #[serde(default)]
    pub display: Option<String>,
    /// Optional definition text.
    #[serde(default)]
    pub definition: Option<String>,
}
