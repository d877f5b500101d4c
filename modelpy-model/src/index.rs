//! Flattened lookup view over a set of models.
//!
//! The generator resolves named type references through this index rather
//! than walking the models on every lookup.

use indexmap::IndexMap;

use crate::types::{Composite, EnumType, Model, TypeRef};

/// What a named reference binds to.
#[derive(Debug, Clone, Copy)]
pub enum TypeEntry<'a> {
    /// A composite (record) type.
    Composite(&'a Composite),
    /// An enumeration.
    Enum(&'a EnumType),
}

/// Lookup index over every named type in a model set.
///
/// Insertion order follows declaration order, which keeps iteration
/// deterministic.
#[derive(Debug, Default)]
pub struct ModelIndex<'a> {
    types: IndexMap<String, TypeEntry<'a>>,
}

impl<'a> ModelIndex<'a> {
    /// Builds the index from a set of models.
    #[must_use]
    pub fn from_models(models: &'a [Model]) -> Self {
        let mut types = IndexMap::new();
        for model in models {
            for composite in &model.composites {
                types.insert(composite.qualified_name(), TypeEntry::Composite(composite));
            }
            for enum_type in &model.enums {
                types.insert(enum_type.qualified_name(), TypeEntry::Enum(enum_type));
            }
        }
        Self { types }
    }

    /// Resolves a named reference; `Basic` references never resolve here.
    #[must_use]
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<TypeEntry<'a>> {
        match type_ref {
            TypeRef::Basic(_) => None,
            TypeRef::Named { namespace, name } => {
                self.types.get(&format!("{namespace}.{name}")).copied()
            }
        }
    }

    /// Resolves a reference to a composite, if it binds to one.
    #[must_use]
    pub fn resolve_composite(&self, type_ref: &TypeRef) -> Option<&'a Composite> {
        match self.resolve(type_ref) {
            Some(TypeEntry::Composite(c)) => Some(c),
            _ => None,
        }
    }

    /// Resolves a reference to an enum, if it binds to one.
    #[must_use]
    pub fn resolve_enum(&self, type_ref: &TypeRef) -> Option<&'a EnumType> {
        match self.resolve(type_ref) {
            Some(TypeEntry::Enum(e)) => Some(e),
            _ => None,
        }
    }

    /// Returns true if the reference binds to any named type.
    #[must_use]
    pub fn contains(&self, type_ref: &TypeRef) -> bool {
        type_ref.is_basic() || self.resolve(type_ref).is_some()
    }

    /// Iterates over all indexed types in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypeEntry<'a>)> {
        self.types.iter()
    }
}
