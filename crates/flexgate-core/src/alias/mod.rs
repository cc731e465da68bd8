//! Class aliases: per-class descriptors deciding which attributes cross the
//! wire and how their values are coerced.
//!
//! Invariants:
//! - An alias is compiled once per class and cached by `AliasRegistry`.
//! - `encodable`/`decodable` are subsets of `fields` minus `_`-prefixed names.
//! - Attributes starting with `_` are never encoded.

pub mod coerce;
mod registry;


use crate::{
    error::InternalError,
    model::FieldKind,
    object::{ClassInfo, Object, ObjectError},
    value::Attributes,
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

// re-exports
pub use registry::{AliasFactory, AliasPredicate, AliasRegistry, ObjectFactory};

/// Prefix reserved for internal attributes.
pub const INTERNAL_PREFIX: char = '_';

///
/// AliasError
///

#[derive(Debug, ThisError)]
pub enum AliasError {
    #[error("class '{0}' is not an entity")]
    NotAnEntity(&'static str),

    #[error("wire name '{wire_name}' already registered for '{existing}'")]
    AlreadyRegistered {
        wire_name: String,
        existing: &'static str,
    },

    #[error("field '{field}' expects {expected}, got {found}")]
    InvalidFieldValue {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Object(#[from] ObjectError),
}

impl From<AliasError> for InternalError {
    fn from(err: AliasError) -> Self {
        match err {
            AliasError::Object(err) => err.into(),
            AliasError::NotAnEntity(_) => Self::alias_unsupported(err.to_string()),
            _ => Self::alias_invariant(err.to_string()),
        }
    }
}

///
/// FieldDescriptor
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub column: String,
    pub kind: FieldKind,
}

///
/// RelationDescriptor
/// Single-valued relation and the raw key column backing it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelationDescriptor {
    pub column: String,
    pub target: &'static str,
}

///
/// EntityAlias
///
/// Compiled descriptor for one class. Plain classes compile from their
/// declared `ClassInfo`; entity classes are compiled by the ORM alias from
/// schema metadata.
///

#[derive(Clone, Debug)]
pub struct EntityAlias {
    pub(crate) path: &'static str,
    /// Ordered field list; the primary key is tracked separately.
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) relations: BTreeMap<String, RelationDescriptor>,
    pub(crate) encodable: BTreeSet<String>,
    pub(crate) decodable: BTreeSet<String>,
    pub(crate) excluded: BTreeSet<String>,
    pub(crate) readonly: BTreeSet<String>,
    pub(crate) declared: Option<BTreeSet<String>>,
    pub(crate) primary_key: Option<String>,
}

impl EntityAlias {
    /// Compile the alias for a plain class from its declaration.
    #[must_use]
    pub fn compile(class: &'static ClassInfo) -> Self {
        let declared = class
            .attrs
            .map(|attrs| attrs.iter().map(ToString::to_string).collect::<BTreeSet<_>>());
        let excluded = to_set(class.exclude);
        let readonly = to_set(class.readonly);

        let fields = class
            .attrs
            .unwrap_or_default()
            .iter()
            .map(|name| FieldDescriptor {
                name: (*name).to_string(),
                column: (*name).to_string(),
                kind: FieldKind::Scalar,
            })
            .collect::<Vec<_>>();

        let encodable = fields
            .iter()
            .map(|field| field.name.clone())
            .filter(|name| !is_internal(name) && !excluded.contains(name))
            .collect::<BTreeSet<_>>();
        let decodable = encodable
            .iter()
            .filter(|name| !readonly.contains(*name))
            .cloned()
            .collect();

        Self {
            path: class.path,
            fields,
            relations: BTreeMap::new(),
            encodable,
            decodable,
            excluded,
            readonly,
            declared,
            primary_key: None,
        }
    }

    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub const fn relations(&self) -> &BTreeMap<String, RelationDescriptor> {
        &self.relations
    }

    #[must_use]
    pub const fn encodable(&self) -> &BTreeSet<String> {
        &self.encodable
    }

    #[must_use]
    pub const fn decodable(&self) -> &BTreeSet<String> {
        &self.decodable
    }

    #[must_use]
    pub const fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    #[must_use]
    pub const fn readonly(&self) -> &BTreeSet<String> {
        &self.readonly
    }

    /// Column holding the primary key, for entity aliases.
    #[must_use]
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Generic attribute snapshot: declared attributes only (when declared),
    /// minus excluded and internal names.
    pub(crate) fn snapshot(&self, object: &dyn Object) -> Attributes {
        let mut attrs = match &self.declared {
            Some(declared) => declared
                .iter()
                .filter_map(|name| object.get_attribute(name).map(|v| (name.clone(), v)))
                .collect(),
            None => object.attributes(),
        };
        attrs.retain(|name, _| !self.excluded.contains(name));

        attrs
    }

    /// Generic decode filter: drop read-only, excluded and internal names,
    /// and anything undeclared when the class declares its attributes.
    pub(crate) fn accept(&self, mut attrs: Attributes) -> Attributes {
        attrs.retain(|name, _| {
            !is_internal(name)
                && !self.readonly.contains(name)
                && !self.excluded.contains(name)
                && self
                    .declared
                    .as_ref()
                    .is_none_or(|declared| declared.contains(name))
        });

        attrs
    }
}

///
/// ClassAlias
///
/// Encode/decode behaviour attached to a compiled alias.
///

pub trait ClassAlias: Send + Sync {
    fn descriptor(&self) -> &EntityAlias;

    /// Attributes to encode; `None` means there is nothing to encode.
    fn encodable_attributes(&self, object: &dyn Object) -> Result<Option<Attributes>, AliasError>;

    /// Coerce decoded attributes and return what is left to apply.
    /// Implementations may apply some attributes eagerly.
    fn decodable_attributes(
        &self,
        object: &dyn Object,
        attrs: Attributes,
    ) -> Result<Attributes, AliasError>;

    fn apply_attributes(&self, object: &dyn Object, attrs: Attributes) -> Result<(), AliasError> {
        for (name, value) in self.decodable_attributes(object, attrs)? {
            object.set_attribute(&name, value)?;
        }

        Ok(())
    }
}

impl ClassAlias for EntityAlias {
    fn descriptor(&self) -> &EntityAlias {
        self
    }

    fn encodable_attributes(&self, object: &dyn Object) -> Result<Option<Attributes>, AliasError> {
        let mut attrs = self.snapshot(object);
        strip_internal(&mut attrs);

        Ok(non_empty(attrs))
    }

    fn decodable_attributes(
        &self,
        _object: &dyn Object,
        attrs: Attributes,
    ) -> Result<Attributes, AliasError> {
        Ok(self.accept(attrs))
    }
}

#[must_use]
pub fn is_internal(name: &str) -> bool {
    name.starts_with(INTERNAL_PREFIX)
}

pub(crate) fn strip_internal(attrs: &mut Attributes) {
    attrs.retain(|name, _| !is_internal(name));
}

pub(crate) fn non_empty(attrs: Attributes) -> Option<Attributes> {
    (!attrs.is_empty()).then_some(attrs)
}

fn to_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(ToString::to_string).collect()
}
