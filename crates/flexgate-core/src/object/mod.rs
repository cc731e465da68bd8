mod instance;
mod record;


use crate::{
    error::InternalError,
    model::EntitySchema,
    value::{Attributes, ObjectRef, Value},
};
use thiserror::Error as ThisError;

// re-exports
pub use instance::ModelInstance;
pub use record::{ANONYMOUS, Record};

///
/// ObjectError
///

#[derive(Debug, ThisError)]
pub enum ObjectError {
    #[error("class '{0}' has no entity schema")]
    NotAnEntity(&'static str),

    #[error("attribute '{name}' on '{class}' expects {expected}, got {found}")]
    InvalidAttribute {
        class: &'static str,
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("attribute '{name}' on '{class}' is read-only")]
    ReadOnly { class: &'static str, name: String },
}

impl From<ObjectError> for InternalError {
    fn from(err: ObjectError) -> Self {
        Self::object_invariant(err.to_string())
    }
}

///
/// ClassInfo
///
/// Static declaration for one object class. Aliases are compiled from it
/// once and cached under `path`.
///

#[derive(Debug)]
pub struct ClassInfo {
    /// Fully-qualified type path; unique per class.
    pub path: &'static str,
    /// Schema for entity classes backed by an object-relational store.
    pub schema: Option<&'static dyn EntitySchema>,
    /// Declared attribute list; `None` means attributes are dynamic.
    pub attrs: Option<&'static [&'static str]>,
    /// Attributes never encoded or decoded.
    pub exclude: &'static [&'static str],
    /// Attributes encoded but never accepted on decode.
    pub readonly: &'static [&'static str],
}

impl ClassInfo {
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            schema: None,
            attrs: None,
            exclude: &[],
            readonly: &[],
        }
    }

    #[must_use]
    pub const fn with_schema(mut self, schema: &'static dyn EntitySchema) -> Self {
        self.schema = Some(schema);
        self
    }

    #[must_use]
    pub const fn with_attrs(mut self, attrs: &'static [&'static str]) -> Self {
        self.attrs = Some(attrs);
        self
    }

    #[must_use]
    pub const fn with_exclude(mut self, exclude: &'static [&'static str]) -> Self {
        self.exclude = exclude;
        self
    }

    #[must_use]
    pub const fn with_readonly(mut self, readonly: &'static [&'static str]) -> Self {
        self.readonly = readonly;
        self
    }

    #[must_use]
    pub const fn is_entity(&self) -> bool {
        self.schema.is_some()
    }
}

///
/// Object
///
/// Anything the codec can carry by reference. Attribute writes go through
/// `&self` because decoded objects are shared before they are populated.
///

pub trait Object: Send + Sync {
    fn class(&self) -> &'static ClassInfo;

    /// Wire class name carried by the instance itself (anonymous records).
    fn class_name(&self) -> Option<&str> {
        None
    }

    /// Snapshot of every attribute currently set.
    fn attributes(&self) -> Attributes;

    fn get_attribute(&self, name: &str) -> Option<Value> {
        self.attributes().remove(name)
    }

    fn set_attribute(&self, name: &str, value: Value) -> Result<(), ObjectError>;

    fn as_entity(&self) -> Option<&dyn Entity> {
        None
    }
}

///
/// Entity
///
/// Object backed by an object-relational store.
///

pub trait Entity: Object {
    fn schema(&self) -> &'static dyn EntitySchema;

    /// Assigned primary key; `None` for transient (unsaved) instances.
    fn primary_key(&self) -> Option<Value> {
        let column = self.schema().primary_key().column;

        self.get_attribute(column).filter(|value| !value.is_absent())
    }

    /// Single-valued relation, only if it is already loaded.
    fn cached_relation(&self, name: &str) -> Option<ObjectRef>;

    /// Materialize a many-valued relation.
    fn related_many(&self, name: &str) -> Result<Vec<ObjectRef>, ObjectError>;
}
