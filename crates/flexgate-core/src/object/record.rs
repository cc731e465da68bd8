use crate::{
    object::{ClassInfo, Object, ObjectError},
    value::{Attributes, ObjectRef, Value},
};
use parking_lot::RwLock;

/// Class used for records decoded from an unregistered wire name.
pub static ANONYMOUS: ClassInfo = ClassInfo::new("flexgate::object::Anonymous");

///
/// Record
/// Plain attribute bag; the default object shape for non-entity classes.
///

pub struct Record {
    class: &'static ClassInfo,
    name: Option<String>,
    attrs: RwLock<Attributes>,
}

impl Record {
    #[must_use]
    pub fn new(class: &'static ClassInfo) -> Self {
        Self {
            class,
            name: None,
            attrs: RwLock::new(Attributes::new()),
        }
    }

    /// Record that keeps the wire class name it was decoded from.
    #[must_use]
    pub fn anonymous(name: Option<String>) -> Self {
        Self {
            class: &ANONYMOUS,
            name,
            attrs: RwLock::new(Attributes::new()),
        }
    }

    /// Builder-style attribute assignment.
    #[must_use]
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.write().insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }
}

impl Object for Record {
    fn class(&self) -> &'static ClassInfo {
        self.class
    }

    fn class_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn attributes(&self) -> Attributes {
        self.attrs.read().clone()
    }

    fn get_attribute(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: Value) -> Result<(), ObjectError> {
        self.attrs.write().insert(name.to_string(), value);

        Ok(())
    }
}
