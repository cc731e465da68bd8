use crate::{
    model::{EntitySchema, FieldKind},
    object::{ClassInfo, Entity, Object, ObjectError},
    value::{Attributes, ObjectRef, Value},
};
use parking_lot::RwLock;
use std::collections::BTreeMap;

///
/// ModelInstance
///
/// In-memory row of an entity class. Raw values are keyed by column, so a
/// foreign key lives under `author_id` while the loaded related object sits
/// in the relation cache under `author`.
///

pub struct ModelInstance {
    class: &'static ClassInfo,
    schema: &'static dyn EntitySchema,
    state: RwLock<InstanceState>,
}

#[derive(Default)]
struct InstanceState {
    values: Attributes,
    relations: BTreeMap<String, ObjectRef>,
    many: BTreeMap<String, Vec<ObjectRef>>,
}

impl ModelInstance {
    pub fn new(class: &'static ClassInfo) -> Result<Self, ObjectError> {
        let schema = class.schema.ok_or(ObjectError::NotAnEntity(class.path))?;

        Ok(Self {
            class,
            schema,
            state: RwLock::new(InstanceState::default()),
        })
    }

    /// Set a raw column value.
    #[must_use]
    pub fn with(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.write().values.insert(column.into(), value.into());
        self
    }

    /// Load a single-valued relation, keeping its key column in step.
    #[must_use]
    pub fn with_relation(self, name: &str, related: ObjectRef) -> Self {
        self.load_relation(name, related);
        self
    }

    #[must_use]
    pub fn with_many(self, name: impl Into<String>, related: Vec<ObjectRef>) -> Self {
        self.state.write().many.insert(name.into(), related);
        self
    }

    #[must_use]
    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }

    fn load_relation(&self, name: &str, related: ObjectRef) {
        let key = related
            .as_entity()
            .and_then(Entity::primary_key)
            .unwrap_or(Value::Null);
        let column = self.schema.field(name).map_or(name, |field| field.column);

        let mut state = self.state.write();
        state.values.insert(column.to_string(), key);
        state.relations.insert(name.to_string(), related);
    }

    fn invalid(&self, name: &str, expected: &'static str, found: &Value) -> ObjectError {
        ObjectError::InvalidAttribute {
            class: self.class.path,
            name: name.to_string(),
            expected,
            found: found.kind_name(),
        }
    }
}

impl Object for ModelInstance {
    fn class(&self) -> &'static ClassInfo {
        self.class
    }

    fn attributes(&self) -> Attributes {
        self.state.read().values.clone()
    }

    fn get_attribute(&self, name: &str) -> Option<Value> {
        let state = self.state.read();

        match self.schema.field(name).map(|field| field.kind) {
            Some(FieldKind::ForeignKey { .. }) => Some(
                state
                    .relations
                    .get(name)
                    .cloned()
                    .map_or(Value::Null, Value::Object),
            ),
            Some(FieldKind::ManyToMany { .. }) => Some(Value::List(
                state
                    .many
                    .get(name)
                    .map(|items| items.iter().cloned().map(Value::Object).collect())
                    .unwrap_or_default(),
            )),
            _ => state.values.get(name).cloned(),
        }
    }

    fn set_attribute(&self, name: &str, value: Value) -> Result<(), ObjectError> {
        let Some(field) = self.schema.field(name) else {
            // Raw column write; a loaded relation keyed by this column is
            // dropped once it no longer matches.
            let relation = self.schema.field_names().into_iter().find(|field_name| {
                self.schema.field(field_name).is_some_and(|field| {
                    field.kind.is_foreign_key() && field.column == name && field.name != name
                })
            });
            let stale = relation.filter(|relation| {
                let current = self
                    .cached_relation(relation)
                    .and_then(|obj| obj.as_entity().and_then(Entity::primary_key));
                current.as_ref() != Some(&value)
            });

            let mut state = self.state.write();
            if let Some(relation) = stale {
                state.relations.remove(relation);
            }
            state.values.insert(name.to_string(), value);

            return Ok(());
        };

        match (field.kind, value) {
            (FieldKind::ForeignKey { .. }, Value::Object(related)) => {
                self.load_relation(name, related);
            }
            (FieldKind::ForeignKey { .. }, value) if value.is_absent() => {
                let mut state = self.state.write();
                state.relations.remove(name);
                state.values.insert(field.column.to_string(), Value::Null);
            }
            (FieldKind::ManyToMany { .. }, Value::List(items)) => {
                let related = items
                    .iter()
                    .map(|item| {
                        item.as_object()
                            .cloned()
                            .ok_or_else(|| self.invalid(name, "object", item))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.state.write().many.insert(name.to_string(), related);
            }
            (FieldKind::ManyToMany { .. }, value) if value.is_absent() => {
                self.state.write().many.remove(name);
            }
            (FieldKind::ForeignKey { .. }, other) => {
                return Err(self.invalid(name, "object", &other));
            }
            (FieldKind::ManyToMany { .. }, other) => {
                return Err(self.invalid(name, "list", &other));
            }
            (_, value) => {
                self.state.write().values.insert(field.column.to_string(), value);
            }
        }

        Ok(())
    }

    fn as_entity(&self) -> Option<&dyn Entity> {
        Some(self)
    }
}

impl Entity for ModelInstance {
    fn schema(&self) -> &'static dyn EntitySchema {
        self.schema
    }

    fn cached_relation(&self, name: &str) -> Option<ObjectRef> {
        self.state.read().relations.get(name).cloned()
    }

    fn related_many(&self, name: &str) -> Result<Vec<ObjectRef>, ObjectError> {
        Ok(self.state.read().many.get(name).cloned().unwrap_or_default())
    }
}
