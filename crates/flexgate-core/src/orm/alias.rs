use crate::{
    alias::{
        AliasError, ClassAlias, EntityAlias, FieldDescriptor, RelationDescriptor,
        coerce::{coerce_in, coerce_out},
        is_internal, non_empty, strip_internal,
    },
    model::{EntitySchema, FieldKind},
    object::{ClassInfo, Entity, Object},
    value::{Attributes, Value},
};
use std::collections::{BTreeMap, BTreeSet};

///
/// OrmEntityAlias
///
/// Alias for entity classes, compiled from schema metadata rather than
/// static declarations.
///

#[derive(Clone, Debug)]
pub struct OrmEntityAlias {
    alias: EntityAlias,
}

impl OrmEntityAlias {
    pub fn compile(class: &'static ClassInfo) -> Result<Self, AliasError> {
        let schema = class.schema.ok_or(AliasError::NotAnEntity(class.path))?;

        Ok(Self {
            alias: compile_schema(class, schema),
        })
    }
}

// Classify every schema field into plain fields or single-valued relations.
fn compile_schema(class: &'static ClassInfo, schema: &'static dyn EntitySchema) -> EntityAlias {
    let mut fields = Vec::new();
    let mut relations = BTreeMap::new();
    let mut readonly = class
        .readonly
        .iter()
        .map(ToString::to_string)
        .collect::<BTreeSet<_>>();
    let mut excluded = class
        .exclude
        .iter()
        .map(ToString::to_string)
        .collect::<BTreeSet<_>>();

    for name in schema.field_names() {
        let Some(field) = schema.field(name) else {
            continue;
        };

        if field.is_file() {
            readonly.insert(name.to_string());
        }

        // the forward side already carries this relation
        if field.kind.is_reverse() {
            continue;
        }

        if let FieldKind::ForeignKey { target } = field.kind {
            relations.insert(
                name.to_string(),
                RelationDescriptor {
                    column: field.column.to_string(),
                    target,
                },
            );
        } else {
            fields.push(FieldDescriptor {
                name: name.to_string(),
                column: field.column.to_string(),
                kind: field.kind,
            });
        }
    }

    // a parent-linked identity is represented once, through inheritance
    for link in schema.parent_links() {
        excluded.insert(link.column.to_string());
        relations.remove(link.field);
    }

    let encodable = fields
        .iter()
        .map(|field| field.name.clone())
        .filter(|name| !is_internal(name))
        .collect::<BTreeSet<_>>();
    let decodable = encodable
        .iter()
        .filter(|name| !readonly.contains(*name))
        .cloned()
        .collect();

    EntityAlias {
        path: class.path,
        fields,
        relations,
        encodable,
        decodable,
        excluded,
        readonly,
        declared: None,
        primary_key: Some(schema.primary_key().column.to_string()),
    }
}

impl ClassAlias for OrmEntityAlias {
    fn descriptor(&self) -> &EntityAlias {
        &self.alias
    }

    fn encodable_attributes(&self, object: &dyn Object) -> Result<Option<Attributes>, AliasError> {
        let alias = &self.alias;
        let entity = object
            .as_entity()
            .ok_or(AliasError::NotAnEntity(alias.path))?;
        let mut attrs = alias.snapshot(object);

        for field in &alias.fields {
            if field.kind.is_many() {
                let related = entity.related_many(&field.name)?;
                attrs.insert(
                    field.name.clone(),
                    Value::List(related.into_iter().map(Value::Object).collect()),
                );
            } else if let Some(raw) = attrs.remove(&field.name) {
                attrs.insert(field.name.clone(), coerce_out(field.kind, raw));
            }
        }

        strip_internal(&mut attrs);

        for (name, relation) in &alias.relations {
            if let Some(related) = entity.cached_relation(name) {
                attrs.insert(name.clone(), Value::Object(related));
            }
            attrs.remove(&relation.column);
        }

        Ok(non_empty(attrs))
    }

    fn decodable_attributes(
        &self,
        object: &dyn Object,
        attrs: Attributes,
    ) -> Result<Attributes, AliasError> {
        let alias = &self.alias;
        let mut attrs = alias.accept(attrs);

        for name in &alias.decodable {
            let Some(field) = alias.field(name) else {
                continue;
            };
            let Some(raw) = attrs.remove(name) else {
                continue;
            };

            attrs.insert(field.column.clone(), coerce_in(name, field.kind, raw)?);
        }

        // The key must land before anything else: relation assignments
        // resolve against the instance's own identity.
        if let Some(pk) = &alias.primary_key
            && let Some(key) = attrs.remove(pk)
        {
            object.set_attribute(pk, key)?;
        }

        Ok(attrs)
    }
}

/// Primary key of `object` when it is a saved entity.
pub(crate) fn assigned_key(object: &dyn Object) -> Option<Value> {
    object.as_entity().and_then(Entity::primary_key)
}
