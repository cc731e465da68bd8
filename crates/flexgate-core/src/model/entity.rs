use crate::model::field::FieldModel;
use std::fmt::Debug;

///
/// EntitySchema
///
/// Schema capability an object-relational adapter exposes to the alias layer.
///

pub trait EntitySchema: Debug + Send + Sync {
    /// Stable entity path, used as the identity-table type key.
    fn path(&self) -> &'static str;

    /// Every field name, in declaration order.
    fn field_names(&self) -> Vec<&'static str>;

    fn field(&self, name: &str) -> Option<&FieldModel>;

    /// Links to parent entities this one inherits from.
    fn parent_links(&self) -> &[ParentLink];

    /// Primary key field; every entity has exactly one.
    fn primary_key(&self) -> &FieldModel;
}

///
/// ParentLink
/// Relation that ties a child entity row to its parent row.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParentLink {
    /// Relation attribute name (`place_ptr`).
    pub field: &'static str,
    /// Backing key attribute (`place_ptr_id`).
    pub column: &'static str,
    pub parent: &'static str,
}

///
/// EntityModel
/// Static, declaration-time model for one entity.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Fully-qualified type path (for dispatch and diagnostics).
    pub path: &'static str,
    /// Primary key field name (points at an entry in `fields`).
    pub primary_key: &'static str,
    /// Ordered field list.
    pub fields: &'static [FieldModel],
    pub parents: &'static [ParentLink],
}

impl EntityModel {
    const NO_PRIMARY_KEY: FieldModel = FieldModel::new("id", crate::model::FieldKind::AutoKey);
}

impl EntitySchema for EntityModel {
    fn path(&self) -> &'static str {
        self.path
    }

    fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }

    fn field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    fn parent_links(&self) -> &[ParentLink] {
        self.parents
    }

    // A model whose declared key is missing from `fields` falls back to an
    // implicit auto key named `id`.
    fn primary_key(&self) -> &FieldModel {
        self.field(self.primary_key).unwrap_or(&Self::NO_PRIMARY_KEY)
    }
}
