use crate::{
    codec::Codec,
    model::{EntityModel, FieldKind, FieldModel, ParentLink},
    object::{ClassInfo, ModelInstance},
    orm,
    value::ObjectRef,
};

pub(crate) static AUTHOR_MODEL: EntityModel = EntityModel {
    path: "library::Author",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::AutoKey),
        FieldModel::new("name", FieldKind::Scalar),
        FieldModel::new("born", FieldKind::Date),
        FieldModel::new("avatar", FieldKind::File),
        FieldModel::new("_secret", FieldKind::Scalar),
        FieldModel::new("books", FieldKind::Reverse { target: "library::Book" }),
    ],
    parents: &[],
};

pub(crate) static AUTHOR: ClassInfo = ClassInfo::new("library::Author").with_schema(&AUTHOR_MODEL);

pub(crate) static TAG_MODEL: EntityModel = EntityModel {
    path: "library::Tag",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::AutoKey),
        FieldModel::new("label", FieldKind::Scalar),
    ],
    parents: &[],
};

pub(crate) static TAG: ClassInfo = ClassInfo::new("library::Tag").with_schema(&TAG_MODEL);

pub(crate) static BOOK_MODEL: EntityModel = EntityModel {
    path: "library::Book",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::AutoKey),
        FieldModel::new("title", FieldKind::Scalar),
        FieldModel::new("published", FieldKind::DateTime),
        FieldModel::new("opens", FieldKind::Time),
        FieldModel::foreign_key("author", "author_id", "library::Author"),
        FieldModel::many_to_many("tags", "library::Tag"),
    ],
    parents: &[],
};

pub(crate) static BOOK: ClassInfo = ClassInfo::new("library::Book").with_schema(&BOOK_MODEL);

pub(crate) static PLACE_MODEL: EntityModel = EntityModel {
    path: "places::Place",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::AutoKey),
        FieldModel::new("address", FieldKind::Scalar),
    ],
    parents: &[],
};

pub(crate) static PLACE: ClassInfo = ClassInfo::new("places::Place").with_schema(&PLACE_MODEL);

pub(crate) static RESTAURANT_MODEL: EntityModel = EntityModel {
    path: "places::Restaurant",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::AutoKey),
        FieldModel::foreign_key("place_ptr", "place_ptr_id", "places::Place"),
        FieldModel::new("address", FieldKind::Scalar),
        FieldModel::new("serves_pizza", FieldKind::Scalar),
    ],
    parents: &[ParentLink {
        field: "place_ptr",
        column: "place_ptr_id",
        parent: "places::Place",
    }],
};

pub(crate) static RESTAURANT: ClassInfo =
    ClassInfo::new("places::Restaurant").with_schema(&RESTAURANT_MODEL);

/// Codec with every library entity registered and the ORM installed.
pub(crate) fn library_codec() -> Codec {
    let mut codec = Codec::new();
    orm::install(&mut codec.aliases, &mut codec.encoder);

    for (class, wire_name) in [
        (&AUTHOR, "library.Author"),
        (&BOOK, "library.Book"),
        (&TAG, "library.Tag"),
        (&RESTAURANT, "places.Restaurant"),
    ] {
        codec
            .aliases
            .register_class(class, wire_name, move || {
                ModelInstance::new(class).map(ModelInstance::into_ref)
            })
            .unwrap();
    }

    codec
}

pub(crate) fn author(id: i64, name: &str) -> ObjectRef {
    ModelInstance::new(&AUTHOR)
        .unwrap()
        .with("id", id)
        .with("name", name)
        .into_ref()
}

pub(crate) fn book(id: i64, title: &str, author: ObjectRef) -> ObjectRef {
    ModelInstance::new(&BOOK)
        .unwrap()
        .with("id", id)
        .with("title", title)
        .with_relation("author", author)
        .into_ref()
}
