use super::*;
use crate::{
    codec::Codec,
    model::{EntityModel, EntitySchema, FieldKind, FieldModel},
    object::{ClassInfo, Entity, ModelInstance, Object, ObjectError},
    test_fixtures::{
        AUTHOR, BOOK, RESTAURANT, TAG, author, book, library_codec,
    },
    value::{Attributes, FileHandle, ObjectRef, Value, WireValue},
};
use parking_lot::Mutex;
use time::macros::{date, datetime};

fn compiled(class: &'static ClassInfo) -> OrmEntityAlias {
    OrmEntityAlias::compile(class).unwrap()
}

fn field_names(alias: &OrmEntityAlias) -> Vec<&str> {
    alias
        .descriptor()
        .fields()
        .iter()
        .map(|field| field.name.as_str())
        .collect()
}

fn wire_attrs(wire: &WireValue) -> &[(String, WireValue)] {
    match wire {
        WireValue::Object {
            attrs: Some(attrs), ..
        } => attrs,
        other => panic!("expected object with attributes, got {other:?}"),
    }
}

fn wire_attr<'a>(wire: &'a WireValue, name: &str) -> Option<&'a WireValue> {
    wire_attrs(wire)
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

//
// compilation
//

#[test]
fn compile_classifies_schema_fields() {
    let alias = compiled(&AUTHOR);
    let descriptor = alias.descriptor();

    assert_eq!(field_names(&alias), ["id", "name", "born", "avatar", "_secret"]);
    assert!(descriptor.readonly().contains("avatar"));
    assert!(descriptor.encodable().contains("avatar"));
    assert!(!descriptor.decodable().contains("avatar"));
    assert!(descriptor.decodable().contains("name"));
    assert!(!descriptor.encodable().contains("_secret"));
    assert!(descriptor.encodable().contains("id"));
    assert_eq!(descriptor.primary_key(), Some("id"));
    assert!(descriptor.relations().is_empty());
}

#[test]
fn compile_separates_foreign_keys() {
    let alias = compiled(&BOOK);
    let relations = alias.descriptor().relations();

    assert_eq!(relations["author"].column, "author_id");
    assert_eq!(relations["author"].target, "library::Author");
    assert!(!field_names(&alias).contains(&"author"));
    assert!(field_names(&alias).contains(&"tags"));
}

#[test]
fn compile_excludes_parent_link() {
    let alias = compiled(&RESTAURANT);
    let descriptor = alias.descriptor();

    assert!(descriptor.excluded().contains("place_ptr_id"));
    assert!(!descriptor.relations().contains_key("place_ptr"));
    assert!(descriptor.encodable().contains("serves_pizza"));
}

#[test]
fn compile_rejects_plain_class() {
    static PLAIN: ClassInfo = ClassInfo::new("plain::Thing");

    assert!(OrmEntityAlias::compile(&PLAIN).is_err());
}

//
// encoding
//

#[test]
fn encode_replaces_key_column_with_loaded_relation() {
    let tolkien = author(7, "Tolkien");
    let hobbit = book(1, "The Hobbit", tolkien.clone());

    let attrs = compiled(&BOOK).encodable_attributes(&*hobbit).unwrap().unwrap();

    assert_eq!(attrs.get("author"), Some(&Value::Object(tolkien)));
    assert!(!attrs.contains_key("author_id"));
    assert_eq!(attrs.get("tags"), Some(&Value::List(Vec::new())));
}

#[test]
fn encode_drops_unloaded_relation_key() {
    let hobbit = ModelInstance::new(&BOOK)
        .unwrap()
        .with("id", 1)
        .with("author_id", 7);

    let attrs = compiled(&BOOK).encodable_attributes(&hobbit).unwrap().unwrap();

    assert!(!attrs.contains_key("author_id"));
    assert!(!attrs.contains_key("author"));
}

#[test]
fn encode_coerces_field_kinds() {
    let author = ModelInstance::new(&AUTHOR)
        .unwrap()
        .with("id", 7)
        .with("born", date!(1892 - 01 - 03))
        .with("avatar", FileHandle::new("avatars/jrrt.png"))
        .with("name", Value::NotProvided)
        .with("_secret", "ring");

    let attrs = compiled(&AUTHOR).encodable_attributes(&author).unwrap().unwrap();

    assert_eq!(attrs["born"], Value::DateTime(datetime!(1892-01-03 0:00)));
    assert_eq!(attrs["avatar"], Value::from("avatars/jrrt.png"));
    assert_eq!(attrs["name"], Value::Undefined);
    assert!(!attrs.contains_key("_secret"));
}

#[test]
fn encode_of_empty_entity_is_sentinel() {
    let tag = ModelInstance::new(&TAG).unwrap();

    assert!(compiled(&TAG).encodable_attributes(&tag).unwrap().is_none());
}

#[test]
fn many_to_many_is_materialized() {
    let fantasy = ModelInstance::new(&TAG).unwrap().with("id", 1).into_ref();
    let classic = ModelInstance::new(&TAG).unwrap().with("id", 2).into_ref();
    let hobbit = ModelInstance::new(&BOOK)
        .unwrap()
        .with("id", 1)
        .with_many("tags", vec![fantasy.clone(), classic.clone()]);

    let attrs = compiled(&BOOK).encodable_attributes(&hobbit).unwrap().unwrap();

    assert_eq!(
        attrs["tags"],
        Value::List(vec![Value::Object(fantasy), Value::Object(classic)])
    );
}

//
// decoding
//

static LEDGER_MODEL: EntityModel = EntityModel {
    path: "audit::Ledger",
    primary_key: "id",
    fields: &[
        FieldModel::new("aaa", FieldKind::Scalar),
        FieldModel::new("id", FieldKind::AutoKey),
        FieldModel::new("balance", FieldKind::Scalar),
    ],
    parents: &[],
};

static LEDGER: ClassInfo = ClassInfo::new("audit::Ledger").with_schema(&LEDGER_MODEL);

/// Entity that records the order attributes are assigned in.
#[derive(Default)]
struct Recorder {
    log: Mutex<Vec<String>>,
}

impl Object for Recorder {
    fn class(&self) -> &'static ClassInfo {
        &LEDGER
    }

    fn attributes(&self) -> Attributes {
        Attributes::new()
    }

    fn set_attribute(&self, name: &str, _value: Value) -> Result<(), ObjectError> {
        self.log.lock().push(name.to_string());

        Ok(())
    }

    fn as_entity(&self) -> Option<&dyn Entity> {
        Some(self)
    }
}

impl Entity for Recorder {
    fn schema(&self) -> &'static dyn EntitySchema {
        &LEDGER_MODEL
    }

    fn cached_relation(&self, _name: &str) -> Option<ObjectRef> {
        None
    }

    fn related_many(&self, _name: &str) -> Result<Vec<ObjectRef>, ObjectError> {
        Ok(Vec::new())
    }
}

#[test]
fn decode_assigns_primary_key_first() {
    let recorder = Recorder::default();
    let mut attrs = Attributes::new();
    attrs.insert("aaa".into(), Value::Int(1));
    attrs.insert("balance".into(), Value::Int(2));
    attrs.insert("id".into(), Value::Int(3));

    compiled(&LEDGER).apply_attributes(&recorder, attrs).unwrap();

    assert_eq!(*recorder.log.lock(), ["id", "aaa", "balance"]);
}

#[test]
fn decode_narrows_dates_and_skips_readonly() {
    let target = ModelInstance::new(&AUTHOR).unwrap();
    let mut attrs = Attributes::new();
    attrs.insert("id".into(), Value::Int(7));
    attrs.insert("born".into(), Value::DateTime(datetime!(2009-03-01 0:00)));
    attrs.insert("avatar".into(), Value::from("forged.png"));
    attrs.insert("name".into(), Value::Undefined);

    compiled(&AUTHOR).apply_attributes(&target, attrs).unwrap();

    assert_eq!(target.get_attribute("born"), Some(Value::Date(date!(2009 - 03 - 01))));
    assert_eq!(target.get_attribute("avatar"), None);
    assert_eq!(target.get_attribute("name"), Some(Value::NotProvided));
    assert_eq!(target.primary_key(), Some(Value::Int(7)));
}

#[test]
fn decode_zero_key_is_transient() {
    let target = ModelInstance::new(&TAG).unwrap();
    let mut attrs = Attributes::new();
    attrs.insert("id".into(), Value::Int(0));
    attrs.insert("label".into(), Value::from("new"));

    compiled(&TAG).apply_attributes(&target, attrs).unwrap();

    assert!(target.primary_key().is_none());
    assert_eq!(target.get_attribute("label"), Some(Value::from("new")));
}

//
// identity collapse through the codec
//

#[test]
fn duplicate_rows_collapse_to_one_object() {
    let codec = library_codec();
    let first = author(7, "Tolkien");
    let second = author(7, "J. R. R. Tolkien");

    let wire = codec
        .encode(&Value::List(vec![
            Value::Object(first),
            Value::Object(second),
        ]))
        .unwrap();

    let WireValue::Array(items) = &wire else {
        panic!("expected array, got {wire:?}");
    };
    assert_eq!(items[1], WireValue::Reference(0));
    assert_eq!(wire_attr(&items[0], "name"), Some(&WireValue::Text("Tolkien".into())));

    let Value::List(decoded) = codec.decode(&wire).unwrap() else {
        panic!("expected list");
    };
    let (a, b) = (decoded[0].as_object().unwrap(), decoded[1].as_object().unwrap());
    assert!(a.ptr_eq(b));
}

#[test]
fn related_duplicates_collapse_across_the_graph() {
    let codec = library_codec();
    let hobbit = book(1, "The Hobbit", author(7, "Tolkien"));
    let silmarillion = book(2, "The Silmarillion", author(7, "Tolkien"));

    let wire = codec
        .encode(&Value::from(vec![hobbit, silmarillion]))
        .unwrap();
    let WireValue::Array(items) = &wire else {
        panic!("expected array");
    };
    assert_eq!(wire_attr(&items[1], "author"), Some(&WireValue::Reference(1)));

    let Value::List(decoded) = codec.decode(&wire).unwrap() else {
        panic!("expected list");
    };
    let authors = decoded
        .iter()
        .map(|book| book.as_object().unwrap().get_attribute("author").unwrap())
        .collect::<Vec<_>>();
    assert_eq!(authors[0], authors[1]);
    assert_eq!(
        decoded[1].as_object().unwrap().get_attribute("author_id"),
        Some(Value::Int(7))
    );
}

#[test]
fn transient_instances_are_not_collapsed() {
    let codec = library_codec();
    let draft = || ModelInstance::new(&AUTHOR).unwrap().with("name", "Anon").into_ref();

    let wire = codec.encode(&Value::from(vec![draft(), draft()])).unwrap();
    let WireValue::Array(items) = &wire else {
        panic!("expected array");
    };

    assert!(items.iter().all(|item| !item.is_reference()));
}

#[test]
fn sessions_do_not_share_identity() {
    let codec = library_codec();
    let value = Value::Object(author(7, "Tolkien"));

    let first = codec.encode(&value).unwrap();
    let second = codec.encode(&Value::Object(author(7, "Tolkien"))).unwrap();

    assert!(!first.is_reference());
    assert!(!second.is_reference());
}

static PERSON_MODEL: EntityModel = EntityModel {
    path: "people::Person",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::AutoKey),
        FieldModel::foreign_key("friend", "friend_id", "people::Person"),
    ],
    parents: &[],
};

static PERSON: ClassInfo = ClassInfo::new("people::Person").with_schema(&PERSON_MODEL);

#[test]
fn cyclic_graphs_terminate() {
    let mut codec = library_codec();
    codec
        .aliases
        .register_class(&PERSON, "people.Person", || {
            ModelInstance::new(&PERSON).map(ModelInstance::into_ref)
        })
        .unwrap();

    let alice = ModelInstance::new(&PERSON).unwrap().with("id", 1).into_ref();
    let bob = ModelInstance::new(&PERSON)
        .unwrap()
        .with("id", 2)
        .with_relation("friend", alice.clone())
        .into_ref();
    alice.set_attribute("friend", Value::Object(bob)).unwrap();

    let wire = codec.encode(&Value::Object(alice)).unwrap();
    let bob_wire = wire_attr(&wire, "friend").unwrap();
    assert_eq!(wire_attr(bob_wire, "friend"), Some(&WireValue::Reference(0)));

    let decoded = codec.decode(&wire).unwrap();
    let alice = decoded.as_object().unwrap();
    let Some(Value::Object(bob)) = alice.get_attribute("friend") else {
        panic!("friend not decoded");
    };
    assert_eq!(bob.get_attribute("friend"), Some(Value::Object(alice.clone())));
    assert_eq!(alice.get_attribute("friend_id"), Some(Value::Int(2)));
}

#[test]
fn install_registers_resolver_once_per_call() {
    let mut codec = Codec::new();
    install(&mut codec.aliases, &mut codec.encoder);

    assert_eq!(codec.encoder.resolver_count(), 1);
    assert!(codec.aliases.lookup_alias(&AUTHOR).unwrap().descriptor().primary_key().is_some());
}
