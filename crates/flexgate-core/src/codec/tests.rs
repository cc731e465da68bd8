use super::*;
use crate::{
    object::{ClassInfo, Record},
    value::{Attributes, FileHandle, ObjectRef},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use time::macros::{date, datetime, time};

static POINT: ClassInfo = ClassInfo::new("geo::Point").with_attrs(&["x", "y"]);

fn point_codec() -> Codec {
    let mut codec = Codec::new();
    codec
        .aliases
        .register_class(&POINT, "geo.Point", || Ok(Record::new(&POINT).into_ref()))
        .unwrap();

    codec
}

fn point(x: i64, y: i64) -> ObjectRef {
    Record::new(&POINT).with("x", x).with("y", y).into_ref()
}

#[test]
fn scalars_map_onto_wire_values() {
    let codec = Codec::new();
    let cases = [
        (Value::Undefined, WireValue::Undefined),
        (Value::NotProvided, WireValue::Undefined),
        (Value::Null, WireValue::Null),
        (Value::Bool(true), WireValue::Bool(true)),
        (Value::Int(-4), WireValue::Int(-4)),
        (Value::Float(1.5), WireValue::Number(1.5)),
        (Value::from("hi"), WireValue::Text("hi".into())),
        (
            Value::Date(date!(2009 - 03 - 01)),
            WireValue::Date(datetime!(2009-03-01 0:00)),
        ),
        (
            Value::Time(time!(8:15)),
            WireValue::Date(datetime!(1970-01-01 8:15)),
        ),
        (
            Value::File(FileHandle::new("docs/a.pdf")),
            WireValue::Text("docs/a.pdf".into()),
        ),
    ];

    for (value, expected) in cases {
        assert_eq!(codec.encode(&value).unwrap(), expected, "encoding {value:?}");
    }
}

#[test]
fn wire_dates_decode_as_datetimes() {
    let codec = Codec::new();
    let dt = datetime!(2009-03-01 12:00);

    assert_eq!(codec.decode(&WireValue::Date(dt)).unwrap(), Value::DateTime(dt));
    assert_eq!(codec.decode(&WireValue::Undefined).unwrap(), Value::Undefined);
}

#[test]
fn repeated_objects_become_references() {
    let codec = point_codec();
    let shared = point(1, 2);

    let wire = codec
        .encode(&Value::from(vec![shared.clone(), point(1, 2), shared]))
        .unwrap();
    let WireValue::Array(items) = &wire else {
        panic!("expected array, got {wire:?}");
    };

    assert_eq!(items[0].class_name(), Some("geo.Point"));
    assert!(!items[1].is_reference());
    assert_eq!(items[2], WireValue::Reference(0));

    let Value::List(decoded) = codec.decode(&wire).unwrap() else {
        panic!("expected list");
    };
    assert_eq!(decoded[0], decoded[2]);
    assert_ne!(decoded[0], decoded[1]);
    assert_eq!(
        decoded[0].as_object().unwrap().get_attribute("x"),
        Some(Value::Int(1))
    );
}

#[test]
fn maps_are_never_referenced() {
    let codec = Codec::new();
    let mut entries = Attributes::new();
    entries.insert("k".into(), Value::Int(1));
    let map = Value::Map(entries);

    let wire = codec.encode(&Value::List(vec![map.clone(), map])).unwrap();
    let WireValue::Array(items) = wire else {
        panic!("expected array");
    };

    assert!(items.iter().all(|item| matches!(item, WireValue::Map(_))));
}

#[test]
fn self_referencing_record_terminates() {
    let codec = Codec::new();
    let node = Record::anonymous(Some("Node".into())).into_ref();
    node.set_attribute("next", Value::Object(node.clone())).unwrap();

    let wire = codec.encode(&Value::Object(node)).unwrap();

    assert_eq!(
        wire,
        WireValue::Object {
            class: Some("Node".into()),
            attrs: Some(vec![("next".into(), WireValue::Reference(0))]),
        }
    );

    let decoded = codec.decode(&wire).unwrap();
    let node = decoded.as_object().unwrap();
    assert_eq!(node.get_attribute("next"), Some(decoded.clone()));
}

#[test]
fn class_names_fall_back_to_path() {
    static UNREGISTERED: ClassInfo = ClassInfo::new("geo::Line");

    let codec = Codec::new();
    let typed = codec.encode(&Value::Object(Record::new(&UNREGISTERED).into_ref())).unwrap();
    let untyped = codec.encode(&Value::Object(Record::anonymous(None).into_ref())).unwrap();

    assert_eq!(typed.class_name(), Some("geo::Line"));
    assert_eq!(untyped.class_name(), None);
}

#[test]
fn empty_objects_encode_without_attributes() {
    let codec = Codec::new();
    let wire = codec.encode(&Value::Object(Record::anonymous(None).into_ref())).unwrap();

    assert_eq!(wire, WireValue::Object { class: None, attrs: None });
}

#[test]
fn unknown_wire_class_decodes_into_named_record() {
    let codec = Codec::new();
    let wire = WireValue::Object {
        class: Some("com.example.Thing".into()),
        attrs: Some(vec![("a".into(), WireValue::Int(1))]),
    };

    let decoded = codec.decode(&wire).unwrap();
    let object = decoded.as_object().unwrap();

    assert_eq!(object.class_name(), Some("com.example.Thing"));
    assert_eq!(object.get_attribute("a"), Some(Value::Int(1)));
    assert_eq!(codec.encode(&decoded).unwrap(), wire);
}

#[test]
fn dangling_reference_is_an_error() {
    let codec = Codec::new();
    let err = codec.decode(&WireValue::Reference(3)).unwrap_err();

    assert!(matches!(err, CodecError::DanglingReference(3)));
}

#[test]
fn references_span_one_session_only() {
    let codec = point_codec();
    let shared = Value::Object(point(1, 1));
    let mut ctx = EncodeContext::new();

    let first = codec.encode_with(&shared, &mut ctx).unwrap();
    let second = codec.encode_with(&shared, &mut ctx).unwrap();
    let fresh = codec.encode(&shared).unwrap();

    assert!(!first.is_reference());
    assert_eq!(second, WireValue::Reference(0));
    assert!(!fresh.is_reference());
    assert_eq!(ctx.references().len(), 1);
}

//
// resolver hooks
//

struct Substitute(ObjectRef);

impl ObjectResolver for Substitute {
    fn resolve(&self, _object: &ObjectRef, _ctx: &mut EncodeContext) -> Option<ObjectRef> {
        Some(self.0.clone())
    }
}

struct Counting(AtomicUsize);

impl ObjectResolver for &'static Counting {
    fn resolve(&self, _object: &ObjectRef, _ctx: &mut EncodeContext) -> Option<ObjectRef> {
        self.0.fetch_add(1, Ordering::Relaxed);
        None
    }
}

#[test]
fn first_substituting_hook_wins() {
    static SEEN: Counting = Counting(AtomicUsize::new(0));

    let mut codec = point_codec();
    let replacement = point(9, 9);
    codec.encoder.register_resolver(&SEEN);
    codec.encoder.register_resolver(Substitute(replacement.clone()));
    codec.encoder.register_resolver(Substitute(point(0, 0)));

    let wire = codec.encode(&Value::Object(point(1, 1))).unwrap();
    let decoded = codec.decode(&wire).unwrap();

    assert_eq!(SEEN.0.load(Ordering::Relaxed), 1);
    assert_eq!(
        decoded.as_object().unwrap().get_attribute("x"),
        Some(Value::Int(9))
    );
}
