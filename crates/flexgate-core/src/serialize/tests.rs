use super::*;
use crate::value::WireValue;

#[test]
fn wire_values_survive_cbor() {
    let wire = WireValue::Object {
        class: Some("Fault".into()),
        attrs: Some(vec![
            ("code".into(), WireValue::Text("NameError".into())),
            ("detail".into(), WireValue::Undefined),
            ("seen".into(), WireValue::Reference(0)),
        ]),
    };

    let bytes = serialize(&wire).unwrap();
    let back: WireValue = deserialize(&bytes).unwrap();

    assert_eq!(back, wire);
}

#[test]
fn bounded_decode_rejects_oversized_input() {
    let bytes = serialize(&WireValue::Text("x".repeat(64))).unwrap();
    let err = deserialize_bounded::<WireValue>(&bytes, 8).unwrap_err();

    assert_eq!(err.kind(), SerializeErrorKind::DeserializeSizeLimitExceeded);
}

#[test]
fn garbage_is_a_deserialize_error() {
    let err = deserialize::<WireValue>(&[0xff, 0x00, 0x13]).unwrap_err();

    assert_eq!(err.kind(), SerializeErrorKind::Deserialize);
}
