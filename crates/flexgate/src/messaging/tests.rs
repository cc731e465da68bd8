use super::*;
use flexgate_core::codec::Codec;

#[test]
fn operation_codes_are_fixed() {
    let table = [
        (CommandOperation::Subscribe, 0),
        (CommandOperation::Unsubscribe, 1),
        (CommandOperation::Poll, 2),
        (CommandOperation::ClientSync, 4),
        (CommandOperation::ClientPing, 5),
        (CommandOperation::ClusterRequest, 7),
        (CommandOperation::Login, 8),
        (CommandOperation::Logout, 9),
        (CommandOperation::SessionInvalidate, 10),
        (CommandOperation::Unknown, 1000),
    ];

    for (op, code) in table {
        assert_eq!(op.code(), code);
        assert_eq!(CommandOperation::from_code(code), Some(op));
    }
    assert_eq!(CommandOperation::from_code(3), None);
    assert_eq!(CommandOperation::Other(3).code(), 3);
    assert_eq!(CommandOperation::Other(3).to_string(), "3");
}

#[test]
fn header_keys_match_the_protocol() {
    assert_eq!(DESTINATION_CLIENT_ID_HEADER, "DSDstClientId");
    assert_eq!(ENDPOINT_HEADER, "DSEndpoint");
    assert_eq!(REMOTE_CREDENTIALS_HEADER, "DSRemoteCredentials");
    assert_eq!(REQUEST_TIMEOUT_HEADER, "DSRequestTimeout");
    assert_eq!(SUBTOPIC_HEADER, "DSSubtopic");
    assert_eq!(ERROR_HINT_HEADER, "DSErrorHint");
    assert_eq!(SELECTOR_HEADER, "DSSelector");
    assert_eq!(RETRYABLE_HINT_HEADER, "DSRetryableErrorHint");
}

#[test]
fn fields_default_to_absent() {
    let message = ErrorMessage::default();

    assert!(message.body.is_none());
    assert!(message.correlation_id.is_none());
    assert!(message.fault_code.is_none());
    assert!(message.root_cause.is_none());
    assert_eq!(format!("{message:?}"), "ErrorMessage");
}

#[test]
fn debug_lists_set_fields_only() {
    let mut message = RemotingMessage::new("echo", "say");
    message.message_id = Some("m-1".into());

    let rendered = format!("{message:?}");

    assert!(rendered.contains("messageId: \"m-1\""));
    assert!(rendered.contains("source: \"echo\""));
    assert!(!rendered.contains("clientId"));
}

#[test]
fn acknowledgement_is_stamped_and_correlated() {
    let mut request = AbstractMessage::default();
    request.message_id = Some("req-1".into());

    let ack = AcknowledgeMessage::generate(Some(&request));

    assert_eq!(ack.correlation_id.as_deref(), Some("req-1"));
    assert!(ack.timestamp.is_some_and(|ts| ts > 0));
    assert_eq!(ack.message_id.as_ref().map(String::len), Some(36));
    assert_ne!(ack.message_id, ack.client_id);
}

#[test]
fn command_converts_through_value() {
    let mut command = CommandMessage::new(CommandOperation::ClientPing);
    command.message_id = Some("ping-1".into());
    command.message_ref_type = Some(AUTHENTICATION_MESSAGE_REF_TYPE.into());
    let message = Message::from(command.clone());

    let value = message.to_value();
    let object = value.as_object().unwrap();
    assert_eq!(object.get_attribute("operation"), Some(Value::Int(5)));
    assert_eq!(object.get_attribute("destination"), Some(Value::Null));

    assert_eq!(Message::from_value(&value), Some(Message::Command(command)));
}

#[test]
fn messages_survive_the_codec() {
    let mut codec = Codec::new();
    register(&mut codec.aliases).unwrap();

    let mut remoting = RemotingMessage::new("test", "echo");
    remoting.body = Some(Value::List(vec![Value::from("hi")]));
    remoting.headers = Some(
        [(ENDPOINT_HEADER.to_string(), Value::from("my-amf"))]
            .into_iter()
            .collect(),
    );

    let wire = codec.encode(&Message::from(remoting.clone()).to_value()).unwrap();
    assert_eq!(wire.class_name(), Some("flex.messaging.messages.RemotingMessage"));

    let decoded = Message::from_value(&codec.decode(&wire).unwrap()).unwrap();
    assert_eq!(decoded, Message::Remoting(remoting.clone()));
    assert_eq!(
        decoded.base().header(ENDPOINT_HEADER),
        Some(&Value::from("my-amf"))
    );
    assert_eq!(remoting.arguments(), vec![Value::from("hi")]);
}

#[test]
fn headers_keep_the_senders_order() {
    let mut codec = Codec::new();
    register(&mut codec.aliases).unwrap();

    let mut command = CommandMessage::new(CommandOperation::ClientPing);
    command.headers = Some(vec![
        (REQUEST_TIMEOUT_HEADER.to_string(), Value::Int(30)),
        (ENDPOINT_HEADER.to_string(), Value::from("my-amf")),
        (DESTINATION_CLIENT_ID_HEADER.to_string(), Value::from("c-1")),
    ]);

    let wire = codec.encode(&Message::from(command).to_value()).unwrap();
    let decoded = Message::from_value(&codec.decode(&wire).unwrap()).unwrap();
    let names: Vec<_> = decoded
        .base()
        .headers
        .iter()
        .flatten()
        .map(|(name, _)| name.as_str())
        .collect();

    assert_eq!(names, ["DSRequestTimeout", "DSEndpoint", "DSDstClientId"]);
    assert_eq!(decoded.base().header(REQUEST_TIMEOUT_HEADER), Some(&Value::Int(30)));
}

#[test]
fn map_headers_are_read_by_name() {
    let mut map = Attributes::new();
    map.insert(ENDPOINT_HEADER.to_string(), Value::from("my-amf"));
    let object = Record::new(&ASYNC_MESSAGE)
        .with("headers", Value::Map(map))
        .into_ref();

    let message = Message::from_value(&Value::Object(object)).unwrap();
    assert_eq!(message.base().header(ENDPOINT_HEADER), Some(&Value::from("my-amf")));
}

#[test]
fn unregistered_wire_names_are_still_recognized() {
    let codec = Codec::new();
    let wire = codec
        .encode(&Message::from(CommandMessage::new(CommandOperation::Login)).to_value())
        .unwrap();

    // path-named on the way out, so rename to the Flex name
    let flexgate_core::value::WireValue::Object { attrs, .. } = wire else {
        panic!("expected object");
    };
    let renamed = flexgate_core::value::WireValue::Object {
        class: Some(MessageKind::Command.wire_name().into()),
        attrs,
    };

    let message = Message::from_value(&codec.decode(&renamed).unwrap()).unwrap();
    assert_eq!(message.kind(), MessageKind::Command);
}

#[test]
fn plain_values_are_not_messages() {
    assert!(Message::from_value(&Value::from("hello")).is_none());
    assert!(Message::from_value(&Value::Object(Record::anonymous(None).into_ref())).is_none());
}
