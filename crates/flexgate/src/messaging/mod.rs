//! Flex messaging value types carried by RemoteObject requests.
//!
//! Every field defaults to absent (`None`). Header keys, operation codes and
//! wire class names are part of the client contract and must not change.

#[cfg(test)]
mod tests;

use derive_more::{Deref, DerefMut};
use flexgate_core::{
    alias::{AliasError, AliasRegistry},
    object::{ClassInfo, Record},
    value::{Attributes, ObjectRef, Value},
};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

// Add each field that holds a value to a debug struct.
macro_rules! debug_set {
    ($d:expr, $($name:literal => $field:expr),* $(,)?) => {
        $(
            if let Some(value) = &$field {
                $d.field($name, value);
            }
        )*
    };
}

///
/// HEADERS
///

pub const DESTINATION_CLIENT_ID_HEADER: &str = "DSDstClientId";
pub const ENDPOINT_HEADER: &str = "DSEndpoint";
pub const REMOTE_CREDENTIALS_HEADER: &str = "DSRemoteCredentials";
pub const REQUEST_TIMEOUT_HEADER: &str = "DSRequestTimeout";
pub const SUBTOPIC_HEADER: &str = "DSSubtopic";
pub const ERROR_HINT_HEADER: &str = "DSErrorHint";
pub const SELECTOR_HEADER: &str = "DSSelector";
pub const RETRYABLE_HINT_HEADER: &str = "DSRetryableErrorHint";

/// Fault code for messages whose delivery could not be confirmed.
pub const MESSAGE_DELIVERY_IN_DOUBT: &str = "Client.Error.DeliveryInDoubt";

pub const AUTHENTICATION_MESSAGE_REF_TYPE: &str = "flex.messaging.messages.AuthenticationMessage";

///
/// CLASSES
///

pub static ASYNC_MESSAGE: ClassInfo = ClassInfo::new("flexgate::messaging::AsyncMessage");
pub static ACKNOWLEDGE_MESSAGE: ClassInfo =
    ClassInfo::new("flexgate::messaging::AcknowledgeMessage");
pub static COMMAND_MESSAGE: ClassInfo = ClassInfo::new("flexgate::messaging::CommandMessage");
pub static ERROR_MESSAGE: ClassInfo = ClassInfo::new("flexgate::messaging::ErrorMessage");
pub static REMOTING_MESSAGE: ClassInfo = ClassInfo::new("flexgate::messaging::RemotingMessage");

/// Bind every message class to its Flex wire name.
pub fn register(aliases: &mut AliasRegistry) -> Result<(), AliasError> {
    for kind in MessageKind::ALL {
        let class = kind.class();
        aliases.register_class(class, kind.wire_name(), move || Ok(Record::new(class).into_ref()))?;
    }

    Ok(())
}

/// Fresh random message or client id.
#[must_use]
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current UTC time in whole seconds since the epoch.
#[must_use]
pub fn timestamp_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

///
/// CommandOperation
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CommandOperation {
    Subscribe,
    Unsubscribe,
    Poll,
    ClientSync,
    ClientPing,
    ClusterRequest,
    Login,
    Logout,
    SessionInvalidate,
    Unknown,
    /// A code outside the table, kept as sent.
    Other(i64),
}

impl CommandOperation {
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Subscribe => 0,
            Self::Unsubscribe => 1,
            Self::Poll => 2,
            Self::ClientSync => 4,
            Self::ClientPing => 5,
            Self::ClusterRequest => 7,
            Self::Login => 8,
            Self::Logout => 9,
            Self::SessionInvalidate => 10,
            Self::Unknown => 1000,
            Self::Other(code) => code,
        }
    }

    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        let op = match code {
            0 => Self::Subscribe,
            1 => Self::Unsubscribe,
            2 => Self::Poll,
            4 => Self::ClientSync,
            5 => Self::ClientPing,
            7 => Self::ClusterRequest,
            8 => Self::Login,
            9 => Self::Logout,
            10 => Self::SessionInvalidate,
            1000 => Self::Unknown,
            _ => return None,
        };

        Some(op)
    }
}

impl fmt::Display for CommandOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Message headers in the order the sender gave them.
pub type Headers = Vec<(String, Value)>;

///
/// AbstractMessage
///

#[derive(Clone, Default, PartialEq)]
pub struct AbstractMessage {
    pub body: Option<Value>,
    pub client_id: Option<String>,
    pub destination: Option<String>,
    pub headers: Option<Headers>,
    pub message_id: Option<String>,
    pub time_to_live: Option<i64>,
    pub timestamp: Option<i64>,
}

impl AbstractMessage {
    /// Fresh ids and the current timestamp.
    #[must_use]
    pub fn stamped() -> Self {
        Self {
            client_id: Some(generate_id()),
            message_id: Some(generate_id()),
            timestamp: Some(timestamp_now()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers
            .as_ref()?
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    fn read(attrs: &Attributes) -> Self {
        Self {
            body: present(attrs, "body"),
            client_id: text(attrs, "clientId"),
            destination: text(attrs, "destination"),
            headers: attrs.get("headers").and_then(read_headers),
            message_id: text(attrs, "messageId"),
            time_to_live: int(attrs, "timeToLive"),
            timestamp: int(attrs, "timestamp"),
        }
    }

    fn write(&self, attrs: &mut Attributes) {
        put(attrs, "body", self.body.clone());
        put(attrs, "clientId", self.client_id.clone());
        put(attrs, "destination", self.destination.clone());
        put(attrs, "headers", self.headers.as_deref().map(write_headers));
        put(attrs, "messageId", self.message_id.clone());
        put(attrs, "timeToLive", self.time_to_live);
        put(attrs, "timestamp", self.timestamp);
    }

    fn debug_fields(&self, d: &mut fmt::DebugStruct<'_, '_>) {
        debug_set!(d,
            "body" => self.body,
            "clientId" => self.client_id,
            "destination" => self.destination,
            "headers" => self.headers,
            "messageId" => self.message_id,
            "timeToLive" => self.time_to_live,
            "timestamp" => self.timestamp,
        );
    }
}

///
/// AsyncMessage
///

#[derive(Clone, Default, Deref, DerefMut, PartialEq)]
pub struct AsyncMessage {
    #[deref]
    #[deref_mut]
    pub base: AbstractMessage,
    pub correlation_id: Option<String>,
}

impl AsyncMessage {
    fn read(attrs: &Attributes) -> Self {
        Self {
            base: AbstractMessage::read(attrs),
            correlation_id: text(attrs, "correlationId"),
        }
    }

    fn write(&self, attrs: &mut Attributes) {
        self.base.write(attrs);
        put(attrs, "correlationId", self.correlation_id.clone());
    }

    fn debug_fields(&self, d: &mut fmt::DebugStruct<'_, '_>) {
        self.base.debug_fields(d);
        debug_set!(d, "correlationId" => self.correlation_id);
    }
}

///
/// AcknowledgeMessage
/// Reply to a successfully handled message.
///

#[derive(Clone, Default, Deref, DerefMut, PartialEq)]
pub struct AcknowledgeMessage {
    pub base: AsyncMessage,
}

impl AcknowledgeMessage {
    /// Fresh acknowledgement correlated with `request` when given.
    #[must_use]
    pub fn generate(request: Option<&AbstractMessage>) -> Self {
        Self {
            base: AsyncMessage {
                base: AbstractMessage::stamped(),
                correlation_id: request.and_then(|request| request.message_id.clone()),
            },
        }
    }
}

///
/// CommandMessage
///

#[derive(Clone, Default, Deref, DerefMut, PartialEq)]
pub struct CommandMessage {
    #[deref]
    #[deref_mut]
    pub base: AsyncMessage,
    pub operation: Option<CommandOperation>,
    pub message_ref_type: Option<String>,
}

impl CommandMessage {
    pub const AUTHENTICATION_MESSAGE_REF_TYPE: &'static str = AUTHENTICATION_MESSAGE_REF_TYPE;

    #[must_use]
    pub fn new(operation: CommandOperation) -> Self {
        Self {
            operation: Some(operation),
            ..Self::default()
        }
    }
}

///
/// ErrorMessage
///

#[derive(Clone, Default, Deref, DerefMut, PartialEq)]
pub struct ErrorMessage {
    #[deref]
    #[deref_mut]
    pub base: AcknowledgeMessage,
    pub extended_data: Option<Value>,
    pub fault_code: Option<String>,
    pub fault_detail: Option<String>,
    pub fault_string: Option<String>,
    pub root_cause: Option<Value>,
}

impl ErrorMessage {
    pub const MESSAGE_DELIVERY_IN_DOUBT: &'static str = MESSAGE_DELIVERY_IN_DOUBT;
}

///
/// RemotingMessage
/// Call of `operation` on the service named by `source`.
///

#[derive(Clone, Default, Deref, DerefMut, PartialEq)]
pub struct RemotingMessage {
    #[deref]
    #[deref_mut]
    pub base: AbstractMessage,
    pub operation: Option<String>,
    pub source: Option<String>,
}

impl RemotingMessage {
    #[must_use]
    pub fn new(source: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            operation: Some(operation.into()),
            ..Self::default()
        }
    }

    /// Positional call arguments carried in the body.
    #[must_use]
    pub fn arguments(&self) -> Vec<Value> {
        match &self.body {
            Some(Value::List(args)) => args.clone(),
            Some(arg) => vec![arg.clone()],
            None => Vec::new(),
        }
    }
}

///
/// MessageKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MessageKind {
    Async,
    Acknowledge,
    Command,
    Error,
    Remoting,
}

impl MessageKind {
    pub const ALL: [Self; 5] = [
        Self::Async,
        Self::Acknowledge,
        Self::Command,
        Self::Error,
        Self::Remoting,
    ];

    #[must_use]
    pub fn class(self) -> &'static ClassInfo {
        match self {
            Self::Async => &ASYNC_MESSAGE,
            Self::Acknowledge => &ACKNOWLEDGE_MESSAGE,
            Self::Command => &COMMAND_MESSAGE,
            Self::Error => &ERROR_MESSAGE,
            Self::Remoting => &REMOTING_MESSAGE,
        }
    }

    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Async => "flex.messaging.messages.AsyncMessage",
            Self::Acknowledge => "flex.messaging.messages.AcknowledgeMessage",
            Self::Command => "flex.messaging.messages.CommandMessage",
            Self::Error => "flex.messaging.messages.ErrorMessage",
            Self::Remoting => "flex.messaging.messages.RemotingMessage",
        }
    }

    // Registered objects carry their class; unregistered ones only the
    // wire name they were decoded from.
    fn of(object: &ObjectRef) -> Option<Self> {
        let path = object.class().path;
        let wire_name = object.class_name();

        Self::ALL
            .into_iter()
            .find(|kind| kind.class().path == path || wire_name == Some(kind.wire_name()))
    }
}

///
/// Message
///

#[derive(Clone, PartialEq)]
pub enum Message {
    Async(AsyncMessage),
    Acknowledge(AcknowledgeMessage),
    Command(CommandMessage),
    Error(ErrorMessage),
    Remoting(RemotingMessage),
}

impl Message {
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Async(_) => MessageKind::Async,
            Self::Acknowledge(_) => MessageKind::Acknowledge,
            Self::Command(_) => MessageKind::Command,
            Self::Error(_) => MessageKind::Error,
            Self::Remoting(_) => MessageKind::Remoting,
        }
    }

    /// Fields shared by every message kind.
    #[must_use]
    pub fn base(&self) -> &AbstractMessage {
        match self {
            Self::Async(m) => &m.base,
            Self::Acknowledge(m) => &m.base.base,
            Self::Command(m) => &m.base.base,
            Self::Error(m) => &m.base.base.base,
            Self::Remoting(m) => &m.base,
        }
    }

    /// Read a message back from a decoded object; `None` for anything that
    /// is not a Flex message.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let kind = MessageKind::of(object)?;
        let attrs = object.attributes();

        let message = match kind {
            MessageKind::Async => Self::Async(AsyncMessage::read(&attrs)),
            MessageKind::Acknowledge => Self::Acknowledge(AcknowledgeMessage {
                base: AsyncMessage::read(&attrs),
            }),
            MessageKind::Command => Self::Command(CommandMessage {
                base: AsyncMessage::read(&attrs),
                operation: int(&attrs, "operation").map(|code| {
                    CommandOperation::from_code(code).unwrap_or(CommandOperation::Other(code))
                }),
                message_ref_type: text(&attrs, "messageRefType"),
            }),
            MessageKind::Error => Self::Error(ErrorMessage {
                base: AcknowledgeMessage {
                    base: AsyncMessage::read(&attrs),
                },
                extended_data: present(&attrs, "extendedData"),
                fault_code: text(&attrs, "faultCode"),
                fault_detail: text(&attrs, "faultDetail"),
                fault_string: text(&attrs, "faultString"),
                root_cause: present(&attrs, "rootCause"),
            }),
            MessageKind::Remoting => Self::Remoting(RemotingMessage {
                base: AbstractMessage::read(&attrs),
                operation: text(&attrs, "operation"),
                source: text(&attrs, "source"),
            }),
        };

        Some(message)
    }

    /// Build the object carried on the wire. Absent fields are written as
    /// nulls so every attribute is always present.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut attrs = Attributes::new();

        match self {
            Self::Async(m) => m.write(&mut attrs),
            Self::Acknowledge(m) => m.base.write(&mut attrs),
            Self::Command(m) => {
                m.base.write(&mut attrs);
                put(&mut attrs, "operation", m.operation.map(CommandOperation::code));
                put(&mut attrs, "messageRefType", m.message_ref_type.clone());
            }
            Self::Error(m) => {
                m.base.base.write(&mut attrs);
                put(&mut attrs, "extendedData", m.extended_data.clone());
                put(&mut attrs, "faultCode", m.fault_code.clone());
                put(&mut attrs, "faultDetail", m.fault_detail.clone());
                put(&mut attrs, "faultString", m.fault_string.clone());
                put(&mut attrs, "rootCause", m.root_cause.clone());
            }
            Self::Remoting(m) => {
                m.base.write(&mut attrs);
                put(&mut attrs, "operation", m.operation.clone());
                put(&mut attrs, "source", m.source.clone());
            }
        }

        let record = attrs
            .into_iter()
            .fold(Record::new(self.kind().class()), |record, (name, value)| {
                record.with(name, value)
            });

        Value::Object(record.into_ref())
    }
}

impl From<Message> for Value {
    fn from(message: Message) -> Self {
        message.to_value()
    }
}

impl From<AcknowledgeMessage> for Message {
    fn from(m: AcknowledgeMessage) -> Self {
        Self::Acknowledge(m)
    }
}

impl From<CommandMessage> for Message {
    fn from(m: CommandMessage) -> Self {
        Self::Command(m)
    }
}

impl From<ErrorMessage> for Message {
    fn from(m: ErrorMessage) -> Self {
        Self::Error(m)
    }
}

impl From<RemotingMessage> for Message {
    fn from(m: RemotingMessage) -> Self {
        Self::Remoting(m)
    }
}

//
// Debug
// Message debug output lists only the fields that are set.
//

impl fmt::Debug for AbstractMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("AbstractMessage");
        self.debug_fields(&mut d);
        d.finish()
    }
}

impl fmt::Debug for AsyncMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("AsyncMessage");
        self.debug_fields(&mut d);
        d.finish()
    }
}

impl fmt::Debug for AcknowledgeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("AcknowledgeMessage");
        self.base.debug_fields(&mut d);
        d.finish()
    }
}

impl fmt::Debug for CommandMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("CommandMessage");
        self.base.debug_fields(&mut d);
        debug_set!(d,
            "operation" => self.operation,
            "messageRefType" => self.message_ref_type,
        );
        d.finish()
    }
}

impl fmt::Debug for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("ErrorMessage");
        self.base.base.debug_fields(&mut d);
        debug_set!(d,
            "extendedData" => self.extended_data,
            "faultCode" => self.fault_code,
            "faultDetail" => self.fault_detail,
            "faultString" => self.fault_string,
            "rootCause" => self.root_cause,
        );
        d.finish()
    }
}

impl fmt::Debug for RemotingMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("RemotingMessage");
        self.base.debug_fields(&mut d);
        debug_set!(d,
            "operation" => self.operation,
            "source" => self.source,
        );
        d.finish()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Async(m) => m.fmt(f),
            Self::Acknowledge(m) => m.fmt(f),
            Self::Command(m) => m.fmt(f),
            Self::Error(m) => m.fmt(f),
            Self::Remoting(m) => m.fmt(f),
        }
    }
}

//
// attribute helpers
//

fn present(attrs: &Attributes, name: &str) -> Option<Value> {
    attrs.get(name).filter(|value| !value.is_absent()).cloned()
}

fn text(attrs: &Attributes, name: &str) -> Option<String> {
    attrs.get(name).and_then(Value::as_text).map(str::to_string)
}

// Headers travel as a list of `[name, value]` pairs; a plain map is
// accepted too.
fn read_headers(value: &Value) -> Option<Headers> {
    match value {
        Value::Map(map) => Some(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        Value::List(entries) => Some(
            entries
                .iter()
                .filter_map(|entry| match entry {
                    Value::List(pair) => match pair.as_slice() {
                        [Value::Text(name), value] => Some((name.clone(), value.clone())),
                        _ => None,
                    },
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

fn write_headers(headers: &[(String, Value)]) -> Value {
    Value::List(
        headers
            .iter()
            .map(|(name, value)| Value::List(vec![Value::Text(name.clone()), value.clone()]))
            .collect(),
    )
}

fn int(attrs: &Attributes, name: &str) -> Option<i64> {
    attrs.get(name).and_then(Value::as_int)
}

fn put(attrs: &mut Attributes, name: &str, value: Option<impl Into<Value>>) {
    attrs.insert(name.to_string(), value.map_or(Value::Null, Into::into));
}
