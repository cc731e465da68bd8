use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

///
/// WireValue
///
/// Codec-level representation exchanged with remote clients. Objects are
/// emitted once; every later occurrence of the same object in one encode
/// session becomes a `Reference` to its position in the session's reference
/// table.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum WireValue {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Number(f64),
    Text(String),
    Date(PrimitiveDateTime),
    Array(Vec<Self>),
    /// Untyped mapping; never enters the reference table.
    Map(Vec<(String, Self)>),
    /// Typed or anonymous object.
    /// `attrs: None` means the alias had nothing to encode.
    Object {
        class: Option<String>,
        attrs: Option<Vec<(String, Self)>>,
    },
    Reference(u32),
}

impl WireValue {
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// Wire class name when this is a typed object.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Object { class, .. } => class.as_deref(),
            _ => None,
        }
    }
}
