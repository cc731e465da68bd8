//! Object-graph codec between native `Value`s and `WireValue`s.
//!
//! The codec is agnostic of entities and schemas:
//! - aliases (looked up in an explicit `AliasRegistry`) decide what an object
//!   exposes,
//! - `ObjectResolver` hooks registered on the `Encoder` may substitute an
//!   object before it is written,
//! - the per-session reference table turns repeated objects into
//!   back-references, which is also what terminates cyclic graphs.

mod context;
mod decoder;
mod encoder;

#[cfg(test)]
mod tests;

use crate::{
    alias::{AliasError, AliasRegistry},
    error::InternalError,
    object::ObjectError,
    value::{Value, WireValue},
};
use thiserror::Error as ThisError;

// re-exports
pub use context::{DecodeContext, EncodeContext, ReferenceTable};
pub use decoder::Decoder;
pub use encoder::{Encoder, ObjectResolver};

///
/// CodecError
///

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("reference {0} points past the reference table")]
    DanglingReference(u32),

    #[error("reference table overflow")]
    TooManyReferences,

    #[error(transparent)]
    Alias(#[from] AliasError),

    #[error(transparent)]
    Object(#[from] ObjectError),
}

impl From<CodecError> for InternalError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Alias(err) => err.into(),
            CodecError::Object(err) => err.into(),
            _ => Self::codec_corruption(err.to_string()),
        }
    }
}

///
/// Codec
///
/// Alias registry plus encoder hooks, wired once at startup.
/// Fields are public so startup code can register into both at once.
///

#[derive(Debug, Default)]
pub struct Codec {
    pub aliases: AliasRegistry,
    pub encoder: Encoder,
}

impl Codec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one top-level value in a fresh session.
    pub fn encode(&self, value: &Value) -> Result<WireValue, CodecError> {
        self.encoder.encode(&self.aliases, value)
    }

    /// Encode several values sharing one session (and reference table).
    pub fn encode_with(
        &self,
        value: &Value,
        ctx: &mut EncodeContext,
    ) -> Result<WireValue, CodecError> {
        self.encoder.encode_with(&self.aliases, value, ctx)
    }

    /// Decode one top-level value in a fresh session.
    pub fn decode(&self, wire: &WireValue) -> Result<Value, CodecError> {
        Decoder.decode(&self.aliases, wire)
    }

    pub fn decode_with(
        &self,
        wire: &WireValue,
        ctx: &mut DecodeContext,
    ) -> Result<Value, CodecError> {
        Decoder.decode_with(&self.aliases, wire, ctx)
    }
}
