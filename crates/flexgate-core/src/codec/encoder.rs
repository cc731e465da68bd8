use crate::{
    alias::{AliasRegistry, coerce::TIME_ANCHOR},
    codec::{CodecError, EncodeContext},
    object::ANONYMOUS,
    value::{ObjectRef, Value, WireValue},
};
use std::{fmt, ptr};
use time::PrimitiveDateTime;

///
/// ObjectResolver
///
/// Encoder hook consulted before an object is written. Returning `Some`
/// substitutes the returned object (which may be the input itself); `None`
/// defers to the next hook and finally to the default path.
///

pub trait ObjectResolver: Send + Sync {
    fn resolve(&self, object: &ObjectRef, ctx: &mut EncodeContext) -> Option<ObjectRef>;
}

///
/// Encoder
///

#[derive(Default)]
pub struct Encoder {
    resolvers: Vec<Box<dyn ObjectResolver>>,
}

impl Encoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook; hooks run in registration order.
    pub fn register_resolver(&mut self, resolver: impl ObjectResolver + 'static) {
        self.resolvers.push(Box::new(resolver));
    }

    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }

    pub fn encode(&self, aliases: &AliasRegistry, value: &Value) -> Result<WireValue, CodecError> {
        self.encode_with(aliases, value, &mut EncodeContext::new())
    }

    pub fn encode_with(
        &self,
        aliases: &AliasRegistry,
        value: &Value,
        ctx: &mut EncodeContext,
    ) -> Result<WireValue, CodecError> {
        let wire = match value {
            Value::Undefined | Value::NotProvided => WireValue::Undefined,
            Value::Null => WireValue::Null,
            Value::Bool(v) => WireValue::Bool(*v),
            Value::Int(v) => WireValue::Int(*v),
            Value::Float(v) => WireValue::Number(*v),
            Value::Text(v) => WireValue::Text(v.clone()),
            Value::Date(date) => WireValue::Date(date.midnight()),
            Value::Time(time) => WireValue::Date(PrimitiveDateTime::new(TIME_ANCHOR, *time)),
            Value::DateTime(dt) => WireValue::Date(*dt),
            Value::File(file) => WireValue::Text(file.name().to_string()),
            Value::List(items) => WireValue::Array(
                items
                    .iter()
                    .map(|item| self.encode_with(aliases, item, ctx))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(entries) => WireValue::Map(
                entries
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), self.encode_with(aliases, item, ctx)?)))
                    .collect::<Result<_, CodecError>>()?,
            ),
            Value::Object(object) => self.encode_object(aliases, object, ctx)?,
        };

        Ok(wire)
    }

    fn encode_object(
        &self,
        aliases: &AliasRegistry,
        object: &ObjectRef,
        ctx: &mut EncodeContext,
    ) -> Result<WireValue, CodecError> {
        let object = self.resolve(object, ctx);

        if let Some(index) = ctx.references().get(&object) {
            return Ok(WireValue::Reference(index));
        }
        // registered before attributes so cycles resolve to this entry
        ctx.references_mut().push(object.clone())?;

        let alias = aliases.lookup_alias(object.class())?;
        let attrs = match alias.encodable_attributes(&*object)? {
            Some(attrs) => Some(
                attrs
                    .iter()
                    .map(|(name, value)| Ok((name.clone(), self.encode_with(aliases, value, ctx)?)))
                    .collect::<Result<Vec<_>, CodecError>>()?,
            ),
            None => None,
        };

        Ok(WireValue::Object {
            class: wire_class(aliases, &object),
            attrs,
        })
    }

    fn resolve(&self, object: &ObjectRef, ctx: &mut EncodeContext) -> ObjectRef {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.resolve(object, ctx))
            .unwrap_or_else(|| object.clone())
    }
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

// Registered wire name, then the instance's own name; anonymous records
// without a name stay untyped.
fn wire_class(aliases: &AliasRegistry, object: &ObjectRef) -> Option<String> {
    let class = object.class();

    aliases
        .wire_name(class)
        .or_else(|| object.class_name())
        .map(str::to_string)
        .or_else(|| (!ptr::eq(class, &ANONYMOUS)).then(|| class.path.to_string()))
}
