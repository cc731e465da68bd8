use crate::{
    alias::AliasRegistry,
    codec::{CodecError, DecodeContext},
    value::{Attributes, Value, WireValue},
};

///
/// Decoder
///
/// Rebuilds native values from wire values. Objects are instantiated through
/// the alias registry and entered into the reference table before their
/// attributes are decoded, so back-references inside them resolve.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Decoder;

impl Decoder {
    pub fn decode(self, aliases: &AliasRegistry, wire: &WireValue) -> Result<Value, CodecError> {
        self.decode_with(aliases, wire, &mut DecodeContext::new())
    }

    pub fn decode_with(
        self,
        aliases: &AliasRegistry,
        wire: &WireValue,
        ctx: &mut DecodeContext,
    ) -> Result<Value, CodecError> {
        let value = match wire {
            WireValue::Undefined => Value::Undefined,
            WireValue::Null => Value::Null,
            WireValue::Bool(v) => Value::Bool(*v),
            WireValue::Int(v) => Value::Int(*v),
            WireValue::Number(v) => Value::Float(*v),
            WireValue::Text(v) => Value::Text(v.clone()),
            WireValue::Date(dt) => Value::DateTime(*dt),
            WireValue::Array(items) => Value::List(
                items
                    .iter()
                    .map(|item| self.decode_with(aliases, item, ctx))
                    .collect::<Result<_, _>>()?,
            ),
            WireValue::Map(entries) => Value::Map(self.decode_entries(aliases, entries, ctx)?),
            WireValue::Object { class, attrs } => {
                let object = aliases.instantiate(class.as_deref())?;
                ctx.references_mut().push(object.clone())?;

                if let Some(entries) = attrs {
                    let attrs = self.decode_entries(aliases, entries, ctx)?;
                    let alias = aliases.lookup_alias(object.class())?;
                    alias.apply_attributes(&*object, attrs)?;
                }

                Value::Object(object)
            }
            WireValue::Reference(index) => ctx
                .references()
                .object(*index)
                .cloned()
                .map(Value::Object)
                .ok_or(CodecError::DanglingReference(*index))?,
        };

        Ok(value)
    }

    fn decode_entries(
        self,
        aliases: &AliasRegistry,
        entries: &[(String, WireValue)],
        ctx: &mut DecodeContext,
    ) -> Result<Attributes, CodecError> {
        entries
            .iter()
            .map(|(name, item)| Ok((name.clone(), self.decode_with(aliases, item, ctx)?)))
            .collect()
    }
}
