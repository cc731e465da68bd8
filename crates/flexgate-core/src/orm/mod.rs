//! Object-relational support: schema-driven aliases and identity collapse.
//!
//! Nothing here is wired in implicitly; `install` performs both startup
//! registrations against explicit registry and encoder values.

mod alias;
mod identity;

#[cfg(test)]
mod tests;

use crate::{
    alias::{AliasRegistry, ClassAlias},
    codec::Encoder,
};
use std::sync::Arc;

// re-exports
pub use alias::OrmEntityAlias;
pub use identity::{IdentityKey, IdentityResolver, IdentityTable};

/// Register the entity alias type and the identity-collapsing encoder hook.
pub fn install(aliases: &mut AliasRegistry, encoder: &mut Encoder) {
    install_alias_type(aliases);
    encoder.register_resolver(IdentityResolver);
}

/// Register only the entity alias type (decode-only setups).
pub fn install_alias_type(aliases: &mut AliasRegistry) {
    aliases.register_alias_type(
        |class| class.is_entity(),
        |class| Ok(Arc::new(OrmEntityAlias::compile(class)?) as Arc<dyn ClassAlias>),
    );
}
