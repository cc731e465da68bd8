//! Core runtime for flexgate: native values, objects, class aliases, the
//! object-graph codec and its object-relational extension.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod alias;
pub mod codec;
pub mod error;
pub mod model;
pub mod object;
pub mod orm;
pub mod serialize;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Domain vocabulary only; errors and registries stay in their modules.
///

pub mod prelude {
    pub use crate::{
        model::{EntityModel, FieldKind, FieldModel},
        object::{ClassInfo, Entity, ModelInstance, Object, Record},
        value::{Attributes, ObjectRef, Value},
    };
}
