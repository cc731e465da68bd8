//! Runtime schema metadata.
//!
//! Types here describe *what an entity looks like* to the alias layer:
//! - `EntitySchema` is the capability surface an object-relational adapter
//!   implements (enumerate fields, look one up, list parent links).
//! - `EntityModel` is the static, declaration-time implementation used by
//!   in-memory entities and tests.
//!
//! The alias layer is written once against `EntitySchema`; adapters only map
//! their native field types onto `FieldKind`.
pub mod entity;
pub mod field;

// re-exports
pub use entity::{EntityModel, EntitySchema, ParentLink};
pub use field::{FieldKind, FieldModel};
