use crate::{
    codec::CodecError,
    orm::IdentityTable,
    value::ObjectRef,
};
use std::collections::HashMap;

///
/// ReferenceTable
///
/// Objects seen in one session, in first-seen order. Held objects stay alive
/// for the whole session so their addresses are never reused.
///

#[derive(Debug, Default)]
pub struct ReferenceTable {
    index: HashMap<usize, u32>,
    objects: Vec<ObjectRef>,
}

impl ReferenceTable {
    #[must_use]
    pub fn get(&self, object: &ObjectRef) -> Option<u32> {
        self.index.get(&object.addr()).copied()
    }

    #[must_use]
    pub fn object(&self, index: u32) -> Option<&ObjectRef> {
        self.objects.get(index as usize)
    }

    /// Append `object`, returning its reference index.
    pub fn push(&mut self, object: ObjectRef) -> Result<u32, CodecError> {
        let index = u32::try_from(self.objects.len()).map_err(|_| CodecError::TooManyReferences)?;
        self.index.insert(object.addr(), index);
        self.objects.push(object);

        Ok(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

///
/// EncodeContext
///
/// State of one encode session: the codec's reference table and the
/// identity table used by entity resolvers. Created per top-level encode and
/// dropped with it.
///

#[derive(Debug, Default)]
pub struct EncodeContext {
    references: ReferenceTable,
    identity: IdentityTable,
}

impl EncodeContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn references(&self) -> &ReferenceTable {
        &self.references
    }

    pub const fn references_mut(&mut self) -> &mut ReferenceTable {
        &mut self.references
    }

    #[must_use]
    pub const fn identity(&self) -> &IdentityTable {
        &self.identity
    }

    pub const fn identity_mut(&mut self) -> &mut IdentityTable {
        &mut self.identity
    }
}

///
/// DecodeContext
/// Reference table of one decode session.
///

#[derive(Debug, Default)]
pub struct DecodeContext {
    references: ReferenceTable,
}

impl DecodeContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn references(&self) -> &ReferenceTable {
        &self.references
    }

    pub const fn references_mut(&mut self) -> &mut ReferenceTable {
        &mut self.references
    }
}
