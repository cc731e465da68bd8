///
/// FieldModel
/// Runtime field metadata used by alias compilation.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Attribute name as seen by callers and on the wire.
    pub name: &'static str,
    /// Backing column/attribute that stores the raw value.
    /// Equal to `name` except for foreign keys (`author` → `author_id`).
    pub column: &'static str,
    pub kind: FieldKind,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column: name,
            kind,
        }
    }

    /// Single-valued relation stored in `column`.
    #[must_use]
    pub const fn foreign_key(name: &'static str, column: &'static str, target: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::ForeignKey { target },
        }
    }

    #[must_use]
    pub const fn many_to_many(name: &'static str, target: &'static str) -> Self {
        Self::new(name, FieldKind::ManyToMany { target })
    }

    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.kind, FieldKind::File)
    }
}

///
/// FieldKind
///
/// Minimal type surface needed by alias compilation and value coercion.
/// This is a lossy projection of whatever the backing ORM knows.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    /// Auto-generated integer key; `0` on the wire means "not assigned yet".
    AutoKey,
    /// Anything the codec carries unchanged.
    Scalar,
    Date,
    DateTime,
    Time,
    /// Stored file; encoded as its logical name and never decoded.
    File,

    // Relations
    ForeignKey {
        target: &'static str,
    },
    ManyToMany {
        target: &'static str,
    },
    /// Implicit reverse side of another model's relation; never encoded.
    Reverse {
        target: &'static str,
    },
}

impl FieldKind {
    #[must_use]
    pub const fn is_foreign_key(self) -> bool {
        matches!(self, Self::ForeignKey { .. })
    }

    #[must_use]
    pub const fn is_many(self) -> bool {
        matches!(self, Self::ManyToMany { .. })
    }

    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::Reverse { .. })
    }

    /// Target entity path for relation kinds.
    #[must_use]
    pub const fn target(self) -> Option<&'static str> {
        match self {
            Self::ForeignKey { target } | Self::ManyToMany { target } | Self::Reverse { target } => {
                Some(target)
            }
            _ => None,
        }
    }
}
