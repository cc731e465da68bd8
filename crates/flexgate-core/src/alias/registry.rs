use crate::{
    alias::{AliasError, ClassAlias, EntityAlias},
    object::{ClassInfo, ObjectError, Record},
    value::ObjectRef,
};
use parking_lot::RwLock;
use std::{collections::HashMap, fmt, sync::Arc};

/// Decides whether an alias type applies to a class.
pub type AliasPredicate = Arc<dyn Fn(&ClassInfo) -> bool + Send + Sync>;

/// Compiles the alias for a class matched by its predicate.
pub type AliasFactory =
    Arc<dyn Fn(&'static ClassInfo) -> Result<Arc<dyn ClassAlias>, AliasError> + Send + Sync>;

/// Builds an empty instance of a registered class on decode.
pub type ObjectFactory = Arc<dyn Fn() -> Result<ObjectRef, ObjectError> + Send + Sync>;

///
/// RegisteredClass
///

struct RegisteredClass {
    class: &'static ClassInfo,
    factory: ObjectFactory,
}

///
/// AliasRegistry
///
/// Explicit registry of class ↔ wire-name bindings and alias types.
/// Built once at startup and shared by reference with the codec. Compiled
/// aliases are memoized per class path.
///

#[derive(Default)]
pub struct AliasRegistry {
    wire_names: HashMap<&'static str, String>,
    classes: HashMap<String, RegisteredClass>,
    alias_types: Vec<(AliasPredicate, AliasFactory)>,
    compiled: RwLock<HashMap<&'static str, Arc<dyn ClassAlias>>>,
}

impl AliasRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a class to a wire name and the constructor used on decode.
    pub fn register_class(
        &mut self,
        class: &'static ClassInfo,
        wire_name: impl Into<String>,
        factory: impl Fn() -> Result<ObjectRef, ObjectError> + Send + Sync + 'static,
    ) -> Result<(), AliasError> {
        let wire_name = wire_name.into();

        if let Some(existing) = self.classes.get(&wire_name)
            && existing.class.path != class.path
        {
            return Err(AliasError::AlreadyRegistered {
                wire_name,
                existing: existing.class.path,
            });
        }

        self.wire_names.insert(class.path, wire_name.clone());
        self.classes.insert(
            wire_name,
            RegisteredClass {
                class,
                factory: Arc::new(factory),
            },
        );

        Ok(())
    }

    /// Install an alias specialization. Later registrations take priority
    /// over earlier ones; plain `EntityAlias` is the fallback.
    pub fn register_alias_type(
        &mut self,
        predicate: impl Fn(&ClassInfo) -> bool + Send + Sync + 'static,
        factory: impl Fn(&'static ClassInfo) -> Result<Arc<dyn ClassAlias>, AliasError>
        + Send
        + Sync
        + 'static,
    ) {
        self.alias_types
            .push((Arc::new(predicate), Arc::new(factory)));
    }

    /// Return the compiled alias for `class`, compiling it on first use.
    pub fn lookup_alias(&self, class: &'static ClassInfo) -> Result<Arc<dyn ClassAlias>, AliasError> {
        if let Some(alias) = self.compiled.read().get(class.path) {
            return Ok(alias.clone());
        }

        let alias = self.compile(class)?;
        let mut compiled = self.compiled.write();
        let alias = compiled.entry(class.path).or_insert(alias);

        Ok(alias.clone())
    }

    #[must_use]
    pub fn wire_name(&self, class: &ClassInfo) -> Option<&str> {
        self.wire_names.get(class.path).map(String::as_str)
    }

    #[must_use]
    pub fn class_for(&self, wire_name: &str) -> Option<&'static ClassInfo> {
        self.classes.get(wire_name).map(|registered| registered.class)
    }

    /// Build an empty object for `wire_name`. Unknown names produce an
    /// anonymous record that remembers the name.
    pub fn instantiate(&self, wire_name: Option<&str>) -> Result<ObjectRef, ObjectError> {
        match wire_name.and_then(|name| self.classes.get(name)) {
            Some(registered) => (registered.factory)(),
            None => Ok(Record::anonymous(wire_name.map(str::to_string)).into_ref()),
        }
    }

    fn compile(&self, class: &'static ClassInfo) -> Result<Arc<dyn ClassAlias>, AliasError> {
        match self
            .alias_types
            .iter()
            .rev()
            .find(|(predicate, _)| predicate(class))
        {
            Some((_, factory)) => factory(class),
            None => Ok(Arc::new(EntityAlias::compile(class))),
        }
    }
}

impl fmt::Debug for AliasRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliasRegistry")
            .field("wire_names", &self.wire_names)
            .field("alias_types", &self.alias_types.len())
            .field("compiled", &self.compiled.read().len())
            .finish()
    }
}
