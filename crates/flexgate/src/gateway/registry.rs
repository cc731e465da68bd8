use crate::{
    gateway::{GatewayError, Service},
    remoting::Request,
};
use flexgate_core::value::Value;
use parking_lot::RwLock;
use std::{collections::BTreeMap, fmt, ptr, sync::Arc};
use tracing::{debug, info};

/// Checks a `(user, password)` pair sent with a request.
pub type Authenticator = Arc<dyn Fn(Option<&str>, Option<&str>) -> bool + Send + Sync>;

/// Method names starting with this prefix are never callable remotely.
pub const PRIVATE_PREFIX: char = '_';

///
/// ServiceWrapper
///
/// A registered service together with its optional authenticator.
///

#[derive(Clone)]
pub struct ServiceWrapper {
    name: String,
    service: Arc<dyn Service>,
    authenticator: Option<Authenticator>,
}

impl ServiceWrapper {
    pub fn new(
        name: impl Into<String>,
        service: Arc<dyn Service>,
        authenticator: Option<Authenticator>,
    ) -> Self {
        Self {
            name: name.into(),
            service,
            authenticator,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn service(&self) -> &Arc<dyn Service> {
        &self.service
    }

    #[must_use]
    pub fn has_authenticator(&self) -> bool {
        self.authenticator.is_some()
    }

    /// True when `service` is the instance this wrapper holds.
    #[must_use]
    pub fn wraps(&self, service: &Arc<dyn Service>) -> bool {
        ptr::addr_eq(Arc::as_ptr(&self.service), Arc::as_ptr(service))
    }

    /// Always true when no authenticator is installed.
    #[must_use]
    pub fn authenticate(&self, user: Option<&str>, password: Option<&str>) -> bool {
        self.authenticator
            .as_ref()
            .is_none_or(|authenticator| authenticator(user, password))
    }

    /// Invoke the service itself (`method == None`) or one of its methods.
    pub fn call(&self, method: Option<&str>, args: &[Value]) -> Result<Value, GatewayError> {
        let Some(method) = method else {
            return Ok(self.service.call(args)?);
        };

        if method.starts_with(PRIVATE_PREFIX) {
            return Err(GatewayError::ForbiddenMember {
                service: self.name.clone(),
                member: method.to_string(),
            });
        }
        if !self.service.has_method(method) {
            return Err(GatewayError::UnknownMember {
                service: self.name.clone(),
                member: method.to_string(),
            });
        }

        Ok(self.service.call_method(method, args)?)
    }
}

// Identity of the wrapped service only.
impl PartialEq for ServiceWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.wraps(&other.service)
    }
}

impl fmt::Debug for ServiceWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceWrapper")
            .field("name", &self.name)
            .field("service", &self.service.type_name())
            .field("authenticator", &self.authenticator.is_some())
            .finish()
    }
}

///
/// ServiceRequest
///
/// A resolved target: the request it came from, the service wrapper and the
/// method to call (`None` calls the service itself).
///

#[derive(Clone, Debug)]
pub struct ServiceRequest<'a> {
    pub request: &'a Request,
    pub service: ServiceWrapper,
    pub method: Option<String>,
}

impl<'a> ServiceRequest<'a> {
    pub const fn new(request: &'a Request, service: ServiceWrapper, method: Option<String>) -> Self {
        Self {
            request,
            service,
            method,
        }
    }

    #[must_use]
    pub fn authenticate(&self, user: Option<&str>, password: Option<&str>) -> bool {
        self.service.authenticate(user, password)
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, GatewayError> {
        self.service.call(self.method.as_deref(), args)
    }
}

///
/// ServiceId
/// Any of the three ways a registered service can be named for removal.
///

#[derive(Clone, Copy)]
pub enum ServiceId<'a> {
    Name(&'a str),
    Service(&'a Arc<dyn Service>),
    Wrapper(&'a ServiceWrapper),
}

impl<'a> From<&'a str> for ServiceId<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a Arc<dyn Service>> for ServiceId<'a> {
    fn from(service: &'a Arc<dyn Service>) -> Self {
        Self::Service(service)
    }
}

impl<'a> From<&'a ServiceWrapper> for ServiceId<'a> {
    fn from(wrapper: &'a ServiceWrapper) -> Self {
        Self::Wrapper(wrapper)
    }
}

impl fmt::Display for ServiceId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Service(service) => f.write_str(service.type_name()),
            Self::Wrapper(wrapper) => f.write_str(wrapper.name()),
        }
    }
}

///
/// ServiceRegistry
///
/// Named services reachable through target strings. Lookups take a read
/// lock; registration and removal take the write lock.
///

#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<BTreeMap<String, ServiceWrapper>>,
}

impl ServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` under `name`, or under a name derived from the
    /// service when `name` is `None`. Returns the name used.
    pub fn add(
        &self,
        service: Arc<dyn Service>,
        name: Option<&str>,
        authenticator: Option<Authenticator>,
    ) -> Result<String, GatewayError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => derive_name(service.as_ref())?,
        };

        let mut services = self.services.write();
        if services.contains_key(&name) {
            return Err(GatewayError::DuplicateService(name));
        }

        services.insert(
            name.clone(),
            ServiceWrapper::new(name.clone(), service, authenticator),
        );
        info!(service = %name, "service registered");

        Ok(name)
    }

    /// Remove the service matching `id` by name, by instance or by wrapper.
    pub fn remove<'a>(&self, id: impl Into<ServiceId<'a>>) -> Result<ServiceWrapper, GatewayError> {
        let id = id.into();
        let mut services = self.services.write();

        let name = services
            .iter()
            .find(|(name, wrapper)| match id {
                ServiceId::Name(wanted) => name.as_str() == wanted,
                ServiceId::Service(service) => wrapper.wraps(service),
                ServiceId::Wrapper(other) => wrapper.wraps(other.service()),
            })
            .map(|(name, _)| name.clone())
            .ok_or_else(|| GatewayError::ServiceNotFound(id.to_string()))?;

        let removed = services
            .remove(&name)
            .ok_or_else(|| GatewayError::ServiceNotFound(name.clone()))?;
        info!(service = %name, "service removed");

        Ok(removed)
    }

    #[must_use]
    pub fn contains<'a>(&self, id: impl Into<ServiceId<'a>>) -> bool {
        let id = id.into();
        let services = self.services.read();

        match id {
            ServiceId::Name(name) => services.contains_key(name),
            ServiceId::Service(service) => services.values().any(|w| w.wraps(service)),
            ServiceId::Wrapper(wrapper) => services.values().any(|w| w == wrapper),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<ServiceWrapper> {
        self.services.read().get(name).cloned()
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.services.read().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }

    /// Resolve `target` into the wrapper and method it names. An exact
    /// registered name wins over a split on the first `.`.
    pub fn resolve(&self, target: &str) -> Result<(ServiceWrapper, Option<String>), GatewayError> {
        if let Some(wrapper) = self.get(target) {
            return Ok((wrapper, None));
        }

        let (service, method) = split_target(target);

        let Some(wrapper) = self.get(service) else {
            debug!(target = %target, "unknown service");
            return Err(GatewayError::UnknownService(target.to_string()));
        };

        Ok((wrapper, method.map(str::to_string)))
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.names())
            .finish()
    }
}

/// Split a target on its first `.` into service name and method.
#[must_use]
pub fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('.') {
        Some((service, method)) => (service, Some(method)),
        None => (target, None),
    }
}

// Explicit name, else the last path segment of the type name. Closures have
// no usable type name.
fn derive_name(service: &dyn Service) -> Result<String, GatewayError> {
    if let Some(name) = service.name() {
        return Ok(name);
    }

    let type_name = service.type_name();
    let base = type_name.split('<').next().unwrap_or(type_name);
    let short = base.rsplit("::").next().unwrap_or(base);

    if short.is_empty() || type_name.contains("{{closure}}") {
        return Err(GatewayError::UnnamedService(type_name.to_string()));
    }

    Ok(short.to_string())
}
