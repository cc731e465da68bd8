//! Service dispatch: target resolution, invocation and fault conversion.
//!
//! Every failure short of an interrupt is recovered here and returned to
//! the caller as an `ERROR` response carrying a `Fault` or `ErrorMessage`.

mod error;
mod fault;
mod registry;
mod service;


use crate::{
    config::GatewayConfig,
    messaging::{self, Message},
    remoting::{
        CREDENTIALS_HEADER, Envelope, Request, RequestProcessor, Response, WireEnvelope,
        response_target,
    },
};
use flexgate_core::{
    codec::Codec,
    object::Record,
    orm,
    serialize::{self, deserialize_bounded},
    value::Value,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

// re-exports
pub use error::{GatewayError, Interrupted};
pub use fault::{FAULT, FAULT_WIRE_NAME, Fault, build_fault, format_trace};
pub use registry::{
    Authenticator, PRIVATE_PREFIX, ServiceId, ServiceRegistry, ServiceRequest, ServiceWrapper,
    split_target,
};
pub use service::{FnService, Frame, Service, ServiceError};

///
/// Gateway
///
/// Owns the codec and the service registry.
/// Built once at startup; request handling only needs `&self`.
///

#[derive(Debug)]
pub struct Gateway {
    config: GatewayConfig,
    codec: Codec,
    services: ServiceRegistry,
}

impl Gateway {
    /// Gateway with the message classes, the fault class and the ORM
    /// extension wired into its codec.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut codec = Codec::new();
        messaging::register(&mut codec.aliases)?;
        codec
            .aliases
            .register_class(&FAULT, FAULT_WIRE_NAME, || Ok(Record::new(&FAULT).into_ref()))?;
        orm::install(&mut codec.aliases, &mut codec.encoder);

        info!(debug = config.debug, "gateway ready");

        Ok(Self {
            config,
            codec,
            services: ServiceRegistry::new(),
        })
    }

    /// Gateway pre-loaded with `(name, service)` pairs.
    pub fn with_services<I, S>(config: GatewayConfig, services: I) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = (S, Arc<dyn Service>)>,
        S: AsRef<str>,
    {
        let gateway = Self::new(config)?;
        for (name, service) in services {
            gateway.add_service(service, Some(name.as_ref()))?;
        }

        Ok(gateway)
    }

    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    #[must_use]
    pub const fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Mutable codec for extra class registrations before serving.
    pub const fn codec_mut(&mut self) -> &mut Codec {
        &mut self.codec
    }

    #[must_use]
    pub const fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    pub fn add_service(
        &self,
        service: Arc<dyn Service>,
        name: Option<&str>,
    ) -> Result<String, GatewayError> {
        self.services.add(service, name, None)
    }

    pub fn add_service_with_authenticator(
        &self,
        service: Arc<dyn Service>,
        name: Option<&str>,
        authenticator: impl Fn(Option<&str>, Option<&str>) -> bool + Send + Sync + 'static,
    ) -> Result<String, GatewayError> {
        self.services
            .add(service, name, Some(Arc::new(authenticator)))
    }

    pub fn remove_service<'a>(
        &self,
        id: impl Into<ServiceId<'a>>,
    ) -> Result<ServiceWrapper, GatewayError> {
        self.services.remove(id)
    }

    /// Resolve `target` for `request`.
    pub fn get_service_request<'a>(
        &self,
        request: &'a Request,
        target: &str,
    ) -> Result<ServiceRequest<'a>, GatewayError> {
        let (service, method) = self.services.resolve(target)?;

        Ok(ServiceRequest::new(request, service, method))
    }

    #[must_use]
    pub fn build_fault(&self, err: &GatewayError) -> Fault {
        build_fault(err, self.config.debug)
    }

    /// Process one request. Only an interrupt escapes; every other failure
    /// becomes an `ERROR` response.
    pub fn process_request(&self, request: &Request) -> Result<Response, Interrupted> {
        match self.dispatch(request) {
            Ok(response) => Ok(response),
            Err(GatewayError::Interrupted(interrupted)) => Err(interrupted),
            Err(err) => {
                warn!(target = %request.target, code = err.code(), "request failed: {err}");

                Ok(Response::error(
                    request.target.clone(),
                    self.build_fault(&err).to_value(),
                ))
            }
        }
    }

    /// Process every request of `envelope` in order. Responses are keyed by
    /// each request's response id.
    pub fn get_response(&self, envelope: &Envelope) -> Result<Envelope, Interrupted> {
        let mut reply = Envelope::new();

        for request in &envelope.requests {
            let mut response = self.process_request(&envelope.scoped(request))?;
            response.target = response_target(&request.response_id, response.status);
            reply.responses.push(response);
        }

        Ok(reply)
    }

    /// Decode a serialized envelope, process it and serialize the reply.
    pub fn handle_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>, GatewayError> {
        let wire: WireEnvelope = deserialize_bounded(bytes, self.config.max_request_bytes)?;
        let envelope = Envelope::from_wire(&wire, &self.codec)?;
        debug!(requests = envelope.requests.len(), "envelope received");

        let reply = self.get_response(&envelope)?.to_wire(&self.codec)?;

        Ok(serialize::serialize(&reply)?)
    }

    /// Resolve, authenticate and invoke `target` on behalf of `request`.
    pub(crate) fn call(
        &self,
        request: &Request,
        target: &str,
        args: &[Value],
    ) -> Result<Value, GatewayError> {
        let service_request = self.get_service_request(request, target)?;
        let (user, password) = credentials(request)?;

        if !service_request.authenticate(user, password) {
            debug!(target = %target, "authentication failed");
            return Err(GatewayError::AuthenticationFailed);
        }

        service_request.invoke(args)
    }

    fn dispatch(&self, request: &Request) -> Result<Response, GatewayError> {
        credentials(request)?;

        if let Some(message) = request.body.first().and_then(Message::from_value) {
            return Ok(RequestProcessor::process(self, request, message)?);
        }

        let body = self.call(request, &request.target, &request.body)?;

        Ok(Response::ok(request.target.clone(), body))
    }
}

// Credentials travel as a `"user:password"` string; anything else set in
// the header is malformed.
fn credentials(request: &Request) -> Result<(Option<&str>, Option<&str>), GatewayError> {
    match request.header(CREDENTIALS_HEADER) {
        None => Ok((None, None)),
        Some(value) if value.is_absent() => Ok((None, None)),
        Some(Value::Text(text)) => Ok(match text.split_once(':') {
            Some((user, password)) => (Some(user), Some(password)),
            None => (Some(text.as_str()), None),
        }),
        Some(_) => Err(GatewayError::InvalidCredentials),
    }
}
