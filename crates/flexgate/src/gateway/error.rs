use crate::gateway::{Frame, ServiceError};
use flexgate_core::{alias::AliasError, codec::CodecError, serialize::SerializeError};
use thiserror::Error as ThisError;

///
/// Interrupted
///
/// Shutdown signal raised from inside a service. Never converted into a
/// fault; it propagates out of request processing unchanged.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
#[error("request processing interrupted")]
pub struct Interrupted;

///
/// GatewayError
///
/// Every failure the dispatch boundary recovers from. `code()` is the wire
/// fault code clients match on.
///

#[derive(Debug, ThisError)]
pub enum GatewayError {
    #[error("Unknown service {0}")]
    UnknownService(String),

    #[error("Unknown method {member} on service {service}")]
    UnknownMember { service: String, member: String },

    #[error("Access to private member {member} of service {service} is forbidden")]
    ForbiddenMember { service: String, member: String },

    #[error("Unable to derive a service name from {0}")]
    UnnamedService(String),

    #[error("Service {0} is already registered")]
    DuplicateService(String),

    #[error("Service {0} not found")]
    ServiceNotFound(String),

    #[error("Invalid credentials object")]
    InvalidCredentials,

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("{0}")]
    ServerCallFailed(String),

    #[error(transparent)]
    Service(ServiceError),

    #[error(transparent)]
    Alias(#[from] AliasError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl GatewayError {
    pub const NAME_ERROR: &'static str = "NameError";
    pub const REMOTING_ERROR: &'static str = "RemotingError";
    pub const SERVER_CALL_FAILED: &'static str = "Server.Call.Failed";
    pub const AUTHENTICATION_ERROR: &'static str = "AuthenticationError";

    pub fn server_call_failed(message: impl Into<String>) -> Self {
        Self::ServerCallFailed(message.into())
    }

    /// Wire fault code: the declared code when there is one, else the kind.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::UnknownService(_)
            | Self::UnknownMember { .. }
            | Self::ForbiddenMember { .. }
            | Self::UnnamedService(_)
            | Self::DuplicateService(_)
            | Self::ServiceNotFound(_) => Self::NAME_ERROR,
            Self::InvalidCredentials
            | Self::Alias(_)
            | Self::Codec(_)
            | Self::Serialize(_) => Self::REMOTING_ERROR,
            Self::ServerCallFailed(_) => Self::SERVER_CALL_FAILED,
            Self::AuthenticationFailed => Self::AUTHENTICATION_ERROR,
            Self::Service(err) => err.code().unwrap_or_else(|| err.kind()),
            Self::Interrupted(_) => "Interrupted",
        }
    }

    /// Kind name used as the final trace line.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Service(err) => err.kind(),
            Self::ServerCallFailed(_) => "ServerCallFailed",
            _ => self.code(),
        }
    }

    /// Frames captured where the failure was raised.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        match self {
            Self::Service(err) => err.frames(),
            _ => &[],
        }
    }
}

impl From<ServiceError> for GatewayError {
    fn from(err: ServiceError) -> Self {
        if err.is_interrupt() {
            Self::Interrupted(Interrupted)
        } else {
            Self::Service(err)
        }
    }
}
