//! Flex RemoteObject gateway: message types, envelopes, service dispatch
//! and fault conversion on top of `flexgate-core`.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod gateway;
pub mod messaging;
pub mod obs;
pub mod remoting;

// re-exports
pub use flexgate_core;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::{Config, GatewayConfig},
        gateway::{FnService, Gateway, GatewayError, Service, ServiceError},
        messaging::{
            AcknowledgeMessage, CommandMessage, CommandOperation, ErrorMessage, Message,
            RemotingMessage,
        },
        remoting::{Envelope, Request, Response, Status},
    };
    pub use flexgate_core::prelude::*;
}
