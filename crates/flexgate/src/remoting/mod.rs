//! Remoting envelope: batched requests in, keyed responses out.

mod processor;
mod wire;


use derive_more::Display;
use flexgate_core::value::{Attributes, Value};
use serde::{Deserialize, Serialize};

// re-exports
pub use processor::{RequestProcessor, generate_error};
pub use wire::{WireEnvelope, WireRequest, WireResponse};

/// Envelope header carrying `"user:password"` credentials.
pub const CREDENTIALS_HEADER: &str = "Credentials";

/// Response id suffix for successful calls.
pub const ON_RESULT: &str = "onResult";

/// Response id suffix for failed calls.
pub const ON_STATUS: &str = "onStatus";

///
/// Status
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum Status {
    #[default]
    #[display("OK")]
    Ok,
    #[display("ERROR")]
    Error,
}

///
/// Request
///
/// One call inside an envelope: a dotted target, positional arguments and
/// the id the client expects its response under.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Request {
    pub target: String,
    pub response_id: String,
    pub body: Vec<Value>,
    pub headers: Attributes,
}

impl Request {
    pub fn new(target: impl Into<String>, body: Vec<Value>) -> Self {
        Self {
            target: target.into(),
            body,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_response_id(mut self, response_id: impl Into<String>) -> Self {
        self.response_id = response_id.into();
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers.get(name)
    }
}

///
/// Response
///

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub target: String,
    pub status: Status,
    pub body: Value,
}

impl Response {
    pub fn ok(target: impl Into<String>, body: Value) -> Self {
        Self {
            target: target.into(),
            status: Status::Ok,
            body,
        }
    }

    pub fn error(target: impl Into<String>, body: Value) -> Self {
        Self {
            target: target.into(),
            status: Status::Error,
            body,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

///
/// Envelope
///
/// Outer container of one round trip. Envelope headers apply to every
/// request it carries.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    pub headers: Attributes,
    pub requests: Vec<Request>,
    pub responses: Vec<Response>,
}

impl Envelope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_request(mut self, request: Request) -> Self {
        self.requests.push(request);
        self
    }

    /// Response by its `<response_id>/<suffix>` target.
    #[must_use]
    pub fn response(&self, target: &str) -> Option<&Response> {
        self.responses.iter().find(|response| response.target == target)
    }

    /// `request` with the envelope headers merged underneath its own.
    #[must_use]
    pub fn scoped(&self, request: &Request) -> Request {
        let mut scoped = request.clone();
        for (name, value) in &self.headers {
            scoped
                .headers
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }

        scoped
    }
}

/// Response target a client expects for `response_id`.
#[must_use]
pub fn response_target(response_id: &str, status: Status) -> String {
    let suffix = match status {
        Status::Ok => ON_RESULT,
        Status::Error => ON_STATUS,
    };

    format!("{response_id}/{suffix}")
}
