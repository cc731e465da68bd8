use flexgate_core::value::Value;
use std::{any, borrow::Cow, fmt};
use thiserror::Error as ThisError;

///
/// Service
///
/// Anything a remote client can call. A service is either directly callable
/// (`call`) or exposes named methods (`has_method` / `call_method`), or both.
///

pub trait Service: Send + Sync {
    /// Registration name used when none is given explicitly.
    fn name(&self) -> Option<String> {
        None
    }

    /// Type name used to derive a registration name as a last resort.
    fn type_name(&self) -> &'static str {
        any::type_name::<Self>()
    }

    fn call(&self, _args: &[Value]) -> Result<Value, ServiceError> {
        Err(crate::service_error!(
            "TypeError",
            "service {} is not callable",
            self.type_name()
        ))
    }

    fn has_method(&self, _name: &str) -> bool {
        false
    }

    fn call_method(&self, name: &str, _args: &[Value]) -> Result<Value, ServiceError> {
        Err(crate::service_error!(
            "NameError",
            "service {} has no method {name}",
            self.type_name()
        ))
    }
}

///
/// FnService
/// Directly callable service backed by a closure.
///

pub struct FnService<F> {
    name: Option<String>,
    f: F,
}

impl<F> FnService<F>
where
    F: Fn(&[Value]) -> Result<Value, ServiceError> + Send + Sync,
{
    pub const fn new(f: F) -> Self {
        Self { name: None, f }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<F> Service for FnService<F>
where
    F: Fn(&[Value]) -> Result<Value, ServiceError> + Send + Sync,
{
    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn type_name(&self) -> &'static str {
        any::type_name::<F>()
    }

    fn call(&self, args: &[Value]) -> Result<Value, ServiceError> {
        (self.f)(args)
    }
}

impl<F> fmt::Debug for FnService<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnService").field("name", &self.name).finish()
    }
}

///
/// Frame
///
/// One captured source location: file, line, enclosing function (module
/// path for macro captures) and the source text of the raising expression.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    pub file: String,
    pub line: u32,
    pub function: String,
    pub source: String,
}

impl Frame {
    pub fn new(
        file: impl Into<String>,
        line: u32,
        function: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  at {} ({}:{})\n    {}",
            self.function, self.file, self.line, self.source
        )
    }
}

///
/// ServiceError
///
/// Failure raised by a service. `kind` plays the role of an exception class
/// name; `code`, when set, overrides it as the wire fault code.
///

#[derive(Clone, Debug, ThisError)]
#[error("{message}")]
pub struct ServiceError {
    kind: Cow<'static, str>,
    message: String,
    code: Option<String>,
    frames: Vec<Frame>,
    interrupt: bool,
}

impl ServiceError {
    pub fn new(kind: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            code: None,
            frames: Vec::new(),
            interrupt: false,
        }
    }

    /// Shutdown request; propagates instead of becoming a fault.
    #[must_use]
    pub fn interrupt() -> Self {
        Self {
            interrupt: true,
            ..Self::new("Interrupted", "interrupted")
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub const fn is_interrupt(&self) -> bool {
        self.interrupt
    }
}

/// Build a `ServiceError` of the given kind, capturing the call site.
#[macro_export]
macro_rules! service_error {
    ($kind:expr, $($arg:tt)+) => {
        $crate::gateway::ServiceError::new($kind, format!($($arg)+)).with_frame(
            $crate::gateway::Frame::new(
                file!(),
                line!(),
                module_path!(),
                stringify!(service_error!($kind, $($arg)+)),
            ),
        )
    };
}
