use crate::{
    gateway::{Gateway, GatewayError, Interrupted, format_trace},
    messaging::{AbstractMessage, AcknowledgeMessage, CommandOperation, ErrorMessage, Message},
    remoting::{Request, Response},
};
use flexgate_core::value::Value;
use tracing::{debug, warn};

///
/// RequestProcessor
///
/// Handles requests whose body is a Flex RemoteObject message: pings,
/// unsupported commands and remoting calls. Outcomes are returned as an
/// `AcknowledgeMessage` or, on failure, an `ErrorMessage`.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct RequestProcessor;

impl RequestProcessor {
    /// Process `message`, the first body element of `request`.
    pub fn process(
        gateway: &Gateway,
        request: &Request,
        message: Message,
    ) -> Result<Response, Interrupted> {
        match Self::body(gateway, request, &message) {
            Ok(ack) => Ok(Response::ok(
                request.target.clone(),
                Message::Acknowledge(ack).to_value(),
            )),
            Err(GatewayError::Interrupted(interrupted)) => Err(interrupted),
            Err(err) => {
                warn!(target = %request.target, code = err.code(), "remote object call failed: {err}");
                let error = generate_error(message.base(), &err);

                Ok(Response::error(
                    request.target.clone(),
                    Message::Error(error).to_value(),
                ))
            }
        }
    }

    fn body(
        gateway: &Gateway,
        request: &Request,
        message: &Message,
    ) -> Result<AcknowledgeMessage, GatewayError> {
        let mut ack = AcknowledgeMessage::generate(Some(message.base()));

        match message {
            Message::Command(command) => match command.operation {
                Some(CommandOperation::ClientPing) => {
                    debug!("ping");
                    ack.body = Some(Value::Bool(true));

                    Ok(ack)
                }
                Some(CommandOperation::Login) => Err(GatewayError::server_call_failed(
                    "Authorisation is not supported in RemoteObject",
                )),
                op => Err(GatewayError::server_call_failed(format!(
                    "Unknown command operation {}",
                    op.map_or_else(|| "None".to_string(), |op| op.to_string())
                ))),
            },
            Message::Remoting(remoting) => {
                let operation = remoting.operation.as_deref().unwrap_or_default();
                let service = remoting
                    .source
                    .as_deref()
                    .or(remoting.destination.as_deref())
                    .unwrap_or_default();
                let target = format!("{service}.{operation}");

                let result = gateway.call(request, &target, &remoting.arguments())?;
                ack.body = Some(result);

                Ok(ack)
            }
            _ => Err(GatewayError::server_call_failed(
                "Unknown RemoteObject request",
            )),
        }
    }
}

/// Build the `ErrorMessage` answering `request` after `err`.
///
/// The trace lines go to `extendedData` as a list and to `faultDetail` as
/// one joined string.
#[must_use]
pub fn generate_error(request: &AbstractMessage, err: &GatewayError) -> ErrorMessage {
    let trace = format_trace(err);

    ErrorMessage {
        base: AcknowledgeMessage::generate(Some(request)),
        extended_data: Some(Value::List(
            trace.iter().map(|line| Value::from(line.as_str())).collect(),
        )),
        fault_code: Some(err.code().to_string()),
        fault_detail: Some(trace.join("\n")),
        fault_string: Some(err.to_string()),
        root_cause: None,
    }
}
