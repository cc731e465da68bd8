use crate::remoting::{Envelope, Request, Response, Status};
use flexgate_core::{
    codec::{Codec, CodecError, DecodeContext, EncodeContext},
    value::{Attributes, WireValue},
};
use serde::{Deserialize, Serialize};

///
/// WireEnvelope
/// Serializable form of an `Envelope`.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct WireEnvelope {
    pub headers: Vec<(String, WireValue)>,
    pub requests: Vec<WireRequest>,
    pub responses: Vec<WireResponse>,
}

///
/// WireRequest
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WireRequest {
    pub target: String,
    pub response_id: String,
    pub body: Vec<WireValue>,
}

///
/// WireResponse
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WireResponse {
    pub target: String,
    pub status: Status,
    pub body: WireValue,
}

impl Envelope {
    /// Decode a wire envelope. Each header and each request body is its own
    /// decode session.
    pub fn from_wire(wire: &WireEnvelope, codec: &Codec) -> Result<Self, CodecError> {
        let headers = wire
            .headers
            .iter()
            .map(|(name, value)| Ok((name.clone(), codec.decode(value)?)))
            .collect::<Result<Attributes, CodecError>>()?;

        let requests = wire
            .requests
            .iter()
            .map(|request| {
                let mut ctx = DecodeContext::new();
                let body = request
                    .body
                    .iter()
                    .map(|arg| codec.decode_with(arg, &mut ctx))
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Request::new(request.target.clone(), body)
                    .with_response_id(request.response_id.clone()))
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        let responses = wire
            .responses
            .iter()
            .map(|response| {
                Ok(Response {
                    target: response.target.clone(),
                    status: response.status,
                    body: codec.decode(&response.body)?,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        Ok(Self {
            headers,
            requests,
            responses,
        })
    }

    /// Encode for the wire. The arguments of one request share a session;
    /// every response body is a fresh one.
    pub fn to_wire(&self, codec: &Codec) -> Result<WireEnvelope, CodecError> {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| Ok((name.clone(), codec.encode(value)?)))
            .collect::<Result<Vec<_>, CodecError>>()?;

        let requests = self
            .requests
            .iter()
            .map(|request| {
                let mut ctx = EncodeContext::new();

                Ok(WireRequest {
                    target: request.target.clone(),
                    response_id: request.response_id.clone(),
                    body: request
                        .body
                        .iter()
                        .map(|arg| codec.encode_with(arg, &mut ctx))
                        .collect::<Result<Vec<_>, _>>()?,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        let responses = self
            .responses
            .iter()
            .map(|response| {
                Ok(WireResponse {
                    target: response.target.clone(),
                    status: response.status,
                    body: codec.encode(&response.body)?,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        Ok(WireEnvelope {
            headers,
            requests,
            responses,
        })
    }
}
