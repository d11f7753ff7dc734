//! JSON-RPC 2.0 envelope types and codec.
//!
//! Inbound frames are decoded into a [`Request`]. Outbound traffic is either a
//! [`Response`] (exactly one per request) or a [`Notification`] (streamed
//! agent events, never answered).
//!
//! # Example
//!
//! ```rust
//! use cyclebot_core::rpc::{self, ErrorObject, Response};
//!
//! let request = rpc::decode(r#"{"jsonrpc":"2.0","method":"prompt","id":7}"#).unwrap();
//! assert_eq!(request.method, "prompt");
//!
//! let response = Response::failure(request.id, ErrorObject::invalid_params("'content' required"));
//! let wire = rpc::encode(&response);
//! assert!(wire.contains("-32602"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::event::Event;

/// Protocol version written into every outbound envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method name of the only request this server answers.
pub const PROMPT_METHOD: &str = "prompt";

/// Method name used for streamed agent events.
pub const MESSAGE_METHOD: &str = "message";

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

/// A request identifier: either an integer or a string.
///
/// Integers above `i64::MAX` land in `Unsigned` so any JSON integer id
/// round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    Unsigned(u64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::String(id.to_string())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Unsigned(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// A client-issued request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl Request {
    /// Build a request with the current protocol version.
    pub fn new(method: impl Into<String>, params: Option<Map<String, Value>>, id: Option<RequestId>) -> Self {
        Self {
            jsonrpc: default_version(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// The closed set of error codes this server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32000,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

/// The `error` member of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    pub fn new(code: ErrorCode, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data,
        }
    }

    /// Inbound frame could not be decoded. `detail` goes into `data`.
    pub fn parse_error(detail: impl Into<String>) -> Self {
        let code = ErrorCode::ParseError;
        Self::new(code, code.message(), Some(Value::String(detail.into())))
    }

    pub fn method_not_found(method: &str) -> Self {
        let code = ErrorCode::MethodNotFound;
        Self::new(code, code.message(), Some(Value::String(method.to_string())))
    }

    /// Params failed validation. `detail` is appended to the message.
    pub fn invalid_params(detail: &str) -> Self {
        let code = ErrorCode::InvalidParams;
        Self::new(code, format!("{}: {}", code.message(), detail), None)
    }

    /// The producer failed. `detail` describes the failure and goes into `data`.
    pub fn internal_error(detail: impl Into<String>) -> Self {
        let code = ErrorCode::InternalError;
        Self::new(code, code.message(), Some(Value::String(detail.into())))
    }
}

/// A server response. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
    /// Serialized as `null` when the originating id is unknown.
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl Response {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: default_version(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Option<RequestId>, error: ErrorObject) -> Self {
        Self {
            jsonrpc: default_version(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// A server-issued notification carrying one agent event.
#[derive(Debug, Clone, Serialize)]
pub struct Notification<'a> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: &'a Event,
}

impl<'a> Notification<'a> {
    /// Wrap an event as a `message` notification.
    pub fn message(event: &'a Event) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: MESSAGE_METHOD,
            params: event,
        }
    }
}

/// Failure to decode an inbound frame.
///
/// Carries whatever `id` could be recovered from the raw payload so the
/// error response can still be correlated.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error: {message}")]
pub struct DecodeError {
    pub message: String,
    pub id: Option<RequestId>,
}

impl DecodeError {
    /// The `ParseError` response for this failure.
    pub fn into_response(self) -> Response {
        Response::failure(self.id, ErrorObject::parse_error(self.message))
    }
}

/// Decode one inbound text frame into a request.
pub fn decode(raw: &str) -> Result<Request, DecodeError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| DecodeError {
        message: e.to_string(),
        id: None,
    })?;

    let id = recover_id(&value);
    serde_json::from_value(value).map_err(|e| DecodeError {
        message: e.to_string(),
        id,
    })
}

/// Pull a usable `id` out of a payload that failed full validation.
fn recover_id(value: &Value) -> Option<RequestId> {
    match value.get("id")? {
        Value::Number(n) => n
            .as_i64()
            .map(RequestId::Number)
            .or_else(|| n.as_u64().map(RequestId::Unsigned)),
        Value::String(s) => Some(RequestId::String(s.clone())),
        _ => None,
    }
}

/// Decode a response frame (client side).
pub fn decode_response(raw: &str) -> Result<Response, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Encode an outbound envelope as wire text.
///
/// Envelope types only hold strings, numbers and JSON values, so serialization
/// cannot fail in practice. If it ever does, a bare internal error response is
/// written instead so the peer still gets a well-formed frame.
pub fn encode<T: Serialize>(message: &T) -> String {
    match serde_json::to_string(message) {
        Ok(text) => text,
        Err(e) => {
            log::error!("Failed to encode outbound message: {}", e);
            r#"{"jsonrpc":"2.0","error":{"code":-32000,"message":"Internal error"},"id":null}"#
                .to_string()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
