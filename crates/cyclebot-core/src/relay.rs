//! Relay engine: one `prompt` request in, notifications and one response out.
//!
//! For a valid request the relay opens the producer's message stream and, in
//! yield order, maps each message to an [`Event`] and sends it as a
//! `message` notification. When the stream ends it sends the final response:
//!
//! ```json
//! {"jsonrpc":"2.0","result":{"turn_count":2,"status":"completed"},"id":1}
//! ```
//!
//! A producer failure at any point ends the request with a `-32000` error
//! response. Notifications already sent stay sent. A failed send means the
//! peer is gone; the relay stops and reports [`RelayError::Disconnected`].

use std::fmt::Display;
use std::sync::Arc;

use futures::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::event::Event;
use crate::producer::{Producer, ProducerError, PromptOptions};
use crate::rpc::{self, ErrorObject, Notification, Request, RequestId, Response};
use crate::turn::TurnCounter;

/// Status reported in a successful prompt response.
pub const STATUS_COMPLETED: &str = "completed";

/// The connection went away while the relay was sending.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Connection closed: {0}")]
    Disconnected(String),
}

/// Validated `prompt` params.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptParams {
    pub content: String,
    pub options: PromptOptions,
}

impl PromptParams {
    /// Validate raw params. The error is the detail for an invalid-params response.
    pub fn from_params(params: Option<&Map<String, Value>>) -> Result<Self, &'static str> {
        let params = params.ok_or("'content' required")?;

        let content = params
            .get("content")
            .and_then(Value::as_str)
            .ok_or("'content' required")?
            .to_string();

        let options = match params.get("options") {
            None | Some(Value::Null) => PromptOptions::default(),
            Some(Value::Object(map)) => PromptOptions::from_map(map.clone()),
            Some(_) => return Err("'options' must be an object"),
        };

        Ok(Self { content, options })
    }
}

/// Why a prompt stopped before its stream completed.
enum Interrupted {
    Producer(ProducerError),
    Disconnected(RelayError),
}

/// Drives prompts through a producer.
pub struct Relay {
    producer: Arc<dyn Producer>,
    turns: TurnCounter,
}

impl Relay {
    pub fn new(producer: Arc<dyn Producer>) -> Self {
        Self {
            producer,
            turns: TurnCounter::new(),
        }
    }

    /// Handle one `prompt` request, writing all traffic to `sink`.
    ///
    /// Sends zero or more notifications followed by exactly one response,
    /// unless the sink fails, in which case nothing more is sent.
    pub async fn handle<S>(&mut self, request: Request, sink: &mut S) -> Result<(), RelayError>
    where
        S: Sink<String> + Unpin,
        S::Error: Display,
    {
        let id = request.id;
        let params = match PromptParams::from_params(request.params.as_ref()) {
            Ok(params) => params,
            Err(detail) => {
                log::warn!("Rejecting prompt {}: {}", describe(&id), detail);
                let response = Response::failure(id, ErrorObject::invalid_params(detail));
                return send(sink, &response).await;
            }
        };

        self.turns.reset();
        log::info!("Prompt {} started ({} chars)", describe(&id), params.content.len());

        let response = match self.drive(&params, sink).await {
            Ok(()) => {
                log::info!("Prompt {} completed after {} turns", describe(&id), self.turns.count());
                Response::success(
                    id,
                    json!({"turn_count": self.turns.count(), "status": STATUS_COMPLETED}),
                )
            }
            Err(Interrupted::Producer(e)) => {
                log::error!("Prompt {} failed: {}", describe(&id), e);
                Response::failure(id, ErrorObject::internal_error(e.to_string()))
            }
            Err(Interrupted::Disconnected(e)) => {
                log::info!("Prompt {} abandoned: {}", describe(&id), e);
                return Err(e);
            }
        };

        send(sink, &response).await
    }

    /// Stream every producer message to the sink as a notification.
    async fn drive<S>(&mut self, params: &PromptParams, sink: &mut S) -> Result<(), Interrupted>
    where
        S: Sink<String> + Unpin,
        S::Error: Display,
    {
        let mut messages = self
            .producer
            .open(&params.content, &params.options)
            .map_err(Interrupted::Producer)?;

        while let Some(item) = messages.next().await {
            let message = item.map_err(Interrupted::Producer)?;
            let kind = message.kind();
            let event = Event::from_message(message, &mut self.turns);
            log::debug!("Relaying {} message as {} event", kind, event.kind());
            send(sink, &Notification::message(&event))
                .await
                .map_err(Interrupted::Disconnected)?;
        }

        Ok(())
    }
}

/// Encode and send one envelope, flushing immediately.
pub(crate) async fn send<S, T>(sink: &mut S, message: &T) -> Result<(), RelayError>
where
    S: Sink<String> + Unpin,
    S::Error: Display,
    T: Serialize,
{
    sink.send(rpc::encode(message))
        .await
        .map_err(|e| RelayError::Disconnected(e.to_string()))
}

fn describe(id: &Option<RequestId>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "<no id>".to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
