//! Per-connection session loop.
//!
//! A [`Session`] owns one connection's relay. It reads text frames one at a
//! time, decodes them, and either hands a `prompt` to the relay or answers
//! with an error response. The next frame is not read until the current
//! request has been fully answered.

use std::fmt::Display;
use std::sync::Arc;

use futures::{pin_mut, Sink, Stream, StreamExt};

use crate::producer::Producer;
use crate::relay::{self, Relay};
use crate::rpc::{self, ErrorObject, Request, Response, PROMPT_METHOD};

/// What a finished session did, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Frames handled, including ones answered with an error.
    pub requests: u64,
}

/// One connection's state.
pub struct Session {
    relay: Relay,
    requests: u64,
}

impl Session {
    pub fn new(producer: Arc<dyn Producer>) -> Self {
        Self {
            relay: Relay::new(producer),
            requests: 0,
        }
    }

    /// Serve the connection until the peer goes away.
    ///
    /// Ends when `inbound` ends or fails, or when a send on `outbound` fails.
    pub async fn run<I, E, O>(mut self, inbound: I, outbound: O) -> SessionSummary
    where
        I: Stream<Item = Result<String, E>>,
        E: Display,
        O: Sink<String>,
        O::Error: Display,
    {
        pin_mut!(inbound);
        pin_mut!(outbound);

        while let Some(frame) = inbound.next().await {
            let text = match frame {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Connection error: {}", e);
                    break;
                }
            };

            self.requests += 1;
            if self.dispatch(&text, &mut outbound).await.is_err() {
                log::debug!("Peer disconnected mid-request");
                break;
            }
        }

        SessionSummary {
            requests: self.requests,
        }
    }

    async fn dispatch<S>(&mut self, text: &str, sink: &mut S) -> Result<(), relay::RelayError>
    where
        S: Sink<String> + Unpin,
        S::Error: Display,
    {
        let request = match rpc::decode(text) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("{}", e);
                return relay::send(sink, &e.into_response()).await;
            }
        };

        match request.method.as_str() {
            PROMPT_METHOD => self.relay.handle(request, sink).await,
            other => {
                log::warn!("Unknown method '{}'", other);
                let response = unknown_method(request);
                relay::send(sink, &response).await
            }
        }
    }
}

fn unknown_method(request: Request) -> Response {
    Response::failure(request.id, ErrorObject::method_not_found(&request.method))
}

// ============================================================================
// TESTS
// ============================================================================
