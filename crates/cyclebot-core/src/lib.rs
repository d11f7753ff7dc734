//! # cyclebot-core
//!
//! Core of the Cyclebot relay: streams an AI agent's messages to a client as
//! JSON-RPC 2.0 notifications over a duplex text connection.
//!
//! This crate has no HTTP types. The transport hands a [`Session`] a stream of
//! inbound text frames and a sink for outbound ones.
//!
//! ## Key Concepts
//!
//! - **Producer**: Turns a prompt into a stream of agent messages
//! - **Event**: Wire form of one agent message, sent as a `message` notification
//! - **Turn**: An assistant reply or a final result; counted per prompt
//! - **Session**: One connection, handling requests strictly in order

pub mod event;
pub mod producer;
pub mod relay;
pub mod rpc;
pub mod session;
pub mod shell;
pub mod spawn;
pub mod transcript;
pub mod turn;

// Re-export commonly used types
pub use event::Event;
pub use producer::claude::{ClaudeProducer, ClaudeProducerConfig};
pub use producer::{Producer, ProducerError, PromptOptions};
pub use rpc::{Request, Response};
pub use session::{Session, SessionSummary};
pub use turn::TurnCounter;
