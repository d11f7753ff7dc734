//! Agent producers.
//!
//! A [`Producer`] turns one prompt into a finite, non-restartable stream of
//! [`AgentMessage`]s. The relay consumes the stream lazily and never looks
//! behind the trait. [`claude::ClaudeProducer`] is the implementation backed
//! by the Claude CLI.

pub mod claude;
mod message;
mod options;

use futures::stream::BoxStream;
use thiserror::Error;

use crate::shell::AgentExit;

pub use message::{AgentMessage, ContentBlock, ResultSummary};
pub use options::PromptOptions;

/// Stream of messages for one prompt. Ends after the first error.
pub type MessageStream = BoxStream<'static, Result<AgentMessage, ProducerError>>;

/// Failure inside a producer.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("Failed to spawn agent: {0}")]
    Spawn(String),

    #[error("Agent I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Agent {exit}: {stderr}")]
    Exited { exit: AgentExit, stderr: String },
}

/// Source of agent messages for a prompt.
pub trait Producer: Send + Sync {
    /// Start a prompt and return its message stream.
    fn open(&self, prompt: &str, options: &PromptOptions) -> Result<MessageStream, ProducerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exited_error_message() {
        let err = ProducerError::Exited {
            exit: AgentExit {
                code: 1,
                signal: None,
            },
            stderr: "invalid api key".to_string(),
        };
        assert_eq!(err.to_string(), "Agent exited with code 1: invalid api key");
    }

    #[test]
    fn io_error_converts() {
        let err: ProducerError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(err.to_string().starts_with("Agent I/O error"));
    }
}
