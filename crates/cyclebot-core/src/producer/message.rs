//! Messages yielded by a producer, before they are mapped to wire events.
//!
//! These mirror what an agent backend reports: assistant replies, system
//! status, user-side tool results and a final result record. Anything a
//! backend emits that does not fit lands in [`AgentMessage::Other`].

use serde::Deserialize;
use serde_json::{Map, Value};

/// One message from the agent.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentMessage {
    /// An assistant reply made of content blocks.
    Assistant { content: Vec<ContentBlock> },

    /// Backend status (e.g. the `init` record with model, cwd and tools).
    ///
    /// `data` is the whole raw record; keys are backend-specific.
    System { data: Map<String, Value> },

    /// A user-side message, usually tool results fed back to the model.
    User { content: Vec<ContentBlock> },

    /// Final accounting for the prompt.
    Result(ResultSummary),

    /// Anything else. Kept so the relay can still report it.
    Other { raw: Value },
}

/// Final accounting record emitted when the agent finishes.
///
/// Every field is optional on input so any `result` record still counts as a
/// turn; missing counters read as zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResultSummary {
    pub num_turns: u64,
    pub duration_ms: u64,
    pub duration_api_ms: u64,
    pub is_error: bool,
    pub total_cost_usd: Option<f64>,
}

/// A content block inside an assistant or user message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
    },
    ToolUse {
        #[serde(default)]
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        #[serde(default)]
        tool_use_id: String,
        /// A string, an array of blocks, or absent.
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: Option<bool>,
    },
    #[serde(other)]
    Other,
}

impl AgentMessage {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Assistant { .. } => "assistant",
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Result(_) => "result",
            Self::Other { .. } => "other",
        }
    }
}
