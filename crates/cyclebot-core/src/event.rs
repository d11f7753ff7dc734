//! Wire events relayed to the client as `message` notifications.
//!
//! Each producer message maps to exactly one [`Event`]. Messages that do not
//! fit a known shape become [`Event::Unknown`] so nothing is silently dropped.
//!
//! On the wire an event looks like:
//!
//! ```json
//! {"type": "assistant", "data": {"turn": 1, "content": [{"type": "text", "text": "hi!"}]}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::producer::{AgentMessage, ContentBlock, ResultSummary};
use crate::turn::TurnCounter;

/// A block in an assistant event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantBlock {
    Text { text: String },
    ToolUse { name: String, input: Value },
}

/// A block in a user event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserBlock {
    Text { text: String },
    ToolResult { content: Value, is_error: bool },
}

/// An event relayed to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    Assistant {
        /// Turn count after this reply.
        turn: u64,
        content: Vec<AssistantBlock>,
    },
    System {
        model: Option<String>,
        session_id: Option<String>,
        cwd: Option<String>,
        tools: Option<Vec<String>>,
        permission_mode: Option<String>,
    },
    User {
        content: Vec<UserBlock>,
    },
    Result {
        num_turns: u64,
        duration_api_ms: u64,
        duration_ms: u64,
        is_error: bool,
        total_cost_usd: Option<f64>,
    },
    Unknown {},
}

impl Event {
    /// Map a producer message to its wire event.
    ///
    /// Assistant and result messages advance `turns` before the event is
    /// built, so an assistant event carries the post-increment count.
    pub fn from_message(message: AgentMessage, turns: &mut TurnCounter) -> Self {
        match message {
            AgentMessage::Assistant { content } => Self::Assistant {
                turn: turns.increment(),
                content: content.into_iter().filter_map(assistant_block).collect(),
            },
            AgentMessage::System { data, .. } => system_event(&data),
            AgentMessage::User { content } => Self::User {
                content: content.into_iter().filter_map(user_block).collect(),
            },
            AgentMessage::Result(summary) => {
                turns.increment();
                result_event(summary)
            }
            AgentMessage::Other { .. } => Self::Unknown {},
        }
    }

    /// The `type` tag used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Assistant { .. } => "assistant",
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Result { .. } => "result",
            Self::Unknown {} => "unknown",
        }
    }
}

fn assistant_block(block: ContentBlock) -> Option<AssistantBlock> {
    match block {
        ContentBlock::Text { text } => Some(AssistantBlock::Text { text }),
        ContentBlock::ToolUse { name, input, .. } => Some(AssistantBlock::ToolUse { name, input }),
        ContentBlock::Thinking { .. } | ContentBlock::ToolResult { .. } | ContentBlock::Other => None,
    }
}

fn user_block(block: ContentBlock) -> Option<UserBlock> {
    match block {
        ContentBlock::Text { text } => Some(UserBlock::Text { text }),
        ContentBlock::ToolResult {
            content, is_error, ..
        } => Some(UserBlock::ToolResult {
            content,
            is_error: is_error.unwrap_or(false),
        }),
        ContentBlock::Thinking { .. } | ContentBlock::ToolUse { .. } | ContentBlock::Other => None,
    }
}

fn system_event(data: &Map<String, Value>) -> Event {
    let string = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);
    let tools = data.get("tools").and_then(Value::as_array).map(|tools| {
        tools
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    });

    Event::System {
        model: string("model"),
        session_id: string("session_id"),
        cwd: string("cwd"),
        tools,
        permission_mode: string("permissionMode"),
    }
}

fn result_event(summary: ResultSummary) -> Event {
    Event::Result {
        num_turns: summary.num_turns,
        duration_api_ms: summary.duration_api_ms,
        duration_ms: summary.duration_ms,
        is_error: summary.is_error,
        total_cost_usd: summary.total_cost_usd,
    }
}

// ============================================================================
// TESTS
// ============================================================================
