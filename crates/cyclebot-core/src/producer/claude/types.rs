//! Claude `stream-json` line types.
//!
//! With `--output-format stream-json` the CLI prints one JSON object per line:
//!
//! ```json
//! {"type":"system","subtype":"init","session_id":"sess-1","model":"claude-sonnet-4","cwd":"/work","tools":["Bash"],"permissionMode":"default"}
//! {"type":"assistant","session_id":"sess-1","message":{"role":"assistant","content":[{"type":"text","text":"Hi!"}]}}
//! {"type":"result","subtype":"success","num_turns":1,"duration_ms":2100,"duration_api_ms":1800,"is_error":false,"total_cost_usd":0.004}
//! ```
//!
//! Only the envelope of assistant/user lines is typed here; system and result
//! lines are read straight from the JSON object by the parser.

use serde::Deserialize;

use crate::producer::ContentBlock;

/// An assistant or user line.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeStreamEvent {
    /// "assistant" or "user".
    #[serde(rename = "type")]
    pub event_type: String,

    pub message: ClaudeMessage,
}

/// The `message` object of an assistant or user line.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeMessage {
    #[serde(default)]
    pub content: MessageContent,
}

/// Message content is either a plain string or a list of blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Blocks(Vec::new())
    }
}

impl MessageContent {
    /// Normalize to blocks; plain text becomes a single text block.
    pub fn into_blocks(self) -> Vec<ContentBlock> {
        match self {
            Self::Text(text) => vec![ContentBlock::Text { text }],
            Self::Blocks(blocks) => blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_assistant_line() {
        let json = r#"{
            "type": "assistant",
            "session_id": "sess-123",
            "parent_tool_use_id": null,
            "message": {
                "id": "msg_1",
                "role": "assistant",
                "model": "claude-sonnet-4",
                "content": [
                    {"type": "text", "text": "Hello!"},
                    {"type": "tool_use", "id": "tool-1", "name": "Read", "input": {"file_path": "a.rs"}}
                ]
            }
        }"#;

        let event: ClaudeStreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "assistant");
        let blocks = event.message.content.into_blocks();
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[1], ContentBlock::ToolUse { name, .. } if name == "Read"));
    }

    #[test]
    fn parse_user_line_with_string_content() {
        let json = r#"{"type": "user", "message": {"role": "user", "content": "plain prompt"}}"#;
        let event: ClaudeStreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event.message.content.into_blocks(),
            vec![ContentBlock::Text {
                text: "plain prompt".to_string()
            }]
        );
    }

    #[test]
    fn parse_subagent_line() {
        let json = r#"{
            "type": "assistant",
            "parent_tool_use_id": "task-1",
            "message": {"role": "assistant", "content": [{"type": "text", "text": "child"}]}
        }"#;
        let event: ClaudeStreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.message.content.into_blocks().len(), 1);
    }

    #[test]
    fn missing_content_is_empty() {
        let json = r#"{"type": "assistant", "message": {"role": "assistant"}}"#;
        let event: ClaudeStreamEvent = serde_json::from_str(json).unwrap();
        assert!(event.message.content.into_blocks().is_empty());
    }
}
