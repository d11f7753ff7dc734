//! Claude stream parser.
//!
//! Turns each stdout line of the CLI into an [`AgentMessage`]. Every
//! non-empty line yields exactly one message; lines that are not JSON or have
//! an unrecognized `type` come back as [`AgentMessage::Other`].

use serde_json::Value;

use crate::producer::{AgentMessage, ResultSummary};

use super::types::ClaudeStreamEvent;

/// Parse one stdout line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Option<AgentMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Some(translate(value)),
        Err(e) => {
            log::warn!("Non-JSON line from Claude ({}): {}", e, trimmed);
            Some(AgentMessage::Other {
                raw: Value::String(trimmed.to_string()),
            })
        }
    }
}

fn translate(value: Value) -> AgentMessage {
    let event_type = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let translated = match event_type.as_str() {
        "assistant" | "user" => translate_message(&value),
        "system" => translate_system(&value),
        "result" => serde_json::from_value::<ResultSummary>(value.clone())
            .map(AgentMessage::Result)
            .map_err(|e| e.to_string()),
        _ => return AgentMessage::Other { raw: value },
    };

    match translated {
        Ok(message) => message,
        Err(e) => {
            log::warn!("Malformed Claude '{}' line: {}", event_type, e);
            AgentMessage::Other { raw: value }
        }
    }
}

fn translate_message(value: &Value) -> Result<AgentMessage, String> {
    let event: ClaudeStreamEvent = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
    let content = event.message.content.into_blocks();
    Ok(if event.event_type == "assistant" {
        AgentMessage::Assistant { content }
    } else {
        AgentMessage::User { content }
    })
}

fn translate_system(value: &Value) -> Result<AgentMessage, String> {
    let data = value
        .as_object()
        .cloned()
        .ok_or_else(|| "system line is not an object".to_string())?;
    if data.get("subtype").and_then(Value::as_str) == Some("init") {
        if let Some(sid) = data.get("session_id").and_then(Value::as_str) {
            log::debug!("Claude session started: {}", sid);
        }
    }
    Ok(AgentMessage::System { data })
}

// ============================================================================
// TESTS
// ============================================================================
