//! Prompt options passed by the client in `params.options`.
//!
//! The record is deliberately loose: a handful of keys are recognized and
//! typed, everything else is kept in `extra` and handed to the producer as-is.
//! A recognized key with the wrong JSON type is treated as unset.

use serde_json::{Map, Value};

/// Options for one prompt invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptOptions {
    pub model: Option<String>,
    pub permission_mode: Option<String>,
    /// Working directory for the agent.
    pub cwd: Option<String>,
    pub system_prompt: Option<String>,
    pub append_system_prompt: Option<String>,
    pub max_turns: Option<u32>,
    pub allowed_tools: Vec<String>,
    pub disallowed_tools: Vec<String>,
    /// Session ID to resume.
    pub resume: Option<String>,
    pub continue_conversation: bool,
    /// Keys this crate does not interpret.
    pub extra: Map<String, Value>,
}

impl PromptOptions {
    /// Build options from the client's JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut options = Self::default();

        for (key, value) in map {
            match key.as_str() {
                "model" => options.model = string_value(&key, value),
                "permission_mode" => options.permission_mode = string_value(&key, value),
                "cwd" => options.cwd = string_value(&key, value),
                "system_prompt" => options.system_prompt = string_value(&key, value),
                "append_system_prompt" => options.append_system_prompt = string_value(&key, value),
                "max_turns" => {
                    options.max_turns = match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
                        Some(n) => Some(n),
                        None => {
                            ignored(&key, &value);
                            None
                        }
                    }
                }
                "allowed_tools" => options.allowed_tools = string_list(&key, value),
                "disallowed_tools" => options.disallowed_tools = string_list(&key, value),
                "resume" => options.resume = string_value(&key, value),
                "continue_conversation" => {
                    options.continue_conversation = match value.as_bool() {
                        Some(flag) => flag,
                        None => {
                            ignored(&key, &value);
                            false
                        }
                    }
                }
                _ => {
                    options.extra.insert(key, value);
                }
            }
        }

        options
    }
}

fn ignored(key: &str, value: &Value) {
    log::debug!("Ignoring prompt option '{}' with unexpected value {}", key, value);
}

fn string_value(key: &str, value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            ignored(key, &other);
            None
        }
    }
}

fn string_list(key: &str, value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            ignored(key, &other);
            Vec::new()
        }
    }
}
