//! Claude CLI producer.
//!
//! Runs `claude --print --output-format stream-json` once per prompt and
//! parses its stdout into [`AgentMessage`](crate::producer::AgentMessage)s.

mod parser;
pub mod spawn;
mod types;

use futures::{future, StreamExt, TryStreamExt};
use uuid::Uuid;

use crate::producer::{MessageStream, Producer, ProducerError, PromptOptions};
use crate::spawn::AgentProcess;
use crate::transcript::Transcript;

pub use parser::parse_line;
pub use spawn::ClaudeConfig;
pub use types::*;

/// Process-level settings shared by every prompt.
#[derive(Debug, Clone)]
pub struct ClaudeProducerConfig {
    /// Path or name of the `claude` binary.
    pub binary_path: String,
    /// Default working directory when a prompt does not set `cwd`.
    pub working_dir: Option<String>,
    /// Shell prefix override (e.g., "/bin/zsh -l -c").
    pub shell_prefix: Option<String>,
    /// Directory for per-prompt transcripts.
    pub log_dir: Option<String>,
}

impl Default for ClaudeProducerConfig {
    fn default() -> Self {
        Self {
            binary_path: "claude".to_string(),
            working_dir: None,
            shell_prefix: None,
            log_dir: None,
        }
    }
}

/// Producer backed by the Claude CLI.
#[derive(Debug, Clone, Default)]
pub struct ClaudeProducer {
    config: ClaudeProducerConfig,
}

impl ClaudeProducer {
    pub fn new(config: ClaudeProducerConfig) -> Self {
        Self { config }
    }
}

impl Producer for ClaudeProducer {
    fn open(&self, prompt: &str, options: &PromptOptions) -> Result<MessageStream, ProducerError> {
        let spawn = ClaudeConfig {
            binary_path: self.config.binary_path.clone(),
            working_dir: self.config.working_dir.clone(),
            prompt: prompt.to_string(),
            options: options.clone(),
            shell_prefix: self.config.shell_prefix.clone(),
        }
        .build();

        let transcript_id = Uuid::new_v4().to_string();
        let transcript = Transcript::open(self.config.log_dir.as_deref(), &transcript_id);
        if transcript.is_enabled() {
            log::info!("Recording Claude transcript {}", transcript_id);
        }

        let process = AgentProcess::spawn(spawn, transcript)?;
        log::debug!("Spawned Claude CLI ({})", self.config.binary_path);

        let messages = process
            .into_lines()
            .try_filter_map(|line| future::ready(Ok(parse_line(&line))));

        Ok(messages.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::AgentMessage;
    use futures::StreamExt;

    /// A script that ignores its arguments and prints a canned session.
    #[cfg(unix)]
    fn fake_claude(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("claude");
        std::fs::write(&path, format!("#!/bin/sh\ncat > /dev/null\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[cfg(unix)]
    fn producer(binary_path: String) -> ClaudeProducer {
        ClaudeProducer::new(ClaudeProducerConfig {
            binary_path,
            working_dir: None,
            shell_prefix: Some("/bin/sh -c".to_string()),
            log_dir: None,
        })
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn streams_parsed_messages() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_claude(
            dir.path(),
            r#"echo '{"type":"system","subtype":"init","session_id":"s1","model":"m"}'
echo ''
echo '{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"hi!"}]}}'
echo '{"type":"result","subtype":"success","num_turns":1,"duration_ms":10,"duration_api_ms":8,"is_error":false,"total_cost_usd":0.01}'"#,
        );

        let stream = producer(script).open("hi", &PromptOptions::default()).unwrap();
        let messages: Vec<AgentMessage> = stream.map(Result::unwrap).collect().await;

        let kinds: Vec<&str> = messages.iter().map(AgentMessage::kind).collect();
        assert_eq!(kinds, vec!["system", "assistant", "result"]);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn invalid_utf8_line_is_relayed_as_other() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_claude(
            dir.path(),
            r#"printf '\377\376 junk\n'
echo '{"type":"result","subtype":"success","num_turns":1,"duration_ms":10,"duration_api_ms":8,"is_error":false}'"#,
        );

        let messages: Vec<AgentMessage> = producer(script)
            .open("hi", &PromptOptions::default())
            .unwrap()
            .map(Result::unwrap)
            .collect()
            .await;

        assert_eq!(messages.len(), 2);
        assert!(matches!(&messages[0], AgentMessage::Other { .. }));
        assert!(matches!(&messages[1], AgentMessage::Result(summary) if summary.num_turns == 1));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn failing_cli_ends_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_claude(
            dir.path(),
            r#"echo '{"type":"system","subtype":"init"}'
echo 'Invalid API key' >&2
exit 1"#,
        );

        let items: Vec<_> = producer(script)
            .open("hi", &PromptOptions::default())
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        match &items[1] {
            Err(ProducerError::Exited { exit, stderr }) => {
                assert_eq!(exit.code, 1);
                assert!(stderr.contains("Invalid API key"));
            }
            other => panic!("Expected Exited error, got {:?}", other),
        }
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn missing_binary_fails() {
        let items: Vec<_> = producer("/nonexistent/claude".to_string())
            .open("hi", &PromptOptions::default())
            .unwrap()
            .collect()
            .await;

        // The login shell starts fine; the missing binary surfaces as a failed exit.
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(ProducerError::Exited { .. })));
    }
}
