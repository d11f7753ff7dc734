//! Claude CLI spawn configuration.

use crate::producer::PromptOptions;
use crate::spawn::SpawnConfig;

/// Everything needed to launch the Claude CLI for one prompt.
#[derive(Debug, Clone, Default)]
pub struct ClaudeConfig {
    pub binary_path: String,
    /// Used when the prompt options do not set `cwd`.
    pub working_dir: Option<String>,
    pub prompt: String,
    pub options: PromptOptions,
    pub shell_prefix: Option<String>,
}

impl ClaudeConfig {
    /// Build a SpawnConfig for the Claude CLI.
    pub fn build(self) -> SpawnConfig {
        let opts = self.options;
        let mut args: Vec<String> = [
            "--print",
            "--output-format",
            "stream-json",
            "--input-format",
            "stream-json",
            "--verbose",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let mut flag = |name: &str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                args.push(name.to_string());
                args.push(value);
            }
        };

        flag("--model", opts.model);
        flag("--permission-mode", opts.permission_mode);
        flag("--max-turns", opts.max_turns.map(|n| n.to_string()));
        flag("--system-prompt", opts.system_prompt);
        flag("--append-system-prompt", opts.append_system_prompt);
        flag("--allowedTools", join_tools(&opts.allowed_tools));
        flag("--disallowedTools", join_tools(&opts.disallowed_tools));

        if let Some(id) = opts.resume.filter(|id| !id.is_empty()) {
            args.push("--resume".to_string());
            args.push(id);
        } else if opts.continue_conversation {
            args.push("--continue".to_string());
        }

        if !opts.extra.is_empty() {
            let keys: Vec<&String> = opts.extra.keys().collect();
            log::debug!("Claude CLI does not use prompt options {:?}", keys);
        }

        let prompt_json = serde_json::json!({
            "type": "user",
            "message": {
                "role": "user",
                "content": self.prompt
            }
        });

        let mut config = SpawnConfig::new(self.binary_path, args).initial_stdin(prompt_json.to_string());

        if let Some(dir) = opts.cwd.or(self.working_dir) {
            config = config.working_dir(dir);
        }
        if let Some(shell) = self.shell_prefix {
            config = config.shell_prefix(shell);
        }

        config
    }
}

fn join_tools(tools: &[String]) -> Option<String> {
    if tools.is_empty() {
        None
    } else {
        Some(tools.join(","))
    }
}
