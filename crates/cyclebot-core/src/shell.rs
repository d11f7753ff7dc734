//! Login-shell command building for agent processes.
//!
//! The agent binary is usually installed through a version manager or a
//! user-local prefix, so it is run inside the user's login shell to pick up
//! `PATH`. Non-POSIX shells (fish, nushell, ...) fall back to bash or sh.

use std::process::{Command, ExitStatus};

/// How an agent process terminated.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AgentExit {
    pub code: i32,
    pub signal: Option<i32>,
}

impl AgentExit {
    pub fn from_status(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = std::os::unix::process::ExitStatusExt::signal(&status);
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code().unwrap_or_default(),
            signal,
        }
    }
}

impl std::fmt::Display for AgentExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.signal {
            Some(signal) => write!(f, "killed by signal {}", signal),
            None => write!(f, "exited with code {}", self.code),
        }
    }
}

/// Prepend the binary's parent directory to PATH so node/etc. are found.
fn prepare_path_env(cmd: &mut Command, binary_path: &str) {
    if binary_path.contains('/') {
        if let Some(dir) = std::path::Path::new(binary_path)
            .parent()
            .and_then(|d| d.to_str())
        {
            let existing = std::env::var("PATH").unwrap_or_default();
            let combined = if existing.is_empty() {
                dir.to_string()
            } else {
                format!("{}:{}", dir, existing)
            };
            cmd.env("PATH", combined);
        }
    }
}

/// Build a command that runs `binary_path args...` in a login shell.
///
/// The result is `<prefix> '<quoted command>'`, where the prefix defaults to
/// `$SHELL -l -c`. A custom prefix such as `/bin/zsh -l -c` replaces it.
#[cfg(unix)]
pub fn build_login_shell_command(
    binary_path: &str,
    args: &[String],
    working_dir: Option<&str>,
    shell_prefix: Option<&str>,
) -> Result<Command, String> {
    let prefix = get_shell_prefix(shell_prefix);
    let mut prefix_parts = prefix.split_whitespace();
    let shell_program = prefix_parts
        .next()
        .ok_or_else(|| "Empty shell prefix".to_string())?;

    let mut command_parts = Vec::with_capacity(args.len() + 1);
    for part in std::iter::once(binary_path).chain(args.iter().map(String::as_str)) {
        command_parts.push(
            shlex::try_quote(part)
                .map_err(|_| format!("Cannot quote argument: {}", part))?
                .into_owned(),
        );
    }

    let mut cmd = Command::new(shell_program);
    cmd.args(prefix_parts).arg(command_parts.join(" "));

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    prepare_path_env(&mut cmd, binary_path);

    Ok(cmd)
}

/// Windows has no login shell; run the binary directly.
#[cfg(windows)]
pub fn build_login_shell_command(
    binary_path: &str,
    args: &[String],
    working_dir: Option<&str>,
    _shell_prefix: Option<&str>,
) -> Result<Command, String> {
    let mut cmd = Command::new(binary_path);
    cmd.args(args);

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    prepare_path_env(&mut cmd, binary_path);

    Ok(cmd)
}

#[cfg(unix)]
fn get_shell_prefix(custom_prefix: Option<&str>) -> String {
    if let Some(prefix) = custom_prefix.filter(|p| !p.trim().is_empty()) {
        return prefix.to_string();
    }

    let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
    let shell_name = std::path::Path::new(&shell)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let non_posix = ["fish", "nu", "nushell", "elvish", "xonsh", "ion"];
    let effective_shell = if non_posix.contains(&shell_name) {
        if std::path::Path::new("/bin/bash").exists() {
            "/bin/bash"
        } else {
            "/bin/sh"
        }
    } else {
        &shell
    };

    format!("{} -l -c", effective_shell)
}

// ============================================================================
// TESTS
// ============================================================================
