//! Agent process spawning and line-oriented I/O.
//!
//! An [`AgentProcess`] runs one agent invocation:
//! - spawned in a login shell (see [`crate::shell`])
//! - an optional initial stdin payload, after which stdin is closed
//! - stdout consumed as a lazy line stream
//! - stderr drained in the background, logged, and its tail kept for errors
//!
//! The child is killed when the process handle is dropped, so a client that
//! disconnects mid-prompt does not leave the agent running.

use std::collections::VecDeque;
use std::process::Stdio;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::producer::ProducerError;
use crate::shell::{build_login_shell_command, AgentExit};
use crate::transcript::Transcript;

/// Number of trailing stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Configuration for spawning an agent process.
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub binary_path: String,
    pub args: Vec<String>,
    pub working_dir: Option<String>,
    /// Custom shell prefix (e.g., "/bin/zsh -l -c")
    pub shell_prefix: Option<String>,
    /// Written to stdin right after spawning; stdin is then closed.
    pub initial_stdin: Option<String>,
}

impl SpawnConfig {
    pub fn new(binary_path: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            args,
            working_dir: None,
            shell_prefix: None,
            initial_stdin: None,
        }
    }

    pub fn working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn shell_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.shell_prefix = Some(prefix.into());
        self
    }

    pub fn initial_stdin(mut self, message: impl Into<String>) -> Self {
        self.initial_stdin = Some(message.into());
        self
    }
}

/// A running agent process.
pub struct AgentProcess {
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr_tail: Option<JoinHandle<String>>,
    transcript: Transcript,
}

impl AgentProcess {
    /// Spawn the process and start its background I/O tasks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: SpawnConfig, transcript: Transcript) -> Result<Self, ProducerError> {
        let std_cmd = build_login_shell_command(
            &config.binary_path,
            &config.args,
            config.working_dir.as_deref(),
            config.shell_prefix.as_deref(),
        )
        .map_err(ProducerError::Spawn)?;

        let mut cmd = Command::from(std_cmd);
        cmd.stdin(if config.initial_stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| ProducerError::Spawn(format!("{}: {}", config.binary_path, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProducerError::Spawn("Failed to capture stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ProducerError::Spawn("Failed to capture stderr".to_string()))?;

        if let (Some(initial), Some(mut stdin)) = (config.initial_stdin, child.stdin.take()) {
            transcript.record("STDIN", &initial);
            tokio::spawn(async move {
                let payload = format!("{}\n", initial);
                if let Err(e) = stdin.write_all(payload.as_bytes()).await {
                    log::warn!("Failed to write agent stdin: {}", e);
                }
                // Dropping stdin closes the pipe, telling the agent input is done.
            });
        }

        let stderr_transcript = transcript.clone();
        let stderr_tail = tokio::spawn(async move {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            let mut reader = BufReader::new(stderr);
            while let Ok(Some(line)) = read_line_lossy(&mut reader).await {
                log::debug!("agent stderr: {}", line);
                stderr_transcript.record("STDERR", &line);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Vec::from(tail).join("\n")
        });

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            stderr_tail: Some(stderr_tail),
            transcript,
        })
    }

    /// Read the next stdout line. Invalid UTF-8 is replaced, not an error.
    ///
    /// Returns `Ok(None)` once stdout closes and the process exited
    /// successfully. A non-zero exit becomes [`ProducerError::Exited`].
    pub async fn next_line(&mut self) -> Result<Option<String>, ProducerError> {
        if let Some(line) = read_line_lossy(&mut self.stdout).await? {
            log::debug!("agent stdout: {}", line);
            self.transcript.record("STDOUT", &line);
            return Ok(Some(line));
        }

        let status = self.child.wait().await?;
        let exit = AgentExit::from_status(status);
        if status.success() {
            log::debug!("agent {}", exit);
            return Ok(None);
        }

        let stderr = match self.stderr_tail.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };
        Err(ProducerError::Exited { exit, stderr })
    }

    /// Consume the process as a stream of stdout lines.
    pub fn into_lines(self) -> BoxStream<'static, Result<String, ProducerError>> {
        stream::try_unfold(self, |mut process| async move {
            let line = process.next_line().await?;
            Ok::<_, ProducerError>(line.map(|line| (line, process)))
        })
        .boxed()
    }
}

/// Read one `\n`-terminated line, dropping the terminator. `None` at EOF.
async fn read_line_lossy<R>(reader: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    if buf.ends_with(b"\n") {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

// ============================================================================
// TESTS
// ============================================================================
