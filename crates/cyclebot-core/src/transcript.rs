//! Per-prompt transcript files.
//!
//! When a log directory is configured, every line exchanged with an agent
//! process is appended to `{log_dir}/{id}.log` with a UTC timestamp.
//!
//! Writes happen on a dedicated thread. [`Transcript::record`] only stamps
//! the line and queues it, so it never blocks the async reader that calls it.

use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
    sync::mpsc::{self, Receiver, Sender},
};

use chrono::{SecondsFormat, Utc};

/// Cloneable handle to an append-only transcript. Disabled when empty.
///
/// The writer thread exits once every clone has been dropped.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    tx: Option<Sender<String>>,
}

impl Transcript {
    /// Open (or create) `{log_dir}/{id}.log` and start its writer thread.
    ///
    /// Returns a disabled transcript when `log_dir` is `None` or the file
    /// cannot be opened.
    pub fn open(log_dir: Option<&str>, id: &str) -> Self {
        let Some(dir) = log_dir else {
            return Self::default();
        };

        let path = Path::new(dir).join(format!("{}.log", id));
        let file = std::fs::create_dir_all(dir)
            .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
        let file = match file {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Failed to open transcript {}: {}", path.display(), e);
                return Self::default();
            }
        };

        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name(format!("transcript-{}", id))
            .spawn(move || write_loop(file, rx));
        if let Err(e) = spawned {
            log::warn!("Failed to start transcript writer for {}: {}", path.display(), e);
            return Self::default();
        }

        Self { tx: Some(tx) }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queue `[timestamp] DIRECTION: data`.
    pub fn record(&self, direction: &str, data: &str) {
        if let Some(tx) = &self.tx {
            let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            let _ = tx.send(format!("[{}] {}: {}", ts, direction, data));
        }
    }
}

/// Drain queued lines into the file, flushing whenever the queue runs dry.
fn write_loop(file: File, rx: Receiver<String>) {
    let mut out = BufWriter::new(file);
    while let Ok(line) = rx.recv() {
        let mut written = writeln!(out, "{}", line);
        while let Ok(more) = rx.try_recv() {
            written = written.and_then(|_| writeln!(out, "{}", more));
        }
        if let Err(e) = written.and_then(|_| out.flush()) {
            log::warn!("Transcript write failed: {}", e);
            return;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
