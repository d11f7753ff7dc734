//! Shared state for the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use cyclebot_core::Producer;

/// Shared state available to all HTTP handlers.
#[derive(Clone)]
pub struct SharedState {
    /// Producer handed to every new session.
    pub producer: Arc<dyn Producer>,
    /// Directory holding `index.html` and the `/static` assets.
    pub static_dir: Option<PathBuf>,
}

impl SharedState {
    pub fn new(producer: Arc<dyn Producer>, static_dir: Option<PathBuf>) -> Self {
        Self { producer, static_dir }
    }
}
