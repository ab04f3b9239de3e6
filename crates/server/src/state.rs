//! Shared application state: the store, runtime config, and the server
//! status cell.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use cask_engine::Store;
use cask_executor::RuntimeConfig;

/// Server lifecycle: `Init -> Running -> Down`.
///
/// Requests are only served in `Running`; in `Down` everything gets 503
/// while in-flight work drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Running,
    Down,
}

pub struct ServerStatus(RwLock<RunState>);

impl ServerStatus {
    pub fn new() -> Self {
        ServerStatus(RwLock::new(RunState::Init))
    }

    pub fn get(&self) -> RunState {
        *self.0.read()
    }

    pub fn set(&self, state: RunState) {
        *self.0.write() = state;
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub cfg: Arc<RuntimeConfig>,
    pub status: Arc<ServerStatus>,
    pub compress_response: bool,
    /// Flipped by `/down` after the drain period; ends the serve loop.
    pub shutdown: watch::Sender<bool>,
}
