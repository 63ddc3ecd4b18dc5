use std::sync::Arc;
use std::time::Duration;

use nline_core::Lobby;
use tokio::sync::RwLock;

/// Shared handler state.
///
/// Each mutating request holds the write lock for the whole lobby operation,
/// so pairing and move validation never interleave.
#[derive(Debug, Clone)]
pub struct AppState {
    pub lobby: Arc<RwLock<Lobby>>,
}

impl AppState {
    pub fn new(disconnect_timeout: Duration) -> Self {
        Self::from_lobby(Lobby::new(disconnect_timeout))
    }

    pub fn from_lobby(lobby: Lobby) -> Self {
        Self {
            lobby: Arc::new(RwLock::new(lobby)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_lobby(Lobby::default())
    }
}
