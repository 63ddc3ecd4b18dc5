//! Background eviction of inactive devices.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::AppState;

/// Handle to the running reaper task.
#[derive(Debug)]
pub struct Reaper {
    task: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl Reaper {
    /// Spawn a task that calls [`nline_core::Lobby::reap_inactive`] every `interval`.
    pub fn spawn(state: AppState, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately; nothing to reap yet.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("reaper stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        state.lobby.write().await.reap_inactive(Utc::now());
                    }
                }
            }
        });
        Self {
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Stop the task and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
