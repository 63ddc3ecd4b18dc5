//! Fixed-interval polling of the lobby and of a running match.
//!
//! The server has no push channel, so both watchers poll: the first poll
//! happens immediately, then one per interval. Failed polls are logged and
//! the loop carries on; transient GET failures are already retried by
//! [`GameClient`].

use std::time::Duration;

use nline_core::{DeviceId, MatchAssignment, MatchId, MatchState, WaitingStatus};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::GameClient;

/// Default polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Events from a [`LobbyWatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyEvent {
    /// An opponent was found. Emitted once; the watcher then exits.
    Matched(MatchAssignment),
}

/// Events from a [`MatchWatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// The match state differs from the last one seen.
    Updated(MatchState),
    /// The match has a winner or ended in a draw. Emitted once; the watcher then exits.
    Finished(MatchState),
}

/// Running poll task plus its shutdown signal.
#[derive(Debug)]
struct PollTask {
    task: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl PollTask {
    async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                debug!(error = %e, "poll task ended abnormally");
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Shortest accepted polling interval; `tokio::time::interval` rejects zero.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

fn ticker(interval: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval(interval.max(MIN_POLL_INTERVAL));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker
}

/// Polls the waiting status until this device is paired.
#[derive(Debug)]
pub struct LobbyWatcher {
    inner: PollTask,
}

impl LobbyWatcher {
    #[must_use = "the event receiver must be used to receive events"]
    pub fn spawn(
        client: GameClient,
        device_id: DeviceId,
        interval: Duration,
    ) -> (Self, mpsc::Receiver<LobbyEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(lobby_loop(client, device_id, interval, event_tx, shutdown_rx));
        let watcher = Self {
            inner: PollTask {
                task: Some(task),
                shutdown_tx: Some(shutdown_tx),
            },
        };
        (watcher, event_rx)
    }

    /// Stop polling and wait for the task to exit.
    pub async fn stop(mut self) {
        self.inner.stop().await;
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

async fn lobby_loop(
    client: GameClient,
    device_id: DeviceId,
    interval: Duration,
    event_tx: mpsc::Sender<LobbyEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!(device_id = %device_id, "lobby watcher started");
    let mut ticker = ticker(interval);
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                debug!("lobby watcher stopping");
                break;
            }
            _ = ticker.tick() => {
                match client.waiting_status(&device_id).await {
                    Ok(WaitingStatus::Matched { match_id, players, board_size }) => {
                        info!(match_id = %match_id, board_size, "opponent found");
                        let assignment = MatchAssignment { match_id, players, board_size };
                        let _ = event_tx.send(LobbyEvent::Matched(assignment)).await;
                        break;
                    }
                    Ok(WaitingStatus::Waiting { board_size }) => {
                        debug!(board_size, "still waiting");
                    }
                    Ok(WaitingStatus::Idle) => {
                        warn!(device_id = %device_id, "device is neither waiting nor matched");
                    }
                    Err(e) => {
                        warn!(error = %e, "waiting-status poll failed");
                    }
                }
            }
        }
    }
}

/// Polls a match until it finishes.
#[derive(Debug)]
pub struct MatchWatcher {
    inner: PollTask,
}

impl MatchWatcher {
    #[must_use = "the event receiver must be used to receive events"]
    pub fn spawn(
        client: GameClient,
        match_id: MatchId,
        interval: Duration,
    ) -> (Self, mpsc::Receiver<MatchEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(match_loop(client, match_id, interval, event_tx, shutdown_rx));
        let watcher = Self {
            inner: PollTask {
                task: Some(task),
                shutdown_tx: Some(shutdown_tx),
            },
        };
        (watcher, event_rx)
    }

    /// Stop polling and wait for the task to exit.
    pub async fn stop(mut self) {
        self.inner.stop().await;
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

async fn match_loop(
    client: GameClient,
    match_id: MatchId,
    interval: Duration,
    event_tx: mpsc::Sender<MatchEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!(match_id = %match_id, "match watcher started");
    let mut ticker = ticker(interval);
    let mut last: Option<MatchState> = None;
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                debug!("match watcher stopping");
                break;
            }
            _ = ticker.tick() => {
                let state = match client.match_state(&match_id).await {
                    Ok(state) => state,
                    Err(e) => {
                        warn!(match_id = %match_id, error = %e, "match poll failed");
                        continue;
                    }
                };

                if state.winner.is_some() {
                    info!(match_id = %match_id, winner = ?state.winner, "match finished");
                    let _ = event_tx.send(MatchEvent::Finished(state)).await;
                    break;
                }
                if last.as_ref() == Some(&state) {
                    continue;
                }
                last = Some(state.clone());
                if event_tx.send(MatchEvent::Updated(state)).await.is_err() {
                    debug!("match event receiver dropped");
                    break;
                }
            }
        }
    }
}
