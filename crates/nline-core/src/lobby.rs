//! In-memory lobby: registered devices, the waiting queue and live matches.
//!
//! Every operation takes `now` explicitly; the server passes `Utc::now()`.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::api::{DeviceInfo, MatchAssignment, MatchState, MoveResponse, WaitingStatus};
use crate::board::{clamp_size, Board, Outcome, DEFAULT_SIZE};
use crate::error::{GameError, GameResult};
use crate::game::{DeviceId, Match, MatchId};

/// Idle time after which a device is considered disconnected.
pub const DEFAULT_DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Length of the alias derived from the device id.
const DEFAULT_ALIAS_LEN: usize = 8;

/// Registered device.
#[derive(Debug, Clone)]
pub struct Device {
    pub alias: String,
    pub last_active: DateTime<Utc>,
    pub wins: u32,
    pub losses: u32,
    /// Match the device was last paired into.
    pub match_id: Option<MatchId>,
}

#[derive(Debug, Clone)]
struct WaitingEntry {
    device_id: DeviceId,
    size: usize,
}

/// Outcome of a match request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRequestOutcome {
    /// Paired with a queued opponent.
    Matched(MatchAssignment),
    /// Added to the queue for this board size.
    Queued { size: usize },
    /// The device was already queued.
    AlreadyWaiting { size: usize },
}

impl MatchRequestOutcome {
    /// Human-readable message for the 202 responses.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Matched(_) => None,
            Self::Queued { size } => Some(format!("Waiting for an opponent on a {size}x{size} board...")),
            Self::AlreadyWaiting { .. } => Some("Already waiting for an opponent...".to_string()),
        }
    }
}

/// Counts from a reaper pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapStats {
    pub devices: usize,
    pub waiting: usize,
    pub matches: usize,
}

impl ReapStats {
    pub fn is_empty(&self) -> bool {
        self.devices == 0 && self.waiting == 0 && self.matches == 0
    }
}

/// Match-making and game state.
#[derive(Debug)]
pub struct Lobby {
    devices: HashMap<DeviceId, Device>,
    waiting: Vec<WaitingEntry>,
    matches: HashMap<MatchId, Match>,
    disconnect_timeout: chrono::Duration,
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new(DEFAULT_DISCONNECT_TIMEOUT)
    }
}

impl Lobby {
    pub fn new(disconnect_timeout: Duration) -> Self {
        Self {
            devices: HashMap::new(),
            waiting: Vec::new(),
            matches: HashMap::new(),
            disconnect_timeout: chrono::Duration::from_std(disconnect_timeout)
                .unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Register a new device.
    pub fn register(&mut self, alias: Option<String>, now: DateTime<Utc>) -> DeviceId {
        let device_id = DeviceId::generate();
        let alias = alias
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| device_id.as_str().chars().take(DEFAULT_ALIAS_LEN).collect());
        info!(device_id = %device_id, alias = %alias, "device registered");
        self.devices.insert(
            device_id.clone(),
            Device {
                alias,
                last_active: now,
                wins: 0,
                losses: 0,
                match_id: None,
            },
        );
        device_id
    }

    pub fn device(&self, device_id: &DeviceId) -> Option<&Device> {
        self.devices.get(device_id)
    }

    pub fn get_match(&self, match_id: &MatchId) -> Option<&Match> {
        self.matches.get(match_id)
    }

    /// Number of queued devices.
    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    /// Ids of connected devices, sorted.
    pub fn connected_devices(&mut self, now: DateTime<Utc>) -> Vec<DeviceId> {
        self.reap_inactive(now);
        let mut ids: Vec<_> = self.devices.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Connection status and global stats of a device.
    pub fn device_info(&mut self, device_id: &DeviceId, now: DateTime<Utc>) -> GameResult<DeviceInfo> {
        self.reap_inactive(now);
        let device = self
            .devices
            .get(device_id)
            .ok_or_else(|| GameError::DeviceNotFound {
                device_id: device_id.to_string(),
            })?;
        let played = (device.wins + device.losses).max(1);
        Ok(DeviceInfo {
            connected: true,
            alias: device.alias.clone(),
            wins: device.wins,
            losses: device.losses,
            ratio: f64::from(device.wins) / f64::from(played),
        })
    }

    /// Pair the device with a queued opponent of the same board size, or queue it.
    ///
    /// The requester that completes a pairing plays X and moves first.
    pub fn request_match(
        &mut self,
        device_id: &DeviceId,
        size: Option<i64>,
        now: DateTime<Utc>,
    ) -> GameResult<MatchRequestOutcome> {
        self.reap_inactive(now);
        let size = size.map_or(DEFAULT_SIZE, clamp_size);

        if !self.devices.contains_key(device_id) {
            return Err(GameError::InvalidDevice);
        }
        self.touch(device_id, now);
        self.prune_waiting();

        if let Some(entry) = self.waiting.iter().find(|e| &e.device_id == device_id) {
            debug!(device_id = %device_id, size = entry.size, "device already waiting");
            return Ok(MatchRequestOutcome::AlreadyWaiting { size: entry.size });
        }

        let Some(pos) = self.waiting.iter().position(|e| e.size == size) else {
            self.waiting.push(WaitingEntry {
                device_id: device_id.clone(),
                size,
            });
            if let Some(device) = self.devices.get_mut(device_id) {
                device.match_id = None;
            }
            info!(device_id = %device_id, size, queued = self.waiting.len(), "device queued");
            return Ok(MatchRequestOutcome::Queued { size });
        };

        let opponent = self.waiting.remove(pos).device_id;
        let match_id = MatchId::generate();
        let game = Match::new(
            match_id.clone(),
            device_id.clone(),
            opponent.clone(),
            Board::clamped(size),
            now,
        );
        let assignment = MatchAssignment {
            match_id: match_id.clone(),
            players: game.players(),
            board_size: size,
        };
        self.matches.insert(match_id.clone(), game);
        for id in [device_id, &opponent] {
            if let Some(device) = self.devices.get_mut(id) {
                device.match_id = Some(match_id.clone());
            }
        }
        info!(match_id = %match_id, x = %device_id, o = %opponent, size, "match created");
        Ok(MatchRequestOutcome::Matched(assignment))
    }

    /// Whether the device has been paired, is still queued, or neither.
    pub fn waiting_status(&mut self, device_id: &DeviceId, now: DateTime<Utc>) -> GameResult<WaitingStatus> {
        let device = self
            .devices
            .get_mut(device_id)
            .ok_or(GameError::InvalidDevice)?;
        device.last_active = now;

        if let Some(game) = device.match_id.as_ref().and_then(|id| self.matches.get(id)) {
            return Ok(WaitingStatus::Matched {
                match_id: game.id.clone(),
                players: game.players(),
                board_size: game.size(),
            });
        }

        Ok(self
            .waiting
            .iter()
            .find(|e| &e.device_id == device_id)
            .map(|e| WaitingStatus::Waiting { board_size: e.size })
            .unwrap_or(WaitingStatus::Idle))
    }

    /// Apply a move and settle stats when it decides the match.
    pub fn make_move(
        &mut self,
        match_id: &MatchId,
        device_id: &DeviceId,
        x: usize,
        y: usize,
        now: DateTime<Utc>,
    ) -> GameResult<MoveResponse> {
        let game = self
            .matches
            .get_mut(match_id)
            .ok_or_else(|| GameError::MatchNotFound {
                match_id: match_id.to_string(),
            })?;
        let result = game.play(device_id, x, y)?;
        debug!(match_id = %match_id, device_id = %device_id, x, y, "move accepted");

        let response = MoveResponse {
            board: game.board.clone(),
            next_turn: result.next_turn,
            winner: result.outcome,
        };
        if let Some(outcome) = result.outcome {
            self.settle(match_id, outcome);
        }
        self.touch(device_id, now);
        Ok(response)
    }

    /// Concede a match; counts as a loss for the device.
    pub fn surrender(
        &mut self,
        match_id: &MatchId,
        device_id: &DeviceId,
        now: DateTime<Utc>,
    ) -> GameResult<MoveResponse> {
        let game = self
            .matches
            .get_mut(match_id)
            .ok_or_else(|| GameError::MatchNotFound {
                match_id: match_id.to_string(),
            })?;
        let outcome = game.surrender(device_id)?;
        let response = MoveResponse {
            board: game.board.clone(),
            next_turn: None,
            winner: Some(outcome),
        };
        info!(match_id = %match_id, device_id = %device_id, "player surrendered");
        self.settle(match_id, outcome);
        self.touch(device_id, now);
        Ok(response)
    }

    /// Current state of a match.
    pub fn match_state(&self, match_id: &MatchId) -> GameResult<MatchState> {
        let game = self
            .matches
            .get(match_id)
            .ok_or_else(|| GameError::MatchNotFound {
                match_id: match_id.to_string(),
            })?;
        Ok(MatchState {
            board: game.board.clone(),
            turn: game.turn.clone(),
            winner: game.winner,
            size: game.size(),
            players: game.players(),
        })
    }

    /// Evict devices idle longer than the disconnect timeout, their queue
    /// entries, and matches whose players are both gone.
    ///
    /// A match with no registered player can never receive another move.
    pub fn reap_inactive(&mut self, now: DateTime<Utc>) -> ReapStats {
        let timeout = self.disconnect_timeout;
        let before = self.devices.len();
        self.devices.retain(|id, device| {
            let keep = now.signed_duration_since(device.last_active) <= timeout;
            if !keep {
                debug!(device_id = %id, "device disconnected (inactive)");
            }
            keep
        });
        let devices = before - self.devices.len();
        let waiting = self.prune_waiting();

        let before = self.matches.len();
        let live = &self.devices;
        self.matches
            .retain(|_, game| live.contains_key(&game.x) || live.contains_key(&game.o));
        let matches = before - self.matches.len();

        let stats = ReapStats {
            devices,
            waiting,
            matches,
        };
        if !stats.is_empty() {
            info!(
                devices = stats.devices,
                waiting = stats.waiting,
                matches = stats.matches,
                "reaped inactive state"
            );
        }
        stats
    }

    /// Drop queue entries whose device is gone.
    fn prune_waiting(&mut self) -> usize {
        let before = self.waiting.len();
        let devices = &self.devices;
        self.waiting.retain(|e| devices.contains_key(&e.device_id));
        before - self.waiting.len()
    }

    fn touch(&mut self, device_id: &DeviceId, now: DateTime<Utc>) {
        if let Some(device) = self.devices.get_mut(device_id) {
            device.last_active = now;
        }
    }

    /// Credit wins and losses; draws change nothing. Reaped devices are skipped.
    fn settle(&mut self, match_id: &MatchId, outcome: Outcome) {
        let Some(winner) = outcome.winner() else {
            info!(match_id = %match_id, "match drawn");
            return;
        };
        let Some(game) = self.matches.get(match_id) else {
            return;
        };
        let (winner_id, loser_id) = (
            game.device_of(winner).clone(),
            game.device_of(winner.opponent()).clone(),
        );
        if let Some(device) = self.devices.get_mut(&winner_id) {
            device.wins += 1;
        }
        if let Some(device) = self.devices.get_mut(&loser_id) {
            device.losses += 1;
        }
        info!(match_id = %match_id, winner = %winner, device_id = %winner_id, "match won");
    }

    /// Backdate a device's last activity (tests of expiry).
    #[cfg(test)]
    fn age(&mut self, device_id: &DeviceId, by: chrono::Duration) {
        if let Some(device) = self.devices.get_mut(device_id) {
            device.last_active -= by;
        }
    }
}
