//! A two-player online match: turn order, move validation and surrender.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Mark, Outcome};
use crate::error::{GameError, GameResult};

/// Opaque device identifier issued at registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Opaque match identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Player assignment: device id to mark.
pub type Players = BTreeMap<DeviceId, Mark>;

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    /// Player to move next, `None` once decided.
    pub next_turn: Option<DeviceId>,
    pub outcome: Option<Outcome>,
}

/// Online match between two devices.
#[derive(Debug, Clone)]
pub struct Match {
    pub id: MatchId,
    /// Plays X and moves first.
    pub x: DeviceId,
    pub o: DeviceId,
    /// Player to move; keeps the last mover once the match is decided.
    pub turn: DeviceId,
    pub board: Board,
    pub winner: Option<Outcome>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Start a match on an empty board; `x` moves first.
    pub fn new(id: MatchId, x: DeviceId, o: DeviceId, board: Board, now: DateTime<Utc>) -> Self {
        Self {
            id,
            turn: x.clone(),
            x,
            o,
            board,
            winner: None,
            created_at: now,
        }
    }

    pub fn size(&self) -> usize {
        self.board.size()
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn players(&self) -> Players {
        let mut players = Players::new();
        players.insert(self.x.clone(), Mark::X);
        players.insert(self.o.clone(), Mark::O);
        players
    }

    pub fn mark_of(&self, device: &DeviceId) -> Option<Mark> {
        if device == &self.x {
            Some(Mark::X)
        } else if device == &self.o {
            Some(Mark::O)
        } else {
            None
        }
    }

    pub fn device_of(&self, mark: Mark) -> &DeviceId {
        match mark {
            Mark::X => &self.x,
            Mark::O => &self.o,
        }
    }

    pub fn opponent_of(&self, device: &DeviceId) -> Option<&DeviceId> {
        self.mark_of(device).map(|mark| self.device_of(mark.opponent()))
    }

    /// Apply a move by `device` at `(x, y)` (row, column).
    ///
    /// Checks run in order: finished, turn, bounds, occupancy.
    pub fn play(&mut self, device: &DeviceId, x: usize, y: usize) -> GameResult<MoveResult> {
        if self.is_finished() {
            return Err(GameError::MatchFinished);
        }
        if device != &self.turn {
            return Err(GameError::NotYourTurn);
        }
        let mark = self.mark_of(device).ok_or(GameError::NotYourTurn)?;

        self.board.place(x, y, mark)?;

        if let Some(outcome) = self.board.outcome_after(x, y) {
            self.winner = Some(outcome);
            return Ok(MoveResult {
                next_turn: None,
                outcome: Some(outcome),
            });
        }

        self.turn = self.device_of(mark.opponent()).clone();
        Ok(MoveResult {
            next_turn: Some(self.turn.clone()),
            outcome: None,
        })
    }

    /// Concede the match; the opponent wins.
    pub fn surrender(&mut self, device: &DeviceId) -> GameResult<Outcome> {
        let mark = self.mark_of(device).ok_or_else(|| GameError::NotAPlayer {
            device_id: device.to_string(),
        })?;
        if self.is_finished() {
            return Err(GameError::MatchFinished);
        }
        let outcome = Outcome::Winner(mark.opponent());
        self.winner = Some(outcome);
        Ok(outcome)
    }
}
