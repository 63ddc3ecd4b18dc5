//! Client-side view of one online game.

use nline_core::{
    Board, DeviceId, GameError, GameResult, Mark, MatchAssignment, MatchId, MatchState,
    MoveResponse, Outcome, Players, WinLine,
};
use tracing::debug;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Searching,
    Waiting,
    Playing,
    Finished,
}

/// Result from this device's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionResult {
    Won,
    Lost,
    Draw,
}

impl std::fmt::Display for SessionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Won => write!(f, "You won!"),
            Self::Lost => write!(f, "You lost"),
            Self::Draw => write!(f, "Draw!"),
        }
    }
}

/// State of an online game as seen by one device.
#[derive(Debug, Clone)]
pub struct OnlineSession {
    device_id: DeviceId,
    phase: Phase,
    match_id: Option<MatchId>,
    my_mark: Option<Mark>,
    players: Players,
    board: Option<Board>,
    turn: Option<DeviceId>,
    winner: Option<Outcome>,
}

impl OnlineSession {
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            phase: Phase::Searching,
            match_id: None,
            my_mark: None,
            players: Players::new(),
            board: None,
            turn: None,
            winner: None,
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn match_id(&self) -> Option<&MatchId> {
        self.match_id.as_ref()
    }

    pub fn my_mark(&self) -> Option<Mark> {
        self.my_mark
    }

    pub fn players(&self) -> &Players {
        &self.players
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn turn(&self) -> Option<&DeviceId> {
        self.turn.as_ref()
    }

    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    /// The server queued us.
    pub fn set_waiting(&mut self) {
        if self.phase == Phase::Searching {
            self.phase = Phase::Waiting;
        }
    }

    /// Enter the match: empty board, X to move.
    pub fn start(&mut self, assignment: &MatchAssignment) {
        self.match_id = Some(assignment.match_id.clone());
        self.my_mark = assignment.players.get(&self.device_id).copied();
        self.players = assignment.players.clone();
        self.board = Some(Board::clamped(assignment.board_size));
        self.turn = device_with(&self.players, Mark::X);
        self.winner = None;
        self.phase = Phase::Playing;
        debug!(
            match_id = %assignment.match_id,
            mark = ?self.my_mark,
            "session started"
        );
    }

    /// Fold a polled match state into the session.
    pub fn apply(&mut self, state: &MatchState) {
        self.board = Some(state.board.clone());
        self.turn = Some(state.turn.clone());
        if !state.players.is_empty() {
            self.my_mark = state.players.get(&self.device_id).copied().or(self.my_mark);
            self.players = state.players.clone();
        }
        self.set_winner(state.winner);
    }

    /// Apply the server's answer to our own move or surrender.
    pub fn record_local_move(&mut self, response: &MoveResponse) {
        self.board = Some(response.board.clone());
        if let Some(next) = &response.next_turn {
            self.turn = Some(next.clone());
        }
        self.set_winner(response.winner);
    }

    fn set_winner(&mut self, winner: Option<Outcome>) {
        self.winner = winner;
        if winner.is_some() {
            self.phase = Phase::Finished;
        } else if self.phase != Phase::Finished {
            self.phase = Phase::Playing;
        }
    }

    pub fn is_my_turn(&self) -> bool {
        self.phase == Phase::Playing && self.turn.as_ref() == Some(&self.device_id)
    }

    pub fn result(&self) -> Option<SessionResult> {
        match self.winner? {
            Outcome::Draw => Some(SessionResult::Draw),
            Outcome::Winner(mark) if Some(mark) == self.my_mark => Some(SessionResult::Won),
            Outcome::Winner(_) => Some(SessionResult::Lost),
        }
    }

    /// Winning line on the current board, computed locally.
    pub fn winning_line(&self) -> Option<WinLine> {
        self.board.as_ref()?.winning_line()
    }

    pub fn move_count(&self) -> usize {
        self.board.as_ref().map_or(0, Board::filled)
    }

    /// Reject a move before sending it.
    pub fn check_move(&self, x: usize, y: usize) -> GameResult<()> {
        let board = self.board.as_ref().ok_or(GameError::NotYourTurn)?;
        if self.phase == Phase::Finished {
            return Err(GameError::MatchFinished);
        }
        if !self.is_my_turn() {
            return Err(GameError::NotYourTurn);
        }
        if !board.in_bounds(x, y) {
            return Err(GameError::OutOfBounds { x, y });
        }
        if board.get(x, y).is_some() {
            return Err(GameError::CellOccupied { x, y });
        }
        Ok(())
    }
}

fn device_with(players: &Players, mark: Mark) -> Option<DeviceId> {
    players
        .iter()
        .find(|(_, m)| **m == mark)
        .map(|(id, _)| id.clone())
}
