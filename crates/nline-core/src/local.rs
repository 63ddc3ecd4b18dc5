//! Hot-seat game: two players sharing one board, X first.

use std::fmt;

use crate::board::{Board, Mark, Outcome, WinLine};
use crate::error::GameResult;

/// Status line of a local game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalStatus {
    NextPlayer(Mark),
    Won(Mark),
    Draw,
}

impl fmt::Display for LocalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NextPlayer(mark) => write!(f, "Next player: {mark}"),
            Self::Won(mark) => write!(f, "Winner: {mark}!"),
            Self::Draw => write!(f, "Draw!"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalGame {
    board: Board,
    next: Mark,
    outcome: Option<Outcome>,
}

impl LocalGame {
    pub fn new(size: usize) -> GameResult<Self> {
        Ok(Self {
            board: Board::new(size)?,
            next: Mark::X,
            outcome: None,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Play the current mark at `(row, col)`.
    ///
    /// Returns `Ok(false)` without changing anything once the game is over.
    pub fn play(&mut self, row: usize, col: usize) -> GameResult<bool> {
        if self.outcome.is_some() {
            return Ok(false);
        }
        self.board.place(row, col, self.next)?;
        self.outcome = self.board.outcome_after(row, col);
        self.next = self.next.opponent();
        Ok(true)
    }

    pub fn status(&self) -> LocalStatus {
        match self.outcome {
            Some(Outcome::Winner(mark)) => LocalStatus::Won(mark),
            Some(Outcome::Draw) => LocalStatus::Draw,
            None => LocalStatus::NextPlayer(self.next),
        }
    }

    pub fn winning_line(&self) -> Option<WinLine> {
        self.board.winning_line()
    }

    /// Clear the board, keeping its size.
    pub fn reset(&mut self) {
        self.board = Board::clamped(self.board.size());
        self.next = Mark::X;
        self.outcome = None;
    }
}
