//! Core rules for N-in-a-row on an N×N board.
//!
//! - [`board`]: marks, the board and win detection (rows, columns, both diagonals)
//! - [`game`]: a two-player online match with turn order and surrender
//! - [`lobby`]: device registry, waiting queue, match-making and stats
//! - [`local`]: hot-seat play on one device
//! - [`api`]: JSON bodies shared by server and client
//!
//! # Quick Start
//!
//! ```
//! use chrono::Utc;
//! use nline_core::{Lobby, MatchRequestOutcome};
//!
//! let mut lobby = Lobby::default();
//! let now = Utc::now();
//! let a = lobby.register(Some("ana".into()), now);
//! let b = lobby.register(None, now);
//!
//! lobby.request_match(&a, Some(3), now).unwrap();
//! let MatchRequestOutcome::Matched(assignment) = lobby.request_match(&b, Some(3), now).unwrap() else {
//!     unreachable!()
//! };
//! // b completed the pairing, so b plays X and moves first
//! lobby.make_move(&assignment.match_id, &b, 1, 1, now).unwrap();
//! ```

pub mod api;
pub mod board;
pub mod error;
pub mod game;
pub mod lobby;
pub mod local;

pub use api::{
    DeviceInfo, DeviceListResponse, ErrorBody, MatchAssignment, MatchRequest, MatchState,
    MoveRequest, MoveResponse, RegisterRequest, RegisterResponse, SurrenderRequest,
    WaitingResponse, WaitingStatus, WaitingStatusQuery,
};
pub use board::{clamp_size, Board, Mark, Outcome, WinLine, DEFAULT_SIZE, MAX_SIZE, MIN_SIZE};
pub use error::{GameError, GameResult};
pub use game::{DeviceId, Match, MatchId, MoveResult, Players};
pub use lobby::{Device, Lobby, MatchRequestOutcome, ReapStats, DEFAULT_DISCONNECT_TIMEOUT};
pub use local::{LocalGame, LocalStatus};
