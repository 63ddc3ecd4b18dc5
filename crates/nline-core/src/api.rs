//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Outcome};
use crate::game::{DeviceId, MatchId, Players};

/// Body of `POST /devices`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Response of `POST /devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub device_id: DeviceId,
}

/// Response of `GET /devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceListResponse {
    pub connected_devices: Vec<DeviceId>,
}

/// Response of `GET /devices/{id}/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub connected: bool,
    #[serde(default)]
    pub alias: String,
    pub wins: u32,
    pub losses: u32,
    /// `wins / max(1, wins + losses)`.
    pub ratio: f64,
}

/// Body of `POST /matches`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub device_id: DeviceId,
    /// Requested board size; any integer or numeric string, clamped by the lobby.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_size"
    )]
    pub size: Option<i64>,
}

fn lenient_size<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Option::<Size>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Size::Int(n)) => Ok(Some(n)),
        Some(Size::Float(f)) if f.is_finite() => Ok(Some(f.trunc() as i64)),
        Some(Size::Float(f)) => Err(serde::de::Error::custom(format!("invalid size: {f}"))),
        Some(Size::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid size: {text:?}"))),
    }
}

/// Pairing handed to both players (201 from `POST /matches`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAssignment {
    pub match_id: MatchId,
    pub players: Players,
    pub board_size: usize,
}

/// 202 body from `POST /matches`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingResponse {
    pub message: String,
}

/// Response of `GET /matches/waiting-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WaitingStatus {
    Waiting {
        board_size: usize,
    },
    Matched {
        match_id: MatchId,
        players: Players,
        board_size: usize,
    },
    Idle,
}

/// Query of `GET /matches/waiting-status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaitingStatusQuery {
    #[serde(default)]
    pub device_id: Option<DeviceId>,
}

/// Body of `POST /matches/{id}/moves`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub device_id: DeviceId,
    pub x: usize,
    pub y: usize,
}

/// Response of `POST /matches/{id}/moves` and `/surrender`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub board: Board,
    pub next_turn: Option<DeviceId>,
    pub winner: Option<Outcome>,
}

/// Body of `POST /matches/{id}/surrender`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurrenderRequest {
    pub device_id: DeviceId,
}

/// Response of `GET /matches/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub board: Board,
    pub turn: DeviceId,
    pub winner: Option<Outcome>,
    pub size: usize,
    pub players: Players,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
