//! Error types for board, match and lobby operations.

/// Game errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Board size outside the supported range.
    #[error("board size {size} out of range ({min}..={max})")]
    InvalidSize { size: usize, min: usize, max: usize },

    /// Coordinates outside the board.
    #[error("move out of board: ({x}, {y})")]
    OutOfBounds { x: usize, y: usize },

    /// Target cell already holds a mark.
    #[error("cell occupied: ({x}, {y})")]
    CellOccupied { x: usize, y: usize },

    /// Move or surrender after the match was decided.
    #[error("match already finished")]
    MatchFinished,

    /// Device is not the player to move.
    #[error("not your turn")]
    NotYourTurn,

    /// Device does not take part in the match.
    #[error("device {device_id} is not a player in this match")]
    NotAPlayer { device_id: String },

    /// Device id missing or not registered (used where the caller supplied it in a body or query).
    #[error("invalid or unregistered device_id")]
    InvalidDevice,

    /// Device id in a path that is unknown or has been reaped.
    #[error("device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    /// Match id unknown.
    #[error("match not found: {match_id}")]
    MatchNotFound { match_id: String },

    /// Board rows that do not form a valid square board.
    #[error("malformed board: {reason}")]
    MalformedBoard { reason: String },
}

impl GameError {
    /// HTTP status code for the API layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotYourTurn | Self::NotAPlayer { .. } => 403,

            Self::DeviceNotFound { .. } | Self::MatchNotFound { .. } => 404,

            Self::InvalidSize { .. }
            | Self::OutOfBounds { .. }
            | Self::CellOccupied { .. }
            | Self::MatchFinished
            | Self::InvalidDevice
            | Self::MalformedBoard { .. } => 400,
        }
    }
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GameError::NotYourTurn.status_code(), 403);
        assert_eq!(GameError::CellOccupied { x: 0, y: 0 }.status_code(), 400);
        assert_eq!(
            GameError::MatchNotFound {
                match_id: "m".into()
            }
            .status_code(),
            404
        );
        assert_eq!(GameError::InvalidDevice.status_code(), 400);
    }

    #[test]
    fn test_error_display() {
        let err = GameError::InvalidSize {
            size: 9,
            min: 3,
            max: 7,
        };
        assert_eq!(err.to_string(), "board size 9 out of range (3..=7)");
        assert_eq!(
            GameError::OutOfBounds { x: 3, y: 1 }.to_string(),
            "move out of board: (3, 1)"
        );
    }
}
