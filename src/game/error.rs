//! Typed failures for every caller-triggered game condition

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

/// Errors raised by the session and action resolver.
///
/// None of these are retried; the dispatcher turns them into a reply and the
/// player has to issue a corrected command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("There is no game session. Create one first")]
    SessionNotInitialized,

    #[error("A game session already exists")]
    SessionAlreadyInitialized,

    #[error("The game is already in progress")]
    SessionInProgress,

    #[error("The game is not in progress")]
    SessionNotInProgress,

    #[error("The lobby is full ({capacity} players)")]
    LobbyFull { capacity: usize },

    #[error("Names can be at most {max} characters long")]
    NameTooLong { max: usize },

    #[error("Names may only contain letters, digits, '_' and '-'")]
    NameInvalidCharacters,

    #[error("The name '{0}' is already taken")]
    NameTaken(String),

    #[error("You have already joined the game")]
    AlreadyJoined,

    #[error("You are not playing in this game")]
    NotAParticipant,

    #[error("'{0}' is not a tile label (expected something like c14)")]
    MalformedTileLabel(String),

    #[error("Tile {0} is outside the board")]
    TileOutOfBounds(String),

    #[error("Tile {0} is already occupied")]
    TileOccupied(String),

    #[error("There is no player on tile {0}")]
    TargetTileEmpty(String),

    #[error("You cannot target your own tile")]
    SelfTarget,

    #[error("Not enough points: {needed} needed, {available} available")]
    InsufficientPoints { needed: u32, available: u32 },

    #[error("Only jury members can vote")]
    NotAJuryMember,

    #[error("You have already voted today")]
    AlreadyVoted,

    #[error("'{0}' is not an active player")]
    UnknownVoteTarget(String),
}

impl GameError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            GameError::SessionNotInitialized => "session_not_initialized",
            GameError::SessionAlreadyInitialized => "session_already_initialized",
            GameError::SessionInProgress => "session_in_progress",
            GameError::SessionNotInProgress => "session_not_in_progress",
            GameError::LobbyFull { .. } => "lobby_full",
            GameError::NameTooLong { .. } => "name_too_long",
            GameError::NameInvalidCharacters => "name_invalid_characters",
            GameError::NameTaken(_) => "name_taken",
            GameError::AlreadyJoined => "already_joined",
            GameError::NotAParticipant => "not_a_participant",
            GameError::MalformedTileLabel(_) => "malformed_tile_label",
            GameError::TileOutOfBounds(_) => "tile_out_of_bounds",
            GameError::TileOccupied(_) => "tile_occupied",
            GameError::TargetTileEmpty(_) => "target_tile_empty",
            GameError::SelfTarget => "self_target",
            GameError::InsufficientPoints { .. } => "insufficient_points",
            GameError::NotAJuryMember => "not_a_jury_member",
            GameError::AlreadyVoted => "already_voted",
            GameError::UnknownVoteTarget(_) => "unknown_vote_target",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GameError::SessionNotInitialized
            | GameError::SessionAlreadyInitialized
            | GameError::SessionInProgress
            | GameError::SessionNotInProgress
            | GameError::LobbyFull { .. }
            | GameError::AlreadyJoined
            | GameError::NameTaken(_)
            | GameError::TileOccupied(_)
            | GameError::AlreadyVoted => StatusCode::CONFLICT,
            GameError::NotAParticipant | GameError::NotAJuryMember => StatusCode::FORBIDDEN,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "ok": false,
            "code": self.code(),
            "error": self.to_string(),
        });

        (self.status(), Json(body)).into_response()
    }
}

pub type GameResult<T> = Result<T, GameError>;
