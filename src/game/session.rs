//! Session lifecycle state machine

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::error::{GameError, GameResult};
use super::player::Participant;
use super::registry::Registry;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session has been created yet
    Uninitialized,
    /// Lobby open, players may join and leave
    Lobby,
    /// Game running, membership frozen
    InProgress,
    /// Torn down; all state released
    Destroyed,
}

/// Tunable game rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Width and height of the square board
    pub board_size: u32,
    /// Health a player joins with
    pub starting_health: u32,
    /// Action points a player joins with
    pub starting_points: u32,
    /// Maximum display name length in characters
    pub max_name_len: usize,
    /// Jury votes needed per bonus point
    pub votes_per_point: u32,
    /// Players needed before the game can start
    pub min_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 20,
            starting_health: 3,
            starting_points: 1,
            max_name_len: 12,
            votes_per_point: 3,
            min_players: 2,
        }
    }
}

/// The game session (owned by the game service)
#[derive(Debug)]
pub struct Session {
    pub(super) id: Uuid,
    pub(super) phase: SessionPhase,
    pub(super) registry: Registry,
    pub(super) config: GameConfig,
    pub(super) rng: ChaCha8Rng,
    pub(super) winner: Option<Participant>,
    pub(super) started_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        Self::with_seed(config, rand::random::<u64>())
    }

    /// Session whose random assignments are reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            id: Uuid::nil(),
            phase: SessionPhase::Uninitialized,
            registry: Registry::new(),
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            winner: None,
            started_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.phase, SessionPhase::Lobby | SessionPhase::InProgress)
    }

    /// Open a fresh lobby. Returns false if a session is already live.
    pub fn create(&mut self) -> bool {
        if self.is_initialized() {
            return false;
        }

        self.id = Uuid::new_v4();
        self.phase = SessionPhase::Lobby;
        self.registry.clear();
        self.winner = None;
        self.started_at = None;

        info!(session_id = %self.id, "Game session created");
        true
    }

    /// Close the lobby and begin play. Needs enough players in the lobby.
    pub fn start(&mut self) -> bool {
        if self.phase != SessionPhase::Lobby {
            return false;
        }
        if self.registry.player_count() < self.config.min_players {
            return false;
        }

        self.phase = SessionPhase::InProgress;
        self.started_at = Some(Utc::now());

        info!(
            session_id = %self.id,
            player_count = self.registry.player_count(),
            "Game session started"
        );
        true
    }

    /// Release all state. Returns true if a live session was torn down.
    pub fn destroy(&mut self) -> bool {
        let was_live = self.is_initialized();

        self.phase = SessionPhase::Destroyed;
        self.registry.clear();
        self.winner = None;
        self.started_at = None;

        if was_live {
            info!(session_id = %self.id, "Game session destroyed");
        }
        was_live
    }

    pub fn reset(&mut self) -> bool {
        self.destroy();
        self.create()
    }

    /// Guard for lobby-only verbs (join, leave)
    pub(super) fn require_lobby(&self) -> GameResult<()> {
        match self.phase {
            SessionPhase::Lobby => Ok(()),
            SessionPhase::InProgress => Err(GameError::SessionInProgress),
            SessionPhase::Uninitialized | SessionPhase::Destroyed => {
                Err(GameError::SessionNotInitialized)
            }
        }
    }

    /// Guard for play verbs (move, attack, transfer, vote)
    pub(super) fn require_in_progress(&self) -> GameResult<()> {
        match self.phase {
            SessionPhase::InProgress if self.winner.is_none() => Ok(()),
            SessionPhase::InProgress | SessionPhase::Lobby => Err(GameError::SessionNotInProgress),
            SessionPhase::Uninitialized | SessionPhase::Destroyed => {
                Err(GameError::SessionNotInitialized)
            }
        }
    }
}
