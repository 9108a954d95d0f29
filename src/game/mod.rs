//! Grid Jury game core

pub mod actions;
pub mod appearance;
pub mod error;
pub mod geometry;
pub mod player;
pub mod registry;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod snapshot;
pub mod tick;

pub use error::{GameError, GameResult};
pub use service::{GameService, SharedSession};
pub use session::{GameConfig, Session, SessionPhase};
pub use snapshot::BoardSnapshot;
