//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::GameService;
use crate::util::rate_limit::CommandRateLimiter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub game: Arc<GameService>,
    pub rate_limiter: Arc<CommandRateLimiter>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let game = GameService::new(config.game.clone());
        Self::with_game(config, game)
    }

    /// State around an already built game service
    pub fn with_game(config: Config, game: GameService) -> Self {
        let rate_limiter = Arc::new(CommandRateLimiter::new(config.command_rate_limit));

        Self {
            config: Arc::new(config),
            game: Arc::new(game),
            rate_limiter,
        }
    }
}
