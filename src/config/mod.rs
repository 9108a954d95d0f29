//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::game::geometry::MAX_BOARD_SIZE;
use crate::game::GameConfig;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Origins allowed to read the board (comma-separated)
    pub renderer_origin: String,

    /// Shared secret the chat transport signs command requests with
    pub dispatch_secret: String,
    /// Maximum age of a signed command, in seconds
    pub signature_tolerance_secs: i64,
    /// Commands per second allowed for one participant
    pub command_rate_limit: u32,

    /// Game rules
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let defaults = GameConfig::default();
        let game = validate_game(GameConfig {
            board_size: parse_or("BOARD_SIZE", defaults.board_size)?,
            starting_health: parse_or("STARTING_HEALTH", defaults.starting_health)?,
            starting_points: parse_or("STARTING_POINTS", defaults.starting_points)?,
            max_name_len: parse_or("MAX_NAME_LEN", defaults.max_name_len)?,
            ..defaults
        })?;

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")),
            renderer_origin: env::var("RENDERER_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),

            dispatch_secret: env::var("DISPATCH_SECRET")
                .map_err(|_| ConfigError::Missing("DISPATCH_SECRET"))?,
            signature_tolerance_secs: parse_or("SIGNATURE_TOLERANCE_SECS", 300)?,
            command_rate_limit: parse_or("COMMAND_RATE_LIMIT", 5)?,

            game,
        })
    }
}

/// Read `key` as a `T`, using `default` when unset
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

/// Reject rules the board cannot be played with.
///
/// A player must join with at least 1 health, since reaching 0 is what
/// sends them to the jury.
fn validate_game(game: GameConfig) -> Result<GameConfig, ConfigError> {
    if !(2..=MAX_BOARD_SIZE).contains(&game.board_size) {
        return Err(ConfigError::Invalid("BOARD_SIZE"));
    }
    if game.starting_health == 0 {
        return Err(ConfigError::Invalid("STARTING_HEALTH"));
    }
    if game.max_name_len == 0 {
        return Err(ConfigError::Invalid("MAX_NAME_LEN"));
    }
    Ok(game)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_when_unset() {
        let value: u32 = parse_or("GRID_JURY_TEST_UNSET_KEY", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn parse_or_rejects_garbage() {
        env::set_var("GRID_JURY_TEST_GARBAGE_KEY", "twenty");
        let result: Result<u32, _> = parse_or("GRID_JURY_TEST_GARBAGE_KEY", 20);
        assert!(matches!(result, Err(ConfigError::Invalid("GRID_JURY_TEST_GARBAGE_KEY"))));
        env::remove_var("GRID_JURY_TEST_GARBAGE_KEY");
    }

    #[test]
    fn game_rules_are_validated() {
        assert!(validate_game(GameConfig::default()).is_ok());

        let no_health = GameConfig { starting_health: 0, ..GameConfig::default() };
        assert!(matches!(
            validate_game(no_health),
            Err(ConfigError::Invalid("STARTING_HEALTH"))
        ));

        let tiny = GameConfig { board_size: 1, ..GameConfig::default() };
        assert!(matches!(validate_game(tiny), Err(ConfigError::Invalid("BOARD_SIZE"))));

        let huge = GameConfig { board_size: 27, ..GameConfig::default() };
        assert!(matches!(validate_game(huge), Err(ConfigError::Invalid("BOARD_SIZE"))));

        let rich = GameConfig { starting_points: u32::MAX, ..GameConfig::default() };
        assert!(validate_game(rich).is_ok());
    }
}
