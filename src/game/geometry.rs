//! Board coordinates, tile labels and the action cost model

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::GameError;

/// Largest board the single-letter column grammar can address
pub const MAX_BOARD_SIZE: u32 = 26;

/// A tile on the board, zero-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
}

impl Coord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Parse a tile label such as `"c14"` into `(2, 13)`.
    ///
    /// The letter selects the column and the 1-indexed number selects the row.
    /// Text that does not match the grammar is `MalformedTileLabel`; a
    /// well-formed label that falls off a `board_size` board is
    /// `TileOutOfBounds`.
    pub fn from_label(label: &str, board_size: u32) -> Result<Self, GameError> {
        let caps = tile_label_regex()
            .captures(label.trim())
            .ok_or_else(|| GameError::MalformedTileLabel(label.to_string()))?;

        let column = caps[1]
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .ok_or_else(|| GameError::MalformedTileLabel(label.to_string()))?;
        let row: u32 = caps[2]
            .parse()
            .map_err(|_| GameError::MalformedTileLabel(label.to_string()))?;

        let x = column as u32 - 'a' as u32;
        if x >= board_size || row == 0 || row > board_size {
            return Err(GameError::TileOutOfBounds(label.to_string()));
        }

        Ok(Self { x, y: row - 1 })
    }

    /// Encode back into the label grammar (`(2, 13)` -> `"c14"`)
    pub fn label(&self) -> String {
        let column = char::from_u32('a' as u32 + self.x).unwrap_or('?');
        format!("{}{}", column, self.y + 1)
    }

    pub fn manhattan(&self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn chebyshev(&self, other: Coord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn tile_label_regex() -> &'static Regex {
    static TILE_LABEL: OnceLock<Regex> = OnceLock::new();
    TILE_LABEL.get_or_init(|| Regex::new(r"^([A-Za-z])(\d{1,2})$").expect("valid tile regex"))
}

/// What a point-spending action does to its target tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Move,
    Attack,
    Transfer,
}

/// Base point cost of acting from `from` on `to`.
///
/// Movement pays by Manhattan distance; attacks and transfers reach
/// diagonally and pay by Chebyshev distance. Repetition is applied by the
/// caller.
pub fn cost(kind: ActionKind, from: Coord, to: Coord) -> u32 {
    match kind {
        ActionKind::Move => from.manhattan(to),
        ActionKind::Attack | ActionKind::Transfer => from.chebyshev(to),
    }
}

/// Parse a user supplied repetition count.
///
/// Anything that is not a positive integer counts as a single shot.
pub fn parse_shots(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trip() {
        let coord = Coord::from_label("c14", 20).unwrap();
        assert_eq!(coord, Coord::new(2, 13));
        assert_eq!(coord.label(), "c14");

        for size in [2, 20, MAX_BOARD_SIZE] {
            for y in 0..size {
                for x in 0..size {
                    let coord = Coord::new(x, y);
                    let label = coord.label();
                    assert_eq!(Coord::from_label(&label, size), Ok(coord), "{label}");
                    assert_eq!(
                        Coord::from_label(&label.to_ascii_uppercase(), size),
                        Ok(coord)
                    );
                }
            }
        }
    }

    #[test]
    fn label_is_case_insensitive() {
        assert_eq!(Coord::from_label("C14", 20).unwrap(), Coord::new(2, 13));
        assert_eq!(Coord::from_label(" c14 ", 20).unwrap(), Coord::new(2, 13));
    }

    #[test]
    fn malformed_labels() {
        for label in ["", "14", "cc14", "c", "c123", "c-1", "é4", "c1x"] {
            assert!(
                matches!(Coord::from_label(label, 20), Err(GameError::MalformedTileLabel(_))),
                "{label} should be malformed"
            );
        }
    }

    #[test]
    fn out_of_bounds_labels() {
        for label in ["u1", "z5", "a0", "a21", "c99"] {
            assert!(
                matches!(Coord::from_label(label, 20), Err(GameError::TileOutOfBounds(_))),
                "{label} should be out of bounds"
            );
        }
        assert!(Coord::from_label("e5", 5).is_ok());
        assert!(Coord::from_label("f5", 5).is_err());
    }

    #[test]
    fn move_cost_is_manhattan() {
        let from = Coord::new(1, 1);
        assert_eq!(cost(ActionKind::Move, from, Coord::new(4, 5)), 7);
        assert_eq!(cost(ActionKind::Move, from, from), 0);
    }

    #[test]
    fn attack_and_transfer_cost_is_chebyshev() {
        let from = Coord::new(1, 1);
        assert_eq!(cost(ActionKind::Attack, from, Coord::new(4, 5)), 4);
        assert_eq!(cost(ActionKind::Transfer, from, Coord::new(2, 2)), 1);
        assert_eq!(cost(ActionKind::Attack, Coord::new(5, 0), Coord::new(0, 0)), 5);
    }

    #[test]
    fn shots_default_to_one() {
        assert_eq!(parse_shots(None), 1);
        assert_eq!(parse_shots(Some("abc")), 1);
        assert_eq!(parse_shots(Some("0")), 1);
        assert_eq!(parse_shots(Some("-2")), 1);
        assert_eq!(parse_shots(Some("3")), 3);
    }
}
