//! Avatar and colour pools, and random assignment from what is still free

use rand::seq::SliceRandom;
use rand::Rng;

use super::geometry::Coord;

/// Board palette. The leading entries are painted by the renderer itself
/// (background and grid lines) and are never handed to players.
pub const PALETTE: &[&str] = &[
    "#1e1e2e", "#45475a", "#f38ba8", "#fab387", "#f9e2af", "#a6e3a1", "#94e2d5", "#89dceb",
    "#74c7ec", "#89b4fa", "#b4befe", "#cba6f7", "#f5c2e7", "#eba0ac",
];

/// Number of leading palette entries reserved for the board
pub const RESERVED_COLORS: usize = 2;

/// Sprite identifiers understood by the rendering adapter
pub const AVATARS: &[&str] = &[
    "knight", "archer", "mage", "rogue", "cleric", "druid", "bard", "monk", "paladin",
    "ranger", "warlock", "viking", "samurai", "pirate", "golem", "slime",
];

/// Colours players may receive
pub fn player_colors() -> &'static [&'static str] {
    &PALETTE[RESERVED_COLORS..]
}

/// How many players a board of `board_size` can seat
pub fn capacity(board_size: u32) -> usize {
    let tiles = (board_size as usize).saturating_mul(board_size as usize);
    player_colors().len().min(AVATARS.len()).min(tiles)
}

/// Pick one of `pool` not yet in `taken`
pub fn pick_unused<'a, R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[&'a str],
    taken: &[&str],
) -> Option<&'a str> {
    let available: Vec<&'a str> = pool
        .iter()
        .copied()
        .filter(|item| !taken.contains(item))
        .collect();
    available.choose(rng).copied()
}

/// Pick a free tile on a `board_size` square board
pub fn pick_free_tile<R: Rng + ?Sized>(
    rng: &mut R,
    board_size: u32,
    occupied: &[Coord],
) -> Option<Coord> {
    let free: Vec<Coord> = (0..board_size)
        .flat_map(|y| (0..board_size).map(move |x| Coord::new(x, y)))
        .filter(|c| !occupied.contains(c))
        .collect();
    free.choose(rng).copied()
}
