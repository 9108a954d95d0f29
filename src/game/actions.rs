//! Player actions: validated against the session, then applied as a unit
//!
//! Every entry point checks the session phase first, then validates all of its
//! inputs, and only mutates the registry once nothing can fail any more.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::info;

use super::appearance::{self, AVATARS};
use super::error::{GameError, GameResult};
use super::geometry::{self, ActionKind, Coord};
use super::player::Player;
use super::session::Session;

/// Result of an attack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackOutcome {
    /// Target as it stands after the hit
    pub target: Player,
    /// Target ran out of health and joined the jury
    pub eliminated: bool,
    /// The attack left a single player standing
    pub won: bool,
    /// The last player standing, when `won`
    pub winner: Option<Player>,
}

/// Result of a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub target: Player,
    pub amount: u32,
}

impl Session {
    pub fn join(&mut self, id: &str, name: &str) -> GameResult<Player> {
        self.require_lobby()?;

        if self.registry.contains(id) {
            return Err(GameError::AlreadyJoined);
        }

        let capacity = appearance::capacity(self.config.board_size);
        if self.registry.player_count() >= capacity {
            return Err(GameError::LobbyFull { capacity });
        }

        validate_name(name, self.config.max_name_len)?;
        if self.registry.name_taken(name) {
            return Err(GameError::NameTaken(name.to_string()));
        }

        let avatar = appearance::pick_unused(&mut self.rng, AVATARS, &self.registry.used_avatars());
        let color = appearance::pick_unused(
            &mut self.rng,
            appearance::player_colors(),
            &self.registry.used_colors(),
        );
        let position = appearance::pick_free_tile(
            &mut self.rng,
            self.config.board_size,
            &self.registry.occupied_tiles(),
        );

        // Capacity is bounded by every pool, so all three draws succeed.
        let (Some(avatar), Some(color), Some(position)) = (avatar, color, position) else {
            debug_assert!(false, "assignment pools exhausted below capacity");
            return Err(GameError::LobbyFull { capacity });
        };

        let player = Player::new(
            id.to_string(),
            name.to_string(),
            avatar.to_string(),
            color.to_string(),
            position,
            self.config.starting_health,
            self.config.starting_points,
        );
        self.registry.insert_player(player.clone());

        info!(
            session_id = %self.id,
            participant = %id,
            name = %name,
            tile = %position,
            player_count = self.registry.player_count(),
            "Player joined"
        );
        Ok(player)
    }

    pub fn leave(&mut self, id: &str) -> GameResult<Player> {
        self.require_lobby()?;

        let player = self
            .registry
            .remove_player(id)
            .ok_or(GameError::NotAParticipant)?;

        info!(session_id = %self.id, participant = %id, "Player left");
        Ok(player)
    }

    pub fn move_player(&mut self, id: &str, tile: &str) -> GameResult<Coord> {
        self.require_in_progress()?;

        let to = Coord::from_label(tile, self.config.board_size)?;
        let mover = self.registry.player(id).ok_or(GameError::NotAParticipant)?;
        let from = mover.position;

        if let Some(occupant) = self.registry.player_at(to) {
            if occupant.id != id {
                return Err(GameError::TileOccupied(to.label()));
            }
        }

        let price = geometry::cost(ActionKind::Move, from, to);
        let mover = self
            .registry
            .player_mut(id)
            .ok_or(GameError::NotAParticipant)?;
        mover.spend(price)?;
        mover.position = to;

        info!(
            session_id = %self.id,
            participant = %id,
            from = %from,
            to = %to,
            cost = price,
            "Player moved"
        );
        Ok(to)
    }

    pub fn attack(&mut self, id: &str, tile: &str, shots: u32) -> GameResult<AttackOutcome> {
        self.require_in_progress()?;

        let (target_id, price) = self.aim(id, tile, ActionKind::Attack, shots)?;
        self.registry
            .player_mut(id)
            .ok_or(GameError::NotAParticipant)?
            .spend(price)?;

        let target = self
            .registry
            .player_mut(&target_id)
            .ok_or_else(|| GameError::TargetTileEmpty(tile.to_string()))?;
        target.health = target.health.saturating_sub(shots);
        let target = target.clone();

        info!(
            session_id = %self.id,
            participant = %id,
            target = %target_id,
            shots,
            cost = price,
            health = target.health,
            "Player attacked"
        );

        if target.health > 0 {
            return Ok(AttackOutcome {
                target,
                eliminated: false,
                won: false,
                winner: None,
            });
        }

        self.registry.eliminate(&target_id);
        info!(session_id = %self.id, participant = %target_id, "Player eliminated to jury");

        let winner = match self.registry.players() {
            [last] => Some(last.clone()),
            _ => None,
        };
        if let Some(last) = &winner {
            self.winner = Some(last.id.clone());
            info!(session_id = %self.id, participant = %last.id, "Game won");
        }

        Ok(AttackOutcome {
            target,
            eliminated: true,
            won: winner.is_some(),
            winner,
        })
    }

    pub fn transfer(&mut self, id: &str, tile: &str, shots: u32) -> GameResult<TransferOutcome> {
        self.require_in_progress()?;

        let (target_id, price) = self.aim(id, tile, ActionKind::Transfer, shots)?;
        self.registry
            .player_mut(id)
            .ok_or(GameError::NotAParticipant)?
            .spend(price)?;

        let target = self
            .registry
            .player_mut(&target_id)
            .ok_or_else(|| GameError::TargetTileEmpty(tile.to_string()))?;
        target.points = target.points.saturating_add(shots);
        let target = target.clone();

        info!(
            session_id = %self.id,
            participant = %id,
            target = %target_id,
            amount = shots,
            cost = price,
            "Points transferred"
        );
        Ok(TransferOutcome {
            target,
            amount: shots,
        })
    }

    /// Resolve `target` (mention first, then display name) and cast a vote
    pub fn vote(&mut self, id: &str, target: &str) -> GameResult<Player> {
        self.require_in_progress()?;

        let juror = self.registry.juror(id).ok_or(GameError::NotAJuryMember)?;
        if !juror.can_vote {
            return Err(GameError::AlreadyVoted);
        }

        let target = target.trim();
        let resolved = parse_mention(target)
            .and_then(|mentioned| self.registry.player(mentioned))
            .or_else(|| self.registry.player_named(target))
            .cloned()
            .ok_or_else(|| GameError::UnknownVoteTarget(target.to_string()))?;

        let votes = self.registry.record_vote(&resolved.id);
        if let Some(juror) = self.registry.juror_mut(id) {
            juror.can_vote = false;
        }

        info!(
            session_id = %self.id,
            participant = %id,
            target = %resolved.id,
            votes,
            "Jury vote cast"
        );
        Ok(resolved)
    }

    /// Shared validation for attack and transfer: the target on `tile` and
    /// the total price of `shots` repetitions
    fn aim(&self, id: &str, tile: &str, kind: ActionKind, shots: u32) -> GameResult<(String, u32)> {
        let actor = self.registry.player(id).ok_or(GameError::NotAParticipant)?;
        let at = Coord::from_label(tile, self.config.board_size)?;
        let target = self
            .registry
            .player_at(at)
            .ok_or_else(|| GameError::TargetTileEmpty(at.label()))?;

        if target.id == actor.id {
            return Err(GameError::SelfTarget);
        }

        let price = geometry::cost(kind, actor.position, at).saturating_mul(shots);
        if price > actor.points {
            return Err(GameError::InsufficientPoints {
                needed: price,
                available: actor.points,
            });
        }

        Ok((target.id.clone(), price))
    }
}

fn validate_name(name: &str, max_len: usize) -> GameResult<()> {
    static NAME: OnceLock<Regex> = OnceLock::new();
    let pattern = NAME.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid name regex"));

    if name.chars().count() > max_len {
        return Err(GameError::NameTooLong { max: max_len });
    }
    if !pattern.is_match(name) {
        return Err(GameError::NameInvalidCharacters);
    }
    Ok(())
}

/// Extract the participant id from a `<@!123456789012345678>` mention
pub fn parse_mention(text: &str) -> Option<&str> {
    static MENTION: OnceLock<Regex> = OnceLock::new();
    let pattern = MENTION.get_or_init(|| Regex::new(r"^<@!(\d{18})>$").expect("valid mention regex"));

    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
