//! Board entities: active players, jury members and pending votes

use serde::{Deserialize, Serialize};

use super::geometry::Coord;

/// Opaque chat-transport identifier of a participant
pub type Participant = String;

/// A participant alive on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: Participant,
    pub name: String,
    pub avatar: String,
    pub color: String,
    pub position: Coord,
    pub health: u32,
    pub points: u32,
}

impl Player {
    pub fn new(
        id: Participant,
        name: String,
        avatar: String,
        color: String,
        position: Coord,
        health: u32,
        points: u32,
    ) -> Self {
        Self {
            id,
            name,
            avatar,
            color,
            position,
            health,
            points,
        }
    }

    /// Debit `amount` points, failing without change if the balance is short
    pub fn spend(&mut self, amount: u32) -> Result<(), super::GameError> {
        if amount > self.points {
            return Err(super::GameError::InsufficientPoints {
                needed: amount,
                available: self.points,
            });
        }
        self.points -= amount;
        Ok(())
    }
}

/// An eliminated player who now votes on the survivors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JuryMember {
    pub id: Participant,
    pub name: String,
    pub avatar: String,
    pub color: String,
    pub can_vote: bool,
}

impl From<Player> for JuryMember {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            name: player.name,
            avatar: player.avatar,
            color: player.color,
            can_vote: true,
        }
    }
}

/// Votes accumulated against one active player since the last tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JuryVote {
    pub target: Participant,
    pub votes: u32,
}
