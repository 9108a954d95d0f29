//! Read-only board snapshots for the rendering adapter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::player::{JuryVote, Participant};
use super::session::{Session, SessionPhase};

/// Active player as the renderer sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: Participant,
    pub name: String,
    pub x: u32,
    pub y: u32,
    /// Position in tile-label form (e.g. "c14")
    pub tile: String,
    pub avatar: String,
    pub color: String,
    pub health: u32,
    pub points: u32,
}

/// Jury member as the renderer sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurorView {
    pub id: Participant,
    pub name: String,
    pub avatar: String,
    pub color: String,
    pub can_vote: bool,
}

/// Everything needed to paint the grid and scoreboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub board_size: u32,
    pub players: Vec<PlayerView>,
    pub jury: Vec<JurorView>,
    pub pending_votes: Vec<JuryVote>,
    pub winner: Option<Participant>,
    pub started_at: Option<DateTime<Utc>>,
}

impl BoardSnapshot {
    pub fn capture(session: &Session) -> Self {
        let registry = session.registry();

        let players = registry
            .players()
            .iter()
            .map(|p| PlayerView {
                id: p.id.clone(),
                name: p.name.clone(),
                x: p.position.x,
                y: p.position.y,
                tile: p.position.label(),
                avatar: p.avatar.clone(),
                color: p.color.clone(),
                health: p.health,
                points: p.points,
            })
            .collect();

        let jury = registry
            .jury()
            .iter()
            .map(|j| JurorView {
                id: j.id.clone(),
                name: j.name.clone(),
                avatar: j.avatar.clone(),
                color: j.color.clone(),
                can_vote: j.can_vote,
            })
            .collect();

        Self {
            session_id: session.id(),
            phase: session.phase(),
            board_size: session.config().board_size,
            players,
            jury,
            pending_votes: registry.votes().to_vec(),
            winner: session.winner().map(str::to_string),
            started_at: session.started_at(),
        }
    }

    /// Plain-text scoreboard, highest points first
    pub fn scoreboard(&self) -> String {
        let mut players: Vec<&PlayerView> = self.players.iter().collect();
        players.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));

        let mut lines = Vec::with_capacity(players.len() + self.jury.len() + 2);
        for p in players {
            lines.push(format!(
                "{:<12} {:>4}  hp {}  pts {}",
                p.name, p.tile, p.health, p.points
            ));
        }
        if !self.jury.is_empty() {
            lines.push("-- jury --".to_string());
            for j in &self.jury {
                let mark = if j.can_vote { "can vote" } else { "voted" };
                lines.push(format!("{:<12} {}", j.name, mark));
            }
        }
        if lines.is_empty() {
            lines.push("No players yet".to_string());
        }
        lines.join("\n")
    }
}
