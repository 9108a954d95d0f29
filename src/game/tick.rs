//! Daily batch update: point grants, jury vote reset and vote bonuses

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::player::Participant;
use super::session::{Session, SessionPhase};

/// Bonus points paid out to one player from jury votes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteBonus {
    pub target: Participant,
    pub votes: u32,
    pub bonus: u32,
}

/// What a tick changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Active players that received the daily point
    pub players_granted: usize,
    /// Jury members whose vote was restored
    pub jurors_restored: usize,
    /// Vote bonuses paid to still-active players
    pub bonuses: Vec<VoteBonus>,
}

impl Session {
    /// Apply one tick. Does nothing unless a game is being played.
    pub fn apply_tick(&mut self) -> Option<TickReport> {
        if self.phase != SessionPhase::InProgress || self.winner.is_some() {
            debug!(phase = ?self.phase, "Tick skipped, no game in progress");
            return None;
        }

        let mut report = TickReport::default();

        for player in self.registry.players_mut() {
            player.points = player.points.saturating_add(1);
            report.players_granted += 1;
        }

        for juror in self.registry.jury_mut() {
            juror.can_vote = true;
            report.jurors_restored += 1;
        }

        let divisor = self.config.votes_per_point.max(1);
        for entry in self.registry.take_votes() {
            let Some(player) = self.registry.player_mut(&entry.target) else {
                continue;
            };
            let bonus = entry.votes / divisor;
            player.points = player.points.saturating_add(bonus);
            report.bonuses.push(VoteBonus {
                target: entry.target,
                votes: entry.votes,
                bonus,
            });
        }

        info!(
            session_id = %self.id,
            players = report.players_granted,
            jurors = report.jurors_restored,
            bonuses = report.bonuses.len(),
            "Daily tick applied"
        );
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::geometry::Coord;
    use crate::game::player::Player;
    use crate::game::session::GameConfig;

    fn player(id: &str, x: u32) -> Player {
        Player::new(
            id.to_string(),
            id.to_string(),
            "knight".to_string(),
            "#f38ba8".to_string(),
            Coord::new(x, 0),
            3,
            1,
        )
    }

    fn running() -> Session {
        let mut session = Session::with_seed(GameConfig::default(), 3);
        session.create();
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            session.registry.insert_player(player(id, i as u32));
        }
        session.start();
        session
    }

    #[test]
    fn tick_grants_restores_and_pays_votes() {
        let mut session = running();
        session.registry.eliminate("c");
        session.registry.eliminate("d");
        session.registry.juror_mut("c").unwrap().can_vote = false;

        for _ in 0..7 {
            session.registry.record_vote("a");
        }
        session.registry.record_vote("b");
        session.registry.record_vote("d");
        session.registry.record_vote("d");
        session.registry.record_vote("d");

        let before: Vec<Player> = session.registry().players().to_vec();
        let report = session.apply_tick().unwrap();

        assert_eq!(report.players_granted, 2);
        assert_eq!(report.jurors_restored, 2);
        assert_eq!(
            report.bonuses,
            vec![
                VoteBonus { target: "a".to_string(), votes: 7, bonus: 2 },
                VoteBonus { target: "b".to_string(), votes: 1, bonus: 0 },
            ]
        );

        let a = session.registry().player("a").unwrap();
        let b = session.registry().player("b").unwrap();
        assert_eq!(a.points, before[0].points + 1 + 2);
        assert_eq!(b.points, before[1].points + 1);
        assert!(session.registry().jury().iter().all(|j| j.can_vote));
        assert!(session.registry().votes().is_empty());
    }

    #[test]
    fn tick_saturates_points() {
        let mut session = running();
        session.registry.player_mut("a").unwrap().points = u32::MAX;
        session.registry.eliminate("d");
        for _ in 0..3 {
            session.registry.record_vote("a");
        }

        let report = session.apply_tick().unwrap();
        assert_eq!(report.bonuses[0].bonus, 1);
        assert_eq!(session.registry().player("a").unwrap().points, u32::MAX);
        assert_eq!(session.registry().player("b").unwrap().points, 2);
    }

    #[test]
    fn tick_is_noop_outside_play() {
        let mut session = Session::with_seed(GameConfig::default(), 3);
        assert!(session.apply_tick().is_none());

        session.create();
        session.registry.insert_player(player("a", 0));
        assert!(session.apply_tick().is_none());
        assert_eq!(session.registry().player("a").unwrap().points, 1);
    }
}
