//! Authoritative lists of active players, jurors and pending votes

use super::geometry::Coord;
use super::player::{JuryMember, JuryVote, Player};

/// Entity registry owned by a session
#[derive(Debug, Clone, Default)]
pub struct Registry {
    players: Vec<Player>,
    jury: Vec<JuryMember>,
    votes: Vec<JuryVote>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn jury(&self) -> &[JuryMember] {
        &self.jury
    }

    pub fn votes(&self) -> &[JuryVote] {
        &self.votes
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Whether `id` appears in either pool
    pub fn contains(&self, id: &str) -> bool {
        self.player(id).is_some() || self.juror(id).is_some()
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_at(&self, position: Coord) -> Option<&Player> {
        self.players.iter().find(|p| p.position == position)
    }

    /// Case-insensitive lookup by display name
    pub fn player_named(&self, name: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn juror(&self, id: &str) -> Option<&JuryMember> {
        self.jury.iter().find(|j| j.id == id)
    }

    pub fn juror_mut(&mut self, id: &str) -> Option<&mut JuryMember> {
        self.jury.iter_mut().find(|j| j.id == id)
    }

    pub fn name_taken(&self, name: &str) -> bool {
        self.players
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.jury.iter().map(|j| j.name.as_str()))
            .any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn occupied_tiles(&self) -> Vec<Coord> {
        self.players.iter().map(|p| p.position).collect()
    }

    pub fn used_avatars(&self) -> Vec<&str> {
        self.players.iter().map(|p| p.avatar.as_str()).collect()
    }

    pub fn used_colors(&self) -> Vec<&str> {
        self.players.iter().map(|p| p.color.as_str()).collect()
    }

    pub fn insert_player(&mut self, player: Player) {
        debug_assert!(!self.contains(&player.id), "participant already registered");
        debug_assert!(
            self.player_at(player.position).is_none(),
            "tile already occupied"
        );
        self.players.push(player);
    }

    pub fn remove_player(&mut self, id: &str) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(index))
    }

    /// Move an active player into the jury pool with a fresh vote
    pub fn eliminate(&mut self, id: &str) -> Option<&JuryMember> {
        let player = self.remove_player(id)?;
        self.jury.push(JuryMember::from(player));
        self.jury.last()
    }

    /// Add one vote against `target`
    pub fn record_vote(&mut self, target: &str) -> u32 {
        match self.votes.iter_mut().find(|v| v.target == target) {
            Some(entry) => {
                entry.votes = entry.votes.saturating_add(1);
                entry.votes
            }
            None => {
                self.votes.push(JuryVote {
                    target: target.to_string(),
                    votes: 1,
                });
                1
            }
        }
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn jury_mut(&mut self) -> impl Iterator<Item = &mut JuryMember> {
        self.jury.iter_mut()
    }

    pub fn take_votes(&mut self) -> Vec<JuryVote> {
        std::mem::take(&mut self.votes)
    }

    pub fn clear(&mut self) {
        self.players.clear();
        self.jury.clear();
        self.votes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, x: u32, y: u32) -> Player {
        Player::new(
            id.to_string(),
            format!("name_{id}"),
            "knight".to_string(),
            "#f38ba8".to_string(),
            Coord::new(x, y),
            3,
            1,
        )
    }

    #[test]
    fn eliminate_moves_player_to_jury() {
        let mut registry = Registry::new();
        registry.insert_player(player("a", 0, 0));
        registry.insert_player(player("b", 1, 0));

        let juror = registry.eliminate("a").unwrap();
        assert_eq!(juror.id, "a");
        assert!(juror.can_vote);

        assert!(registry.player("a").is_none());
        assert!(registry.juror("a").is_some());
        assert!(registry.contains("a"));
        assert_eq!(registry.player_count(), 1);
        assert!(registry.eliminate("a").is_none());
        assert_eq!(registry.jury().len(), 1);
    }

    #[test]
    fn votes_accumulate_per_target() {
        let mut registry = Registry::new();
        assert_eq!(registry.record_vote("a"), 1);
        assert_eq!(registry.record_vote("a"), 2);
        assert_eq!(registry.record_vote("b"), 1);
        assert_eq!(registry.votes().len(), 2);

        let taken = registry.take_votes();
        assert_eq!(taken.len(), 2);
        assert!(registry.votes().is_empty());
    }

    #[test]
    fn name_lookup_ignores_case() {
        let mut registry = Registry::new();
        registry.insert_player(player("a", 0, 0));
        assert!(registry.name_taken("NAME_A"));
        assert_eq!(registry.player_named("Name_A").map(|p| p.id.as_str()), Some("a"));
        assert!(registry.player_named("nobody").is_none());
    }
}
