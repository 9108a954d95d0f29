//! Game service - owns the session and its tick task, publishes snapshots

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::util::time::{until_next_local_midnight, TICK_PERIOD};
use crate::ws::protocol::ServerMsg;

use super::actions::{AttackOutcome, TransferOutcome};
use super::error::GameResult;
use super::geometry::Coord;
use super::player::Player;
use super::scheduler::TickScheduler;
use super::session::{GameConfig, Session};
use super::snapshot::BoardSnapshot;

/// Session shared between command handlers and the tick task
pub type SharedSession = Arc<Mutex<Session>>;

/// Entry point used by the command dispatch layer.
///
/// Each call locks the session, runs one state transition or action to
/// completion, releases the lock and then broadcasts the resulting board.
pub struct GameService {
    session: SharedSession,
    scheduler: TickScheduler,
    events: broadcast::Sender<ServerMsg>,
    first_tick: fn() -> Duration,
}

impl GameService {
    pub fn new(config: GameConfig) -> Self {
        Self::from_session(Session::new(config))
    }

    pub fn from_session(session: Session) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            session: Arc::new(Mutex::new(session)),
            scheduler: TickScheduler::new(),
            events,
            first_tick: until_next_local_midnight,
        }
    }

    /// Override how long after `start` the first tick fires
    pub fn with_first_tick(mut self, first_tick: fn() -> Duration) -> Self {
        self.first_tick = first_tick;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(&self.session.lock())
    }

    pub fn ticking(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn create_session(&self) -> bool {
        self.transition(Session::create)
    }

    pub fn reset_session(&self) -> bool {
        self.scheduler.cancel();
        self.transition(Session::reset)
    }

    pub fn destroy_session(&self) -> bool {
        self.scheduler.cancel();
        self.transition(Session::destroy)
    }

    pub fn start_session(&self) -> bool {
        let started = self.transition(Session::start);
        if started {
            let first_delay = (self.first_tick)();
            info!(
                first_tick_in_secs = first_delay.as_secs(),
                "Scheduling daily tick"
            );
            self.scheduler.start(
                self.session.clone(),
                self.events.clone(),
                first_delay,
                TICK_PERIOD,
            );
        }
        started
    }

    pub fn join(&self, id: &str, name: &str) -> GameResult<Player> {
        self.act(|session| session.join(id, name))
    }

    pub fn leave(&self, id: &str) -> GameResult<Player> {
        self.act(|session| session.leave(id))
    }

    pub fn move_player(&self, id: &str, tile: &str) -> GameResult<Coord> {
        self.act(|session| session.move_player(id, tile))
    }

    pub fn attack(&self, id: &str, tile: &str, shots: u32) -> GameResult<AttackOutcome> {
        let outcome = self.act(|session| session.attack(id, tile, shots))?;

        if outcome.eliminated {
            let _ = self.events.send(ServerMsg::Eliminated {
                participant: outcome.target.id.clone(),
                name: outcome.target.name.clone(),
            });
        }
        if let Some(winner) = &outcome.winner {
            self.scheduler.cancel();
            let _ = self.events.send(ServerMsg::Winner {
                participant: winner.id.clone(),
                name: winner.name.clone(),
            });
        }
        Ok(outcome)
    }

    pub fn transfer(&self, id: &str, tile: &str, shots: u32) -> GameResult<TransferOutcome> {
        self.act(|session| session.transfer(id, tile, shots))
    }

    pub fn vote(&self, id: &str, target: &str) -> GameResult<Player> {
        self.act(|session| session.vote(id, target))
    }

    fn transition(&self, op: fn(&mut Session) -> bool) -> bool {
        let (changed, snapshot) = {
            let mut session = self.session.lock();
            let changed = op(&mut *session);
            (changed, BoardSnapshot::capture(&session))
        };

        if changed {
            self.publish(snapshot);
        } else {
            warn!(phase = ?snapshot.phase, "Session transition refused");
        }
        changed
    }

    fn act<T>(&self, op: impl FnOnce(&mut Session) -> GameResult<T>) -> GameResult<T> {
        let (value, snapshot) = {
            let mut session = self.session.lock();
            let value = op(&mut *session)?;
            (value, BoardSnapshot::capture(&session))
        };
        self.publish(snapshot);
        Ok(value)
    }

    fn publish(&self, snapshot: BoardSnapshot) {
        // No subscribers is fine
        let _ = self.events.send(ServerMsg::Snapshot { snapshot });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::error::GameError;
    use crate::game::session::SessionPhase;

    fn service() -> GameService {
        GameService::from_session(Session::with_seed(GameConfig::default(), 21))
            .with_first_tick(|| Duration::from_secs(30))
    }

    #[tokio::test(start_paused = true)]
    async fn start_schedules_tick_and_destroy_cancels() {
        let service = service();
        assert!(service.create_session());
        assert!(!service.create_session());
        assert!(!service.start_session());

        service.join("1", "alice").unwrap();
        service.join("2", "bob").unwrap();
        assert!(service.start_session());
        assert!(service.ticking());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(service.snapshot().players.iter().all(|p| p.points == 2));

        assert!(service.destroy_session());
        assert!(!service.ticking());
        assert_eq!(service.snapshot().phase, SessionPhase::Destroyed);
        assert!(service.snapshot().players.is_empty());
        assert_eq!(service.join("1", "alice"), Err(GameError::SessionNotInitialized));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_reopens_lobby() {
        let service = service();
        service.create_session();
        service.join("1", "alice").unwrap();
        service.join("2", "bob").unwrap();
        service.start_session();

        assert!(service.reset_session());
        assert!(!service.ticking());
        assert_eq!(service.snapshot().phase, SessionPhase::Lobby);
        assert!(service.snapshot().players.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn actions_publish_snapshots() {
        let service = service();
        let mut rx = service.subscribe();

        service.create_session();
        assert!(matches!(rx.recv().await, Ok(ServerMsg::Snapshot { .. })));

        service.join("1", "alice").unwrap();
        match rx.recv().await {
            Ok(ServerMsg::Snapshot { snapshot }) => assert_eq!(snapshot.players.len(), 1),
            other => panic!("unexpected message: {other:?}"),
        }

        assert!(service.leave("9").is_err());
        assert!(rx.try_recv().is_err());
    }
}
