//! Recurring wall-clock task that drives the daily tick

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::util::time::{split_delay, MAX_TIMER_DELAY};
use crate::ws::protocol::ServerMsg;

use super::service::SharedSession;
use super::snapshot::BoardSnapshot;

/// Owns the background tick task, at most one at a time
pub struct TickScheduler {
    task: Mutex<Option<JoinHandle<()>>>,
    max_delay: Duration,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::with_max_delay(MAX_TIMER_DELAY)
    }

    /// Scheduler whose individual timer waits never exceed `max_delay`
    pub fn with_max_delay(max_delay: Duration) -> Self {
        Self {
            task: Mutex::new(None),
            max_delay,
        }
    }

    /// Spawn the tick task, replacing any running one.
    ///
    /// The first tick fires after `first_delay`, then every `period`. The
    /// task stops on its own once the session no longer accepts ticks.
    pub fn start(
        &self,
        session: SharedSession,
        events: broadcast::Sender<ServerMsg>,
        first_delay: Duration,
        period: Duration,
    ) {
        let max_delay = self.max_delay;
        let handle = tokio::spawn(async move {
            let mut delay = first_delay;
            loop {
                for wait in split_delay(delay, max_delay) {
                    tokio::time::sleep(wait).await;
                }

                let applied = {
                    let mut session = session.lock();
                    session
                        .apply_tick()
                        .map(|report| (report, BoardSnapshot::capture(&session)))
                };

                let Some((report, snapshot)) = applied else {
                    debug!("Session no longer running, tick task exiting");
                    break;
                };

                let _ = events.send(ServerMsg::Tick { report });
                let _ = events.send(ServerMsg::Snapshot { snapshot });
                delay = period;
            }
        });

        if let Some(previous) = self.task.lock().replace(handle) {
            previous.abort();
        }
        info!(
            first_delay_secs = first_delay.as_secs(),
            period_secs = period.as_secs(),
            "Tick scheduler started"
        );
    }

    /// Abort the pending wait or running tick task. Returns true if one was live.
    pub fn cancel(&self) -> bool {
        match self.task.lock().take() {
            Some(handle) => {
                let live = !handle.is_finished();
                handle.abort();
                if live {
                    info!("Tick scheduler cancelled");
                }
                live
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
