use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use super::config::SessionConfig;
use super::controller::{SessionController, SessionSnapshot, TickOutcome};

pub type SharedController = Arc<Mutex<SessionController>>;

/// Drives a [`SessionController`] from a periodic tokio task.
///
/// At most one countdown task is alive at a time: every start command aborts the
/// previous task before spawning a new one, and dropping the `Countdown` aborts it too.
/// Start commands must be issued from within a tokio runtime.
#[derive(Debug)]
pub struct Countdown {
    controller: SharedController,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new(controller: SessionController, period: Duration) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            period,
            task: None,
        }
    }

    pub fn start_work(&mut self) {
        self.restart(SessionController::start_work);
    }

    pub fn start_break(&mut self) {
        self.restart(SessionController::start_break);
    }

    /// Pauses or resumes. The task keeps ticking; ticks are ignored while suspended.
    pub fn suspend(&self) {
        lock(&self.controller).suspend();
    }

    pub fn update_config(&self, config: SessionConfig) {
        lock(&self.controller).update_config(config);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        lock(&self.controller).snapshot()
    }

    /// True while a countdown task is alive.
    pub fn is_ticking(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops counting down and leaves the session idle with its remaining time.
    pub fn cancel(&mut self) {
        self.abort_task();
        lock(&self.controller).stop();
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn restart(&mut self, start: fn(&mut SessionController)) {
        self.abort_task();
        let generation = {
            let mut controller = lock(&self.controller);
            start(&mut *controller);
            controller.generation()
        };
        self.task = Some(tokio::spawn(run_countdown(
            Arc::clone(&self.controller),
            generation,
            self.period,
        )));
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.abort_task();
    }
}

fn lock(controller: &Mutex<SessionController>) -> MutexGuard<'_, SessionController> {
    controller.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_countdown(controller: SharedController, generation: u64, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let mut session = lock(&controller);
        // A newer start owns the session; an aborted task may still get here once.
        if session.generation() != generation {
            break;
        }
        if let TickOutcome::Completed(phase) = session.tick() {
            tracing::debug!(phase = phase.as_str(), generation, "countdown finished");
            break;
        }
    }
}
