use serde::Serialize;
use std::time::Duration;

use super::config::SessionConfig;
use super::events::{NoopListener, SessionListener};
use super::phase::{Phase, serialize_secs};

/// One countdown step.
pub const TICK_UNIT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Ignored,
    /// Counted down, time left.
    Counted(Duration),
    /// Reached zero; the phase is over and the controller is idle.
    Completed(Phase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub state: RunState,
    #[serde(rename = "remaining_secs", serialize_with = "serialize_secs")]
    pub remaining: Duration,
    pub break_count: u32,
    pub config: SessionConfig,
}

impl SessionSnapshot {
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn is_suspended(&self) -> bool {
        self.state == RunState::Suspended
    }
}

#[derive(Debug, Clone, Copy)]
struct SessionState {
    phase: Phase,
    run: RunState,
    remaining: Duration,
    break_count: u32,
    generation: u64,
}

/// Owns the Pomodoro state machine: phase sequencing, pause/resume and the countdown.
pub struct SessionController {
    config: SessionConfig,
    state: SessionState,
    listener: Box<dyn SessionListener>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(SessionConfig::default(), NoopListener)
    }
}

impl SessionController {
    pub fn new(config: SessionConfig, listener: impl SessionListener + 'static) -> Self {
        Self {
            state: SessionState {
                phase: Phase::Work,
                run: RunState::Idle,
                remaining: config.work_duration,
                break_count: 0,
                generation: 0,
            },
            config,
            listener: Box::new(listener),
        }
    }

    pub fn start_work(&mut self) {
        self.begin(Phase::Work, self.config.work_duration);
    }

    pub fn start_break(&mut self) {
        if self.long_break_due() {
            self.state.break_count = 0;
            self.begin(Phase::LongBreak, self.config.long_break_duration);
        } else {
            self.state.break_count += 1;
            self.begin(Phase::ShortBreak, self.config.short_break_duration);
        }
    }

    /// Toggles between running and suspended. Does nothing while idle.
    pub fn suspend(&mut self) {
        self.state.run = match self.state.run {
            RunState::Running => {
                tracing::info!(remaining = self.state.remaining.as_secs(), "suspended");
                RunState::Suspended
            }
            RunState::Suspended => {
                tracing::info!(remaining = self.state.remaining.as_secs(), "resumed");
                RunState::Running
            }
            RunState::Idle => RunState::Idle,
        };
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state.run != RunState::Running {
            return TickOutcome::Ignored;
        }

        self.state.remaining = self.state.remaining.saturating_sub(TICK_UNIT);
        if self.state.remaining.is_zero() {
            self.state.run = RunState::Idle;
            let completed = self.state.phase;
            tracing::info!(phase = completed.as_str(), "phase complete");
            self.listener.on_phase_complete(completed);
            return TickOutcome::Completed(completed);
        }

        self.listener
            .on_time_updated(self.state.remaining, self.state.phase);
        TickOutcome::Counted(self.state.remaining)
    }

    /// Replaces the configuration. An idle session picks up the new length at once;
    /// a running or suspended one keeps its remaining time.
    pub fn update_config(&mut self, config: SessionConfig) {
        self.config = config;
        tracing::info!(
            work_secs = config.work_duration.as_secs(),
            short_break_secs = config.short_break_duration.as_secs(),
            long_break_secs = config.long_break_duration.as_secs(),
            short_breaks_before_long = config.short_breaks_before_long,
            "configuration updated"
        );

        if self.state.run != RunState::Idle {
            return;
        }
        self.state.remaining = match self.state.phase {
            Phase::Work => config.work_duration,
            _ if self.long_break_due() => config.long_break_duration,
            _ => config.short_break_duration,
        };
        self.listener
            .on_time_updated(self.state.remaining, self.state.phase);
    }

    /// Stops the session where it stands. The remaining time is kept, the session goes idle
    /// and any countdown started earlier loses ownership of it.
    pub fn stop(&mut self) {
        self.state.generation = self.state.generation.wrapping_add(1);
        if self.state.run != RunState::Idle {
            tracing::info!(
                phase = self.state.phase.as_str(),
                remaining = self.state.remaining.as_secs(),
                "stopped"
            );
            self.state.run = RunState::Idle;
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn run_state(&self) -> RunState {
        self.state.run
    }

    pub fn is_running(&self) -> bool {
        self.state.run == RunState::Running
    }

    pub fn is_suspended(&self) -> bool {
        self.state.run == RunState::Suspended
    }

    pub fn remaining(&self) -> Duration {
        self.state.remaining
    }

    pub fn break_count(&self) -> u32 {
        self.state.break_count
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Bumped by every start command; identifies the countdown that owns the session.
    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.state.phase,
            state: self.state.run,
            remaining: self.state.remaining,
            break_count: self.state.break_count,
            config: self.config,
        }
    }

    fn long_break_due(&self) -> bool {
        self.state.break_count >= self.config.short_breaks_before_long
    }

    fn begin(&mut self, phase: Phase, length: Duration) {
        self.state.phase = phase;
        self.state.remaining = length;
        self.state.run = RunState::Running;
        self.state.generation = self.state.generation.wrapping_add(1);
        tracing::info!(
            phase = phase.as_str(),
            secs = length.as_secs(),
            break_count = self.state.break_count,
            "session started"
        );
        self.listener.on_time_updated(length, phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pomodoro::config::minutes;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Time(Duration, Phase),
        Complete(Phase),
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Seen>>>);

    impl Recorder {
        fn take(&self) -> Vec<Seen> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl SessionListener for Recorder {
        fn on_time_updated(&mut self, remaining: Duration, phase: Phase) {
            self.0.lock().unwrap().push(Seen::Time(remaining, phase));
        }

        fn on_phase_complete(&mut self, completed: Phase) {
            self.0.lock().unwrap().push(Seen::Complete(completed));
        }
    }

    fn short_config() -> SessionConfig {
        SessionConfig::new(
            Duration::from_secs(3),
            Duration::from_secs(2),
            Duration::from_secs(4),
            2,
        )
        .unwrap()
    }

    fn controller(config: SessionConfig) -> (SessionController, Recorder) {
        let recorder = Recorder::default();
        (SessionController::new(config, recorder.clone()), recorder)
    }

    #[test]
    fn test_initial_state() {
        let c = SessionController::default();
        assert_eq!(c.phase(), Phase::Work);
        assert_eq!(c.run_state(), RunState::Idle);
        assert!(!c.is_running());
        assert!(!c.is_suspended());
        assert_eq!(c.remaining(), minutes(20));
        assert_eq!(c.break_count(), 0);
    }

    #[test]
    fn test_start_work_resets_from_any_state() {
        let (mut c, rec) = controller(SessionConfig::default());
        c.start_break();
        c.tick();
        c.suspend();
        c.start_work();
        assert_eq!(c.phase(), Phase::Work);
        assert_eq!(c.remaining(), minutes(20));
        assert!(c.is_running());
        assert!(!c.is_suspended());
        assert_eq!(rec.take().last(), Some(&Seen::Time(minutes(20), Phase::Work)));
    }

    #[test]
    fn test_short_break_increments_count() {
        let (mut c, _) = controller(SessionConfig::default());
        c.start_break();
        assert_eq!(c.phase(), Phase::ShortBreak);
        assert_eq!(c.remaining(), minutes(5));
        assert_eq!(c.break_count(), 1);
        assert!(c.is_running());
    }

    #[test]
    fn test_four_short_breaks_then_long() {
        let (mut c, _) = controller(SessionConfig::default());
        c.start_work();
        for expected in 1..=4 {
            c.start_break();
            assert_eq!(c.phase(), Phase::ShortBreak);
            assert_eq!(c.break_count(), expected);
        }
        c.start_break();
        assert_eq!(c.phase(), Phase::LongBreak);
        assert_eq!(c.remaining(), minutes(15));
        assert_eq!(c.break_count(), 0);

        c.start_break();
        assert_eq!(c.phase(), Phase::ShortBreak);
        assert_eq!(c.break_count(), 1);
    }

    #[test]
    fn test_long_break_threshold_read_at_start() {
        let (mut c, _) = controller(SessionConfig::default());
        c.start_break();
        c.start_break();
        let lowered = SessionConfig {
            short_breaks_before_long: 2,
            ..SessionConfig::default()
        };
        c.update_config(lowered);
        c.start_break();
        assert_eq!(c.phase(), Phase::LongBreak);
        assert_eq!(c.break_count(), 0);
    }

    #[test]
    fn test_suspend_twice_restores_running() {
        let (mut c, _) = controller(SessionConfig::default());
        c.start_work();
        c.tick();
        let frozen = c.remaining();

        c.suspend();
        assert!(c.is_suspended());
        assert!(!c.is_running());
        assert_eq!(c.tick(), TickOutcome::Ignored);
        assert_eq!(c.remaining(), frozen);

        c.suspend();
        assert!(c.is_running());
        assert!(!c.is_suspended());
        assert_eq!(c.remaining(), frozen);
    }

    #[test]
    fn test_suspend_is_noop_when_idle() {
        let (mut c, rec) = controller(SessionConfig::default());
        c.suspend();
        assert_eq!(c.run_state(), RunState::Idle);
        assert!(rec.take().is_empty());
    }

    #[test]
    fn test_tick_counts_down_one_unit() {
        let (mut c, rec) = controller(SessionConfig::default());
        c.start_work();
        rec.take();
        assert_eq!(c.tick(), TickOutcome::Counted(minutes(20) - TICK_UNIT));
        assert_eq!(c.remaining(), minutes(20) - TICK_UNIT);
        assert_eq!(rec.take(), vec![Seen::Time(minutes(20) - TICK_UNIT, Phase::Work)]);
    }

    #[test]
    fn test_tick_ignored_when_idle() {
        let (mut c, rec) = controller(SessionConfig::default());
        assert_eq!(c.tick(), TickOutcome::Ignored);
        assert_eq!(c.remaining(), minutes(20));
        assert!(rec.take().is_empty());
    }

    #[test]
    fn test_completion_fires_once() {
        let (mut c, rec) = controller(short_config());
        c.start_work();
        rec.take();

        assert_eq!(c.tick(), TickOutcome::Counted(Duration::from_secs(2)));
        assert_eq!(c.tick(), TickOutcome::Counted(Duration::from_secs(1)));
        assert_eq!(c.tick(), TickOutcome::Completed(Phase::Work));
        assert_eq!(c.remaining(), Duration::ZERO);
        assert_eq!(c.run_state(), RunState::Idle);

        assert_eq!(c.tick(), TickOutcome::Ignored);
        let completions = rec
            .take()
            .into_iter()
            .filter(|s| matches!(s, Seen::Complete(_)))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_break_completion_reports_break_phase() {
        let (mut c, rec) = controller(short_config());
        c.start_break();
        c.tick();
        assert_eq!(c.tick(), TickOutcome::Completed(Phase::ShortBreak));
        assert_eq!(rec.take().last(), Some(&Seen::Complete(Phase::ShortBreak)));
    }

    #[test]
    fn test_subsecond_remaining_completes_on_next_tick() {
        let (mut c, _) = controller(
            SessionConfig::new(Duration::from_millis(500), minutes(1), minutes(1), 1).unwrap(),
        );
        c.start_work();
        assert_eq!(c.tick(), TickOutcome::Completed(Phase::Work));
    }

    #[test]
    fn test_update_config_while_idle_recomputes_work() {
        let (mut c, rec) = controller(SessionConfig::default());
        c.update_config(short_config());
        assert_eq!(c.remaining(), Duration::from_secs(3));
        assert_eq!(rec.take(), vec![Seen::Time(Duration::from_secs(3), Phase::Work)]);
    }

    #[test]
    fn test_update_config_while_idle_in_break_phase() {
        let (mut c, _) = controller(short_config());
        c.start_break();
        c.tick();
        c.tick();
        assert_eq!(c.run_state(), RunState::Idle);
        assert_eq!(c.break_count(), 1);

        let config = SessionConfig {
            short_break_duration: minutes(7),
            long_break_duration: minutes(30),
            ..short_config()
        };
        c.update_config(config);
        assert_eq!(c.remaining(), minutes(7));

        c.update_config(SessionConfig {
            short_breaks_before_long: 1,
            ..config
        });
        assert_eq!(c.remaining(), minutes(30));
    }

    #[test]
    fn test_update_config_keeps_in_flight_time() {
        let (mut c, _) = controller(SessionConfig::default());
        c.start_work();
        c.tick();
        c.update_config(short_config());
        assert_eq!(c.remaining(), minutes(20) - TICK_UNIT);
        assert_eq!(c.config(), &short_config());

        c.suspend();
        c.update_config(SessionConfig::default());
        assert_eq!(c.remaining(), minutes(20) - TICK_UNIT);

        c.start_work();
        assert_eq!(c.remaining(), minutes(20));
    }

    #[test]
    fn test_generation_bumps_on_start() {
        let (mut c, _) = controller(SessionConfig::default());
        let g0 = c.generation();
        c.start_work();
        c.start_break();
        assert_eq!(c.generation(), g0 + 2);
        c.suspend();
        c.tick();
        assert_eq!(c.generation(), g0 + 2);
    }

    #[test]
    fn test_stop_goes_idle_and_keeps_remaining() {
        let mut controller = SessionController::default();
        controller.start_work();
        controller.tick();
        let generation = controller.generation();

        controller.stop();
        assert_eq!(controller.run_state(), RunState::Idle);
        assert_eq!(controller.remaining(), minutes(20) - TICK_UNIT);
        assert_ne!(controller.generation(), generation);
        assert_eq!(controller.tick(), TickOutcome::Ignored);

        controller.suspend();
        controller.start_break();
        controller.suspend();
        controller.stop();
        assert_eq!(controller.run_state(), RunState::Idle);
        assert_eq!(controller.phase(), Phase::ShortBreak);
    }

    #[test]
    fn test_snapshot_serializes() {
        let (mut c, _) = controller(SessionConfig::default());
        c.start_break();
        let snapshot = c.snapshot();
        assert!(snapshot.is_running());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"phase\":\"short_break\""));
        assert!(json.contains("\"state\":\"running\""));
        assert!(json.contains("\"remaining_secs\":300"));
        assert!(json.contains("\"break_count\":1"));
    }
}
