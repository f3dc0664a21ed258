//! The session timer state machine.
//!
//! Owns the current step index, remaining time, per-step records, and the
//! pause/finish status. Driven by a one-per-second tick plus explicit
//! step-complete/pause actions; reports every transition to the injected
//! event sink. Time never runs out by itself — negative remaining time is
//! overtime and the machine keeps ticking.

use std::collections::BTreeMap;

use crate::allocation::resolve_step_goals;
use crate::events::{EventSink, SessionEvent};
use crate::session::{SessionState, Step};
use crate::tips::TipState;
use crate::transport;
use crate::util::now_ms;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Running,
    /// Terminal for the machine; control moves to the detail screen, which
    /// may build a fresh machine from the handoff to continue.
    Paused,
    Finished,
}

pub struct PracticeTimer {
    pub session: SessionState,
    goals: Vec<f64>,
    current_step: usize,
    remaining_time: i64,
    /// Continued sessions tick by decrement instead of re-anchoring to
    /// `started_at`. Kept as-is from the original behavior even though the
    /// decrement branch accumulates tick-delay drift while the wall-clock
    /// branch self-corrects.
    resumed: bool,
    status: TimerStatus,
    tip: TipState,
    sink: Box<dyn EventSink>,
}

impl PracticeTimer {
    /// Fresh session starting now.
    pub fn new(
        subject: String,
        kind: String,
        total_time: i64,
        overrides: Vec<Option<f64>>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        let session = SessionState::fresh(subject, kind, total_time, now_ms());
        let goals = resolve_step_goals(total_time as f64, &overrides);
        Self {
            remaining_time: total_time,
            current_step: 0,
            resumed: false,
            status: TimerStatus::Running,
            tip: TipState::new(),
            session,
            goals,
            sink,
        }
    }

    /// Rebuilds the machine from a paused session's state. `started_at` is
    /// preserved so elapsed math stays anchored to the true origin; the
    /// current step is the first incomplete record.
    pub fn resume(
        session: SessionState,
        overrides: Vec<Option<f64>>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        let goals = resolve_step_goals(session.total_time as f64, &overrides);
        let current_step = session.current_step_index();
        let remaining_time = session.total_time - session.completed_duration();
        Self {
            remaining_time,
            current_step,
            resumed: true,
            status: TimerStatus::Running,
            tip: TipState::new(),
            session,
            goals,
            sink,
        }
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step
    }

    pub fn current_step(&self) -> Step {
        Step::from_index(self.current_step).unwrap_or(Step::Organize)
    }

    pub fn remaining_time(&self) -> i64 {
        self.remaining_time
    }

    pub fn elapsed(&self) -> i64 {
        self.session.total_time - self.remaining_time
    }

    pub fn is_overtime(&self) -> bool {
        self.remaining_time <= 0
    }

    /// Seconds past the total, 0 while within time.
    pub fn overtime_seconds(&self) -> i64 {
        (-self.remaining_time).max(0)
    }

    /// Session progress in 0.0..=1.0, clamped at full once overtime.
    pub fn progress(&self) -> f64 {
        if self.session.total_time <= 0 {
            return 1.0;
        }
        (self.elapsed() as f64 / self.session.total_time as f64).clamp(0.0, 1.0)
    }

    /// Goal duration for a step, seconds, from the allocation resolver.
    pub fn goal_seconds(&self, step_index: usize) -> f64 {
        self.goals.get(step_index).copied().unwrap_or(0.0)
    }

    /// The tip for the current step and overtime state. Draws a new one
    /// only on a step change or on first entering overtime; otherwise the
    /// held tip comes back unchanged.
    pub fn current_tip(&mut self) -> &'static str {
        let step = self.current_step();
        let overtime = self.is_overtime();
        self.tip.refresh(self.current_step, step, overtime)
    }

    /// One-per-second advance while running.
    pub fn on_tick(&mut self) {
        if self.status != TimerStatus::Running {
            return;
        }
        if self.resumed {
            self.remaining_time -= 1;
        } else {
            let elapsed = (now_ms() - self.session.started_at) / 1000;
            self.remaining_time = self.session.total_time - elapsed;
        }
    }

    /// Marks the current step done, stamping its end time and duration
    /// (cumulative elapsed minus everything recorded before it). The last
    /// step finishes the session.
    pub fn complete_current_step(&mut self) {
        if self.status != TimerStatus::Running {
            return;
        }

        let now = (now_ms() - self.session.started_at) / 1000;
        let prev_duration: i64 = self.session.step_records[..self.current_step]
            .iter()
            .map(|r| r.duration.unwrap_or(0))
            .sum();
        let duration = now - prev_duration;

        let record = &mut self.session.step_records[self.current_step];
        record.end_time = Some(now);
        record.duration = Some(duration);
        let step_name = record.name.clone();

        if self.current_step == self.session.step_records.len() - 1 {
            self.status = TimerStatus::Finished;
            self.session.is_finished = true;
            let total_duration = self.session.completed_duration();
            self.emit(SessionEvent::SessionComplete {
                subject: self.session.subject.clone(),
                total_duration,
                is_overtime: total_duration > self.session.total_time,
                steps: self
                    .session
                    .step_records
                    .iter()
                    .map(|r| (r.name.clone(), r.duration.unwrap_or(0)))
                    .collect(),
            });
        } else {
            self.current_step += 1;
            self.emit(SessionEvent::StepComplete {
                subject: self.session.subject.clone(),
                step: step_name,
                duration,
            });
        }
    }

    /// Stops ticking and hands off the encoded state, including the exact
    /// remaining time at this moment so the detail screen renders the same
    /// number.
    pub fn pause(&mut self) -> BTreeMap<String, String> {
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Paused;
            self.emit(SessionEvent::SessionPause {
                subject: self.session.subject.clone(),
                current_step: self.current_step().name(),
                elapsed: self.elapsed(),
            });
        }
        self.handoff()
    }

    /// Encoded state for the detail screen.
    pub fn handoff(&self) -> BTreeMap<String, String> {
        transport::encode(&self.session, Some(self.remaining_time))
    }

    /// Best-effort notification when the process goes away mid-session.
    /// Nothing is awaited and nothing can fail out of here.
    pub fn notify_unexpected_exit(&self) {
        self.emit(SessionEvent::UnexpectedExit {
            current_step: self.current_step().name(),
            elapsed: self.elapsed(),
        });
    }

    /// Session-start notification, once, when a fresh session begins.
    pub fn notify_start(&self, overrides: &[Option<f64>]) {
        self.emit(SessionEvent::SessionStart {
            subject: self.session.subject.clone(),
            kind: self.session.kind.clone(),
            total_time: self.session.total_time,
            overrides: overrides.iter().map(|o| o.map(|s| s as i64)).collect(),
        });
    }

    /// Sink failures are logged and swallowed here; the timer and the UI
    /// never see them.
    fn emit(&self, event: SessionEvent) {
        if let Err(err) = self.sink.notify(&event) {
            tracing::warn!(kind = event.kind(), %err, "event sink delivery failed");
        }
    }
}
