//! Session lifecycle events and the sink boundary they cross.
//!
//! The timer only knows `EventSink::notify`; where the notification ends up
//! (a log file here, Slack/Sheets webhooks in the old deployment) is the
//! sink's business. Sinks may fail, callers log and move on — a dropped
//! notification must never interrupt a running session.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use itertools::Itertools;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::format::{format_clock, format_time_with_hours};
use crate::util::now_ms;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SessionStart {
        subject: String,
        kind: String,
        total_time: i64,
        /// Per-step goal overrides in step order, seconds; `None` means
        /// auto-distributed.
        overrides: Vec<Option<i64>>,
    },
    StepComplete {
        subject: String,
        step: String,
        duration: i64,
    },
    SessionComplete {
        subject: String,
        total_duration: i64,
        is_overtime: bool,
        /// (step name, duration seconds) for every step, in order.
        steps: Vec<(String, i64)>,
    },
    SessionPause {
        subject: String,
        current_step: String,
        elapsed: i64,
    },
    ImageSave {
        subject: String,
        file_name: String,
    },
    Error {
        message: String,
        context: String,
    },
    UnexpectedExit {
        current_step: String,
        elapsed: i64,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::SessionStart { .. } => "session_start",
            SessionEvent::StepComplete { .. } => "step_complete",
            SessionEvent::SessionComplete { .. } => "session_complete",
            SessionEvent::SessionPause { .. } => "session_pause",
            SessionEvent::ImageSave { .. } => "image_save",
            SessionEvent::Error { .. } => "error",
            SessionEvent::UnexpectedExit { .. } => "unexpected_exit",
        }
    }

    fn subject(&self) -> &str {
        match self {
            SessionEvent::SessionStart { subject, .. }
            | SessionEvent::StepComplete { subject, .. }
            | SessionEvent::SessionComplete { subject, .. }
            | SessionEvent::SessionPause { subject, .. }
            | SessionEvent::ImageSave { subject, .. } => subject,
            SessionEvent::Error { .. } | SessionEvent::UnexpectedExit { .. } => "",
        }
    }

    /// The seconds figure a flat log line should carry for this event.
    fn seconds(&self) -> i64 {
        match self {
            SessionEvent::SessionStart { total_time, .. } => *total_time,
            SessionEvent::StepComplete { duration, .. } => *duration,
            SessionEvent::SessionComplete { total_duration, .. } => *total_duration,
            SessionEvent::SessionPause { elapsed, .. }
            | SessionEvent::UnexpectedExit { elapsed, .. } => *elapsed,
            SessionEvent::ImageSave { .. } | SessionEvent::Error { .. } => 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("session log io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Narrow notification boundary consumed by the timer. Implementations own
/// delivery and must not leak failures beyond the returned error.
pub trait EventSink {
    fn notify(&self, event: &SessionEvent) -> Result<(), SinkError>;
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn notify(&self, event: &SessionEvent) -> Result<(), SinkError> {
        (**self).notify(event)
    }
}

/// Swallows everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _event: &SessionEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Records events in memory; used by tests to assert on emissions.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SessionEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn notify(&self, event: &SessionEvent) -> Result<(), SinkError> {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
        Ok(())
    }
}

/// Appends one CSV line per event to a session log file and traces the
/// full formatted message. The file-based stand-in for the webhook
/// backends of the old deployment.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    session_id: String,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>, session_id: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl EventSink for FileSink {
    fn notify(&self, event: &SessionEvent) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = !self.path.exists();
        let mut log_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        if needs_header {
            writeln!(log_file, "timestamp,session_id,event,subject,seconds")?;
        }
        writeln!(
            log_file,
            "{},{},{},{},{}",
            format_clock(now_ms()),
            self.session_id,
            event.kind(),
            event.subject().replace(',', " "),
            event.seconds(),
        )?;

        tracing::info!(kind = event.kind(), "{}", format_message(event, &self.session_id));
        Ok(())
    }
}

const SESSION_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(SESSION_ID_ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// `SESSION_<timestamp36>_<random36>`, uppercased — the id scheme the old
/// logs used, so mixed log archives stay grep-compatible.
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let random: String = (0..6)
        .map(|_| *SESSION_ID_ALPHABET.choose(&mut rng).unwrap_or(&b'0') as char)
        .collect();
    format!("SESSION_{}_{}", to_base36(now_ms().max(0) as u64), random).to_uppercase()
}

fn meta_block(session_id: &str) -> String {
    format!(
        "세션 ID: {}\n디바이스: 터미널\n{}",
        session_id,
        format_clock(now_ms())
    )
}

fn format_overrides(overrides: &[Option<i64>]) -> String {
    let names = ["스케치", "채색", "묘사", "정리"];
    let stages = overrides
        .iter()
        .zip(names)
        .filter_map(|(secs, name)| secs.map(|s| format!("{} {}분", name, (s as f64 / 60.0).round())))
        .join(" / ");
    if stages.is_empty() {
        "자동 분배".to_string()
    } else {
        stages
    }
}

/// Renders an event as the Korean notification text the logging backends
/// receive.
pub fn format_message(event: &SessionEvent, session_id: &str) -> String {
    let meta = meta_block(session_id);
    match event {
        SessionEvent::SessionStart {
            subject,
            kind,
            total_time,
            overrides,
        } => format!(
            "🎨 *세션 시작*\n- 주제: {}\n- 유형: {}\n- 전체 시간: {}\n- 설정: {}\n\n{}",
            subject,
            kind,
            format_time_with_hours(*total_time),
            format_overrides(overrides),
            meta
        ),
        SessionEvent::StepComplete {
            subject,
            step,
            duration,
        } => format!(
            "✅ *{} 단계 완료*\n- 주제: {}\n- 소요 시간: {}분\n\n{}",
            step,
            subject,
            (*duration as f64 / 60.0).round(),
            meta
        ),
        SessionEvent::SessionComplete {
            subject,
            total_duration,
            is_overtime,
            steps,
        } => {
            let status = if *is_overtime {
                "⏰ *세션 완료 (시간 초과)*"
            } else {
                "🎉 *세션 완료*"
            };
            let step_summary = steps
                .iter()
                .map(|(name, duration)| format!("{}: {}분", name, (*duration as f64 / 60.0).round()))
                .join(" / ");
            format!(
                "{}\n- 주제: {}\n- 소요 시간: {}분\n- 단계별 시간: {}\n\n{}",
                status,
                subject,
                (*total_duration as f64 / 60.0).round(),
                step_summary,
                meta
            )
        }
        SessionEvent::SessionPause {
            subject,
            current_step,
            elapsed,
        } => format!(
            "⏸️ *세션 일시정지*\n- 주제: {}\n- 현재 단계: {}\n- 경과 시간: {}분\n\n{}",
            subject,
            current_step,
            (*elapsed as f64 / 60.0).round(),
            meta
        ),
        SessionEvent::ImageSave { subject, file_name } => format!(
            "💾 *이미지 저장*\n- 주제: {}\n- 파일명: {}\n\n{}",
            subject, file_name, meta
        ),
        SessionEvent::Error { message, context } => format!(
            "🚨 *에러 발생!*\n- 위치: {}\n- 메시지: {}\n\n{}",
            context, message, meta
        ),
        SessionEvent::UnexpectedExit {
            current_step,
            elapsed,
        } => format!(
            "👋 *비정상 종료*\n- 현재 단계: {}\n- 경과 시간: {}\n\n{}",
            current_step,
            crate::format::format_time(*elapsed),
            meta
        ),
    }
}
