use serde::{Deserialize, Serialize};

/// Fallback subject/type when a resume string carries none, matching the
/// defaults the old links used.
pub const DEFAULT_SUBJECT: &str = "풍경 그리기";
pub const DEFAULT_KIND: &str = "사고의 전환";

/// The four fixed phases of a drawing session, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Step {
    #[strum(serialize = "스케치")]
    Sketch,
    #[strum(serialize = "채색")]
    Color,
    #[strum(serialize = "묘사")]
    Detail,
    #[strum(serialize = "정리")]
    Organize,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Sketch, Step::Color, Step::Detail, Step::Organize];

    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Query-parameter key for the per-step time override.
    pub fn key(&self) -> &'static str {
        match self {
            Step::Sketch => "sketch",
            Step::Color => "color",
            Step::Detail => "detail",
            Step::Organize => "organize",
        }
    }

    pub fn from_index(idx: usize) -> Option<Step> {
        Step::ALL.get(idx).copied()
    }
}

/// One step's record. Created with only `name`; `end_time` and `duration`
/// are assigned exactly once when the step finishes. Times are seconds
/// since session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl StepRecord {
    pub fn unstarted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            end_time: None,
            duration: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.end_time.is_some()
    }
}

/// Everything a session view needs, independent of how it crossed a
/// screen boundary. `total_time` is seconds and immutable once the session
/// begins; `started_at` is epoch milliseconds and preserved across
/// pause/resume so elapsed math stays anchored to the true origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub subject: String,
    pub kind: String,
    pub total_time: i64,
    pub started_at: i64,
    pub step_records: Vec<StepRecord>,
    pub is_finished: bool,
}

impl SessionState {
    pub fn fresh(subject: String, kind: String, total_time: i64, started_at: i64) -> Self {
        Self {
            subject,
            kind,
            total_time,
            started_at,
            step_records: fresh_records(),
            is_finished: false,
        }
    }

    /// Sum of the durations of all completed steps.
    pub fn completed_duration(&self) -> i64 {
        self.step_records
            .iter()
            .filter(|r| r.is_complete())
            .map(|r| r.duration.unwrap_or(0))
            .sum()
    }

    /// Index of the first step without an end time; 0 when every record is
    /// somehow complete already.
    pub fn current_step_index(&self) -> usize {
        self.step_records
            .iter()
            .position(|r| !r.is_complete())
            .unwrap_or(0)
    }
}

/// Four unstarted records named for the fixed step sequence.
pub fn fresh_records() -> Vec<StepRecord> {
    Step::ALL
        .iter()
        .map(|s| StepRecord::unstarted(s.name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names_in_order() {
        let names: Vec<String> = Step::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["스케치", "채색", "묘사", "정리"]);
    }

    #[test]
    fn test_step_keys() {
        let keys: Vec<&str> = Step::ALL.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec!["sketch", "color", "detail", "organize"]);
    }

    #[test]
    fn test_step_from_index() {
        assert_eq!(Step::from_index(0), Some(Step::Sketch));
        assert_eq!(Step::from_index(3), Some(Step::Organize));
        assert_eq!(Step::from_index(4), None);
    }

    #[test]
    fn test_record_wire_shape() {
        let done = StepRecord {
            name: "스케치".into(),
            end_time: Some(100),
            duration: Some(100),
        };
        assert_eq!(
            serde_json::to_string(&done).unwrap(),
            r#"{"name":"스케치","endTime":100,"duration":100}"#
        );

        // Unstarted records serialize with just the name, as the old links did.
        let fresh = StepRecord::unstarted("채색");
        assert_eq!(serde_json::to_string(&fresh).unwrap(), r#"{"name":"채색"}"#);
    }

    #[test]
    fn test_record_wire_parse() {
        let parsed: Vec<StepRecord> =
            serde_json::from_str(r#"[{"name":"스케치","endTime":100,"duration":100},{"name":"채색"}]"#)
                .unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].is_complete());
        assert!(!parsed[1].is_complete());
    }

    #[test]
    fn test_current_step_index_resumes_after_completed() {
        let mut state = SessionState::fresh(
            DEFAULT_SUBJECT.into(),
            DEFAULT_KIND.into(),
            3600,
            0,
        );
        state.step_records[0].end_time = Some(100);
        state.step_records[0].duration = Some(100);
        assert_eq!(state.current_step_index(), 1);
        assert_eq!(state.completed_duration(), 100);
    }

    #[test]
    fn test_current_step_index_all_complete_falls_back_to_zero() {
        let mut state =
            SessionState::fresh(DEFAULT_SUBJECT.into(), DEFAULT_KIND.into(), 3600, 0);
        for (i, r) in state.step_records.iter_mut().enumerate() {
            r.end_time = Some((i as i64 + 1) * 100);
            r.duration = Some(100);
        }
        assert_eq!(state.current_step_index(), 0);
    }
}
