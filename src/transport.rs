//! Query-parameter transport for session state.
//!
//! Session state crosses screen boundaries (and survives a paused session
//! being resumed from a copied string) only through a flat string-keyed
//! parameter set, the format the old web links used. The value object stays
//! internal; this module is the only place that knows the wire keys.

use std::collections::BTreeMap;

use crate::session::{fresh_records, SessionState, Step, StepRecord, DEFAULT_KIND, DEFAULT_SUBJECT};
use crate::util::{now_ms, percent_decode, percent_encode};

pub const KEY_SUBJECT: &str = "subject";
pub const KEY_KIND: &str = "type";
pub const KEY_TOTAL_HOURS: &str = "totalTime";
pub const KEY_TOTAL_SECONDS: &str = "totalSeconds";
pub const KEY_STARTED_AT: &str = "startedAt";
pub const KEY_STEP_RECORDS: &str = "stepRecords";
pub const KEY_IS_FINISHED: &str = "isFinished";
pub const KEY_IS_PAUSED: &str = "isPaused";
pub const KEY_REMAINING: &str = "remainingTime";

/// Serializes a session into the flat parameter set. `remaining` is the
/// exact remaining seconds at the moment of handoff, included so the
/// receiving view renders the same number instead of recomputing a
/// slightly different one.
pub fn encode(state: &SessionState, remaining: Option<i64>) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert(KEY_SUBJECT.to_string(), state.subject.clone());
    params.insert(KEY_KIND.to_string(), state.kind.clone());
    params.insert(
        KEY_TOTAL_HOURS.to_string(),
        (state.total_time as f64 / 3600.0).to_string(),
    );
    params.insert(KEY_TOTAL_SECONDS.to_string(), state.total_time.to_string());
    params.insert(KEY_STARTED_AT.to_string(), state.started_at.to_string());
    params.insert(KEY_IS_FINISHED.to_string(), state.is_finished.to_string());

    // The record list rides as percent-encoded JSON inside the value, on
    // top of whatever encoding the query-string layer adds.
    let records_json = serde_json::to_string(&state.step_records).unwrap_or_else(|_| "[]".into());
    params.insert(KEY_STEP_RECORDS.to_string(), percent_encode(&records_json));

    if let Some(remaining) = remaining {
        params.insert(KEY_REMAINING.to_string(), remaining.to_string());
    }
    params
}

/// Reconstructs a session from a parameter set. Never fails: every absent
/// or malformed field degrades to its documented default.
pub fn decode(params: &BTreeMap<String, String>) -> SessionState {
    let subject = params
        .get(KEY_SUBJECT)
        .filter(|s| !s.is_empty())
        .cloned()
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
    let kind = params
        .get(KEY_KIND)
        .filter(|s| !s.is_empty())
        .cloned()
        .unwrap_or_else(|| DEFAULT_KIND.to_string());

    // Prefer the integer pass-through; fall back to the hours field the
    // setup links carry.
    let total_time = params
        .get(KEY_TOTAL_SECONDS)
        .and_then(|v| v.parse::<i64>().ok())
        .or_else(|| {
            params
                .get(KEY_TOTAL_HOURS)
                .and_then(|v| v.parse::<f64>().ok())
                .map(|h| (h * 3600.0).floor() as i64)
        })
        .unwrap_or(0);

    let started_at = params
        .get(KEY_STARTED_AT)
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or_else(now_ms);

    let step_records = params
        .get(KEY_STEP_RECORDS)
        .and_then(|v| serde_json::from_str::<Vec<StepRecord>>(&percent_decode(v)).ok())
        .unwrap_or_else(fresh_records);

    let is_finished = params.get(KEY_IS_FINISHED).map(String::as_str) == Some("true");

    SessionState {
        subject,
        kind,
        total_time,
        started_at,
        step_records,
        is_finished,
    }
}

/// Optional per-step hour overrides from the setup link, in step order,
/// converted to seconds.
pub fn step_overrides(params: &BTreeMap<String, String>) -> Vec<Option<f64>> {
    Step::ALL
        .iter()
        .map(|step| {
            params
                .get(step.key())
                .and_then(|v| v.parse::<f64>().ok())
                .map(|h| h * 3600.0)
        })
        .collect()
}

pub fn is_paused(params: &BTreeMap<String, String>) -> bool {
    params.get(KEY_IS_PAUSED).map(String::as_str) == Some("true")
}

pub fn remaining_time(params: &BTreeMap<String, String>) -> Option<i64> {
    params.get(KEY_REMAINING).and_then(|v| v.parse::<i64>().ok())
}

/// Renders the parameter set as a single query string, suitable for
/// `--resume`. Keys come out sorted, which keeps the string stable for the
/// same state.
pub fn to_query_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parses a query string back into a parameter set. Tolerates a leading
/// `?`, empty segments, and segments without `=`.
pub fn parse_query(query: &str) -> BTreeMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = BTreeMap::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (k, v) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        params.insert(percent_decode(k), percent_decode(v));
    }
    params
}
