//! Per-tool usage telemetry.
//!
//! The sink is owned by whoever hosts the tools and handed to them explicitly.
//! Extraction code never reads it.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit stamp for a single tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CallStamp {
    pub tool: String,
    pub request_id: String,
    pub ts: String,
}

impl CallStamp {
    /// Stamp a new call with a fresh request id and the current time.
    pub fn new(tool: &str) -> Self {
        Self { tool: tool.to_string(), request_id: Uuid::new_v4().to_string(), ts: now_rfc3339() }
    }
}

/// Point-in-time view of recorded usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UsageSnapshot {
    /// Number of calls per tool name.
    pub counts: BTreeMap<String, u64>,
    /// RFC3339 timestamp of the most recent call per tool name.
    pub last_used: BTreeMap<String, String>,
    /// RFC3339 timestamp at which the snapshot was taken.
    pub server_time: String,
}

/// Recorder for tool invocations.
pub trait UsageSink: Send + Sync {
    /// Record one call of `tool` and return its audit stamp.
    fn record_call(&self, tool: &str) -> CallStamp;

    /// Current counters and last-used times.
    fn snapshot(&self) -> UsageSnapshot;
}

#[derive(Debug, Default)]
struct UsageState {
    counts: BTreeMap<String, u64>,
    last_used: BTreeMap<String, String>,
}

/// In-process [`UsageSink`] backed by a mutex. Nothing is persisted.
#[derive(Debug, Default)]
pub struct InMemoryUsage {
    state: Mutex<UsageState>,
}

impl InMemoryUsage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageSink for InMemoryUsage {
    fn record_call(&self, tool: &str) -> CallStamp {
        let stamp = CallStamp::new(tool);
        // Poisoning is ignored: each update is a single insert.
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *state.counts.entry(tool.to_string()).or_insert(0) += 1;
        state.last_used.insert(tool.to_string(), stamp.ts.clone());
        stamp
    }

    fn snapshot(&self) -> UsageSnapshot {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        UsageSnapshot { counts: state.counts.clone(), last_used: state.last_used.clone(), server_time: now_rfc3339() }
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
