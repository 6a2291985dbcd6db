use chrono::{DateTime, Utc};

use crate::phase::Phase;

/// One append-only record of an eviction. `timestamp`/`reason` always match
/// the corresponding `AgentScore.pruned_at`/`pruned_reason` at the moment of
/// eviction (P5).
#[derive(Debug, Clone)]
pub struct AuditRow {
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    pub agent_name: String,
    pub reason: String,
    pub final_score: f64,
    pub rank: u32,
    pub phase: Phase,
}
