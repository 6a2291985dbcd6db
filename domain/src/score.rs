use chrono::{DateTime, Utc};

use crate::metrics::MetricRecord;
use crate::resource::ResourceAssignment;

/// Live bookkeeping for one known agent, for the lifetime of the engine.
///
/// A pruned agent (`is_active == false`) stays in the map for audit purposes
/// (I5); its `rank`/`is_champion` become meaningless once pruned (I1).
#[derive(Debug, Clone)]
pub struct AgentScore {
    pub agent_id: String,
    pub agent_name: String,
    pub resource_assignment: ResourceAssignment,

    pub metrics: MetricRecord,
    pub compute_usage_pct: f64,

    pub final_score: f64,
    pub rank: Option<u32>,
    pub is_active: bool,
    pub is_champion: bool,
    pub pruned_at: Option<DateTime<Utc>>,
    pub pruned_reason: String,

    pub score_history: Vec<(DateTime<Utc>, f64)>,
    pub error_count: u32,
}

impl AgentScore {
    pub fn new(agent_id: String, agent_name: String, resource_assignment: ResourceAssignment) -> Self {
        Self {
            agent_id,
            agent_name,
            resource_assignment,
            metrics: MetricRecord::default(),
            compute_usage_pct: 0.0,
            final_score: 0.0,
            rank: None,
            is_active: true,
            is_champion: false,
            pruned_at: None,
            pruned_reason: String::new(),
            score_history: Vec::new(),
            error_count: 0,
        }
    }
}
