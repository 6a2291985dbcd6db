//! Engine-internal mutable state.
//!
//! Grounded on `scheduler/src/state.rs`'s role for `SchedulerEngine`: a
//! plain struct the engine wraps in a single lock, rather than scattering
//! several independently-locked fields.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use domain::{resource, AgentScore, AuditRow, EngineConfig, MetricRecord, Phase};
use ledger::ResourceLedger;

use crate::source::{AgentHandle, AgentMetricsSample};

pub struct EngineState {
    pub config: EngineConfig,
    pub running: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub phase: Phase,
    /// The last day-driven nominal phase (population-agnostic) that C6 has
    /// already run for. `None` until the first tick. Distinct from `phase`,
    /// which the pruning executor may pin to `Maintenance` ahead of what
    /// the day thresholds alone would say.
    pub last_evaluated_phase: Option<Phase>,
    pub agents: Vec<AgentScore>,
    pub index: HashMap<String, usize>,
    pub ledger: ResourceLedger,
    pub audit: Vec<AuditRow>,
}

impl EngineState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            running: false,
            started_at: None,
            phase: Phase::InitialBlast,
            last_evaluated_phase: None,
            agents: Vec::new(),
            index: HashMap::new(),
            ledger: ResourceLedger::new(),
            audit: Vec::new(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_active).count()
    }

    pub fn total_known(&self) -> usize {
        self.agents.len()
    }

    pub fn find(&self, agent_id: &str) -> Option<usize> {
        self.index.get(agent_id).copied()
    }

    /// Register the initial agent roster at `start()`. Order is the order
    /// `handles` arrives in; duplicate ids (by first occurrence) are
    /// rejected and logged, never assigned a second slot (§8 boundary
    /// behaviour).
    pub fn register_agents(&mut self, handles: Vec<AgentHandle>) {
        for handle in handles {
            if self.index.contains_key(&handle.id) {
                tracing::warn!(agent_id = %handle.id, "duplicate agent id from accessor; ignoring");
                continue;
            }

            let next_index = self.agents.len() as u32;
            let assignment = resource::assignment_for_index(next_index);

            let mut score = AgentScore::new(handle.id.clone(), handle.name.clone(), assignment);
            apply_sample(&mut score, handle.metrics);
            score.compute_usage_pct = handle.compute_usage_pct.unwrap_or(0.0);

            self.ledger
                .assign(&score.agent_id, assignment)
                .expect("freshly computed index cannot collide with an existing lane");
            self.index.insert(score.agent_id.clone(), self.agents.len());
            self.agents.push(score);
        }
    }

    /// Refresh live agents' metrics from a fresh `get_all_agents()` read.
    /// Agents not present in `handles` keep their last-known record — a
    /// momentary absence is not the same as an accessor failure.
    pub fn refresh_from_handles(&mut self, handles: Vec<AgentHandle>) {
        let mut by_id: HashMap<String, AgentHandle> = handles.into_iter().map(|h| (h.id.clone(), h)).collect();
        for agent in self.agents.iter_mut().filter(|a| a.is_active) {
            if let Some(handle) = by_id.remove(&agent.agent_id) {
                apply_sample(agent, handle.metrics);
                if let Some(usage) = handle.compute_usage_pct {
                    agent.compute_usage_pct = usage;
                }
            }
        }
    }
}

fn apply_sample(score: &mut AgentScore, sample: AgentMetricsSample) {
    match sample {
        AgentMetricsSample::Recorded(record) => score.metrics = record.sanitized(),
        AgentMetricsSample::Unknown => score.metrics = MetricRecord::default(),
        AgentMetricsSample::Failed(reason) => {
            score.error_count += 1;
            tracing::warn!(agent_id = %score.agent_id, reason = %reason, "metrics accessor failed for agent");
        }
    }
}
