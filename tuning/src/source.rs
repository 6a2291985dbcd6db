//! The only outside contract the engine core depends on.
//!
//! Replaces the source's dynamic `.stats` reflection on a bot object with a
//! capability interface: an `AgentHandle` carries its own metrics sample
//! rather than the engine reaching into it. Missing metrics default to zero
//! in the handle, never in the engine.

use async_trait::async_trait;

use domain::MetricRecord;

/// Result of probing one agent's performance on a single tick.
#[derive(Debug, Clone)]
pub enum AgentMetricsSample {
    /// A fresh reading.
    Recorded(MetricRecord),
    /// The agent is known but has no metrics yet; maps to all-zero fields.
    Unknown,
    /// The accessor failed for this agent; the engine keeps the last-known
    /// record and increments that agent's error counter.
    Failed(String),
}

/// One agent as seen by the engine on a `get_all_agents()` call.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    pub id: String,
    pub name: String,
    pub metrics: AgentMetricsSample,
    /// `None` is treated as 0.0 (not supplied).
    pub compute_usage_pct: Option<f64>,
}

/// The three imperative/observational calls the engine makes into the
/// outside world. `get_all_agents` is called once at `start()` and once per
/// tick; `stop_agent` at most once per agent during its eviction;
/// `delete_agent` is never invoked by the engine itself — it exists only
/// for the operator-driven manual-prune-and-delete path outside this crate.
///
/// `get_all_agents` returning `Err` models a bulk accessor failure (the
/// collaborator itself unreachable, as opposed to one agent's metrics being
/// unavailable, which is `AgentMetricsSample::Failed`); the caller treats
/// that as a `LoopAborted` condition.
#[async_trait]
pub trait AgentSource: Send + Sync {
    async fn get_all_agents(&self) -> Result<Vec<AgentHandle>, String>;

    async fn stop_agent(&self, id: &str) -> bool;

    async fn delete_agent(&self, id: &str) -> bool;
}
