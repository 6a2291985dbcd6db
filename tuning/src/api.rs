//! Operator-facing snapshot/DTO types (C8).
//!
//! The spec scopes the FastAPI router itself out; these plain serializable
//! structs mirror its JSON response shapes closely enough that a thin HTTP
//! layer could be bolted on later without reaching into engine internals.

use chrono::{DateTime, Utc};
use serde::Serialize;

use domain::{AgentScore, AuditRow, OptimizationTarget, ResourceAssignment};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceAssignmentDto {
    pub gpu_id: u32,
    pub lane_id: u32,
}

impl From<ResourceAssignment> for ResourceAssignmentDto {
    fn from(a: ResourceAssignment) -> Self {
        Self {
            gpu_id: a.gpu_id,
            lane_id: a.lane_id,
        }
    }
}

/// One agent's public state, as returned by `/rankings` and `/champions`.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub agent_id: String,
    pub agent_name: String,
    pub resource_assignment: ResourceAssignmentDto,
    pub total_profit: f64,
    pub win_rate: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub final_score: f64,
    pub rank: Option<u32>,
    pub is_active: bool,
    pub is_champion: bool,
    pub pruned_at: Option<DateTime<Utc>>,
    pub pruned_reason: String,
    pub error_count: u32,
}

impl From<&AgentScore> for AgentSnapshot {
    fn from(a: &AgentScore) -> Self {
        Self {
            agent_id: a.agent_id.clone(),
            agent_name: a.agent_name.clone(),
            resource_assignment: a.resource_assignment.into(),
            total_profit: a.metrics.total_profit,
            win_rate: a.metrics.win_rate,
            sharpe_ratio: a.metrics.sharpe_ratio,
            max_drawdown: a.metrics.max_drawdown,
            final_score: a.final_score,
            rank: a.rank,
            is_active: a.is_active,
            is_champion: a.is_champion,
            pruned_at: a.pruned_at,
            pruned_reason: a.pruned_reason.clone(),
            error_count: a.error_count,
        }
    }
}

/// One row of `/pruning-history`.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRowDto {
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    pub agent_name: String,
    pub reason: String,
    pub final_score: f64,
    pub rank: u32,
    pub phase: String,
}

impl From<&AuditRow> for AuditRowDto {
    fn from(row: &AuditRow) -> Self {
        Self {
            timestamp: row.timestamp,
            agent_id: row.agent_id.clone(),
            agent_name: row.agent_name.clone(),
            reason: row.reason.clone(),
            final_score: row.final_score,
            rank: row.rank,
            phase: row.phase.to_string(),
        }
    }
}

/// `/resource-usage`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResourceUsageSnapshot {
    pub active_gpu_count: usize,
    pub active_lane_count: usize,
    pub compute_savings_pct: f64,
}

/// `/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub enabled: bool,
    pub running: bool,
    pub phase: String,
    pub target: OptimizationTarget,
    pub started_at: Option<DateTime<Utc>>,
    pub live_count: usize,
    pub total_known: usize,
    pub champion_count: usize,
    pub days_until_next_phase: Option<i64>,
    pub resource_usage: ResourceUsageSnapshot,
}

/// `/targets` — the eight accepted identifiers, exact case.
pub fn all_targets() -> Vec<OptimizationTarget> {
    use OptimizationTarget::*;
    vec![
        MaxProfit,
        MaxGrowthPct,
        FastestSpeed,
        MaxWinRate,
        MinDrawdown,
        BestSharpe,
        SentimentAligned,
        Custom,
    ]
}
