//! Resource ledger: sole source of truth for which agent occupies which
//! GPU slot and lane.
//!
//! Mirrors the secondary-index pattern `session::manager::SessionManager`
//! uses for its `by_pair` index: a primary map plus a derived grouping map,
//! kept consistent by construction rather than recomputed on each read.

use std::collections::{HashMap, HashSet};

use domain::ResourceAssignment;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("lane {lane_id} is already occupied by agent {existing}")]
    LaneOccupied { lane_id: u32, existing: String },
    #[error("agent {agent_id} already has a resource assignment")]
    AgentAlreadyAssigned { agent_id: String },
}

#[derive(Debug, Default)]
pub struct ResourceLedger {
    gpu_occupants: HashMap<u32, HashSet<String>>,
    lane_to_agent: HashMap<u32, String>,
    agent_to_assignment: HashMap<String, ResourceAssignment>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a lane/GPU assignment for `agent_id`. Init-time only; fails if
    /// the lane or the agent already has an entry.
    pub fn assign(&mut self, agent_id: &str, assignment: ResourceAssignment) -> Result<(), LedgerError> {
        if let Some(existing) = self.lane_to_agent.get(&assignment.lane_id) {
            return Err(LedgerError::LaneOccupied {
                lane_id: assignment.lane_id,
                existing: existing.clone(),
            });
        }
        if self.agent_to_assignment.contains_key(agent_id) {
            return Err(LedgerError::AgentAlreadyAssigned {
                agent_id: agent_id.to_string(),
            });
        }

        self.lane_to_agent.insert(assignment.lane_id, agent_id.to_string());
        self.gpu_occupants
            .entry(assignment.gpu_id)
            .or_default()
            .insert(agent_id.to_string());
        self.agent_to_assignment.insert(agent_id.to_string(), assignment);

        Ok(())
    }

    /// Remove `agent_id` from both maps. Idempotent: releasing an agent with
    /// no assignment is a no-op.
    pub fn release(&mut self, agent_id: &str) {
        let Some(assignment) = self.agent_to_assignment.remove(agent_id) else {
            return;
        };

        self.lane_to_agent.remove(&assignment.lane_id);
        if let Some(occupants) = self.gpu_occupants.get_mut(&assignment.gpu_id) {
            occupants.remove(agent_id);
            if occupants.is_empty() {
                self.gpu_occupants.remove(&assignment.gpu_id);
            }
        }
    }

    pub fn assignment_of(&self, agent_id: &str) -> Option<ResourceAssignment> {
        self.agent_to_assignment.get(agent_id).copied()
    }

    /// Count of GPUs with at least one live occupant.
    pub fn active_gpu_count(&self) -> usize {
        self.gpu_occupants.len()
    }

    /// Count of live lanes.
    pub fn active_lane_count(&self) -> usize {
        self.lane_to_agent.len()
    }

    /// Iterable view of GPU -> occupant agent ids, for status snapshots.
    pub fn gpu_occupants(&self) -> impl Iterator<Item = (u32, &HashSet<String>)> {
        self.gpu_occupants.iter().map(|(gpu, agents)| (*gpu, agents))
    }

    /// Iterable view of lane -> occupant agent id, for status snapshots.
    pub fn lane_occupants(&self) -> impl Iterator<Item = (u32, &str)> {
        self.lane_to_agent.iter().map(|(lane, agent)| (*lane, agent.as_str()))
    }

    /// `1 - live/total_known`, i.e. the fraction of originally-registered
    /// agents that have since been pruned. `total_known` is the number of
    /// agents ever assigned a lane, not just those currently live.
    pub fn compute_savings_pct(&self, total_known: usize) -> f64 {
        if total_known == 0 {
            return 0.0;
        }
        let live = self.active_lane_count();
        (1.0 - (live as f64 / total_known as f64)) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(lane: u32, gpu: u32) -> ResourceAssignment {
        ResourceAssignment {
            gpu_id: gpu,
            lane_id: lane,
        }
    }

    #[test]
    fn assign_and_release_round_trip() {
        let mut ledger = ResourceLedger::new();
        ledger.assign("a1", assignment(0, 0)).unwrap();
        ledger.assign("a2", assignment(1, 0)).unwrap();

        assert_eq!(ledger.active_lane_count(), 2);
        assert_eq!(ledger.active_gpu_count(), 1);

        ledger.release("a1");
        assert_eq!(ledger.active_lane_count(), 1);
        assert!(ledger.assignment_of("a1").is_none());
        assert_eq!(ledger.assignment_of("a2"), Some(assignment(1, 0)));
    }

    #[test]
    fn release_is_idempotent() {
        let mut ledger = ResourceLedger::new();
        ledger.release("never-assigned");
        ledger.assign("a1", assignment(0, 0)).unwrap();
        ledger.release("a1");
        ledger.release("a1");
        assert_eq!(ledger.active_lane_count(), 0);
    }

    #[test]
    fn assign_rejects_duplicate_lane() {
        let mut ledger = ResourceLedger::new();
        ledger.assign("a1", assignment(0, 0)).unwrap();
        let err = ledger.assign("a2", assignment(0, 0)).unwrap_err();
        assert!(matches!(err, LedgerError::LaneOccupied { .. }));
    }

    #[test]
    fn gpu_vacated_once_all_lanes_released() {
        let mut ledger = ResourceLedger::new();
        ledger.assign("a1", assignment(0, 0)).unwrap();
        ledger.assign("a2", assignment(1, 0)).unwrap();
        ledger.release("a1");
        assert_eq!(ledger.active_gpu_count(), 1);
        ledger.release("a2");
        assert_eq!(ledger.active_gpu_count(), 0);
    }

    #[test]
    fn compute_savings_reflects_pruned_fraction() {
        let mut ledger = ResourceLedger::new();
        for i in 0..10 {
            ledger.assign(&format!("a{i}"), assignment(i, i / 5)).unwrap();
        }
        for i in 0..5 {
            ledger.release(&format!("a{i}"));
        }
        assert_eq!(ledger.compute_savings_pct(10), 50.0);
    }
}
