//! Pruning decisions and eviction bookkeeping (C6).
//!
//! This module is pure/synchronous: it decides *who* gets evicted and
//! updates in-memory state accordingly. The actual `stop_agent` call against
//! the outside world is an async, fallible side effect the caller (the
//! evaluation loop) performs and then reports back via [`apply_eviction`].

use chrono::{DateTime, Utc};

use domain::{AgentScore, AuditRow, Phase, PruningPolicy};

/// How many live agents should remain after this tick's pruning pass, or
/// `None` if this phase does not prune automatically.
pub fn keep_count_for_phase(phase: Phase, live_count: usize, policy: &PruningPolicy) -> Option<usize> {
    let optimal = policy.optimal_keep_count as usize;
    match phase {
        Phase::InitialBlast => None,
        Phase::FirstPruning => Some(optimal.max(scaled(live_count, policy.first_keep_frac))),
        Phase::DeepPruning => Some(optimal.max(scaled(live_count, policy.deep_keep_frac))),
        Phase::OptimalState => Some(optimal),
        Phase::Maintenance => None,
    }
}

fn scaled(live_count: usize, frac: f64) -> usize {
    (live_count as f64 * frac).floor() as usize
}

/// The day-driven phase this tick nominally falls in, population-agnostic
/// and monotone (never regresses even if `day_based` briefly reports an
/// earlier phase than one already recorded). Returns whether this is the
/// first tick to observe this nominal phase — i.e. whether C6 has not yet
/// run for it. `last_evaluated` is `None` before the engine's first tick.
///
/// This is deliberately decoupled from the phase actually reported to
/// operators (`EngineState::phase`, which the pruning executor may pin to
/// `Maintenance` early): re-entering the same nominal phase on later ticks
/// must not re-trigger pruning, or a shrinking population would cascade
/// (prune on tick 1, prune again against the already-shrunk count on
/// tick 2, and so on).
pub fn advance_nominal_phase(last_evaluated: Option<Phase>, day_based: Phase) -> (Phase, bool) {
    let nominal = match last_evaluated {
        Some(phase) => phase.max(day_based),
        None => day_based,
    };
    let is_new_entry = last_evaluated != Some(nominal);
    (nominal, is_new_entry)
}

/// Per §4.6: "If N ≤ optimal_keep_count, switch phase to MAINTENANCE and
/// return" — evaluated once, on entering a phase, against the population at
/// that moment (not re-checked on every later tick of the same phase).
pub fn enters_maintenance(live_count: usize, optimal_keep_count: u32) -> bool {
    live_count as u32 <= optimal_keep_count
}

/// Ids of live agents ranked beyond `keep_count`, worst-ranked first. Agents
/// with `rank = None` (already pruned, or not yet scored) are never
/// selected.
pub fn select_evictions(agents: &[AgentScore], keep_count: usize) -> Vec<String> {
    let mut candidates: Vec<&AgentScore> = agents
        .iter()
        .filter(|a| a.is_active && a.rank.map(|r| r as usize > keep_count).unwrap_or(false))
        .collect();
    candidates.sort_by_key(|a| std::cmp::Reverse(a.rank.unwrap_or(0)));
    candidates.into_iter().map(|a| a.agent_id.clone()).collect()
}

/// Mark `agent` pruned and produce the audit row for it. Must be called
/// exactly once per eviction, after the `stop_agent` side effect has been
/// attempted (its success or failure does not change this bookkeeping —
/// §4.6's rule that a failed stop still counts the agent as pruned).
pub fn apply_eviction(agent: &mut AgentScore, now: DateTime<Utc>, reason: &str, phase: Phase) -> AuditRow {
    let row = AuditRow {
        timestamp: now,
        agent_id: agent.agent_id.clone(),
        agent_name: agent.agent_name.clone(),
        reason: reason.to_string(),
        final_score: agent.final_score,
        rank: agent.rank.unwrap_or(0),
        phase,
    };

    agent.is_active = false;
    agent.pruned_at = Some(now);
    agent.pruned_reason = reason.to_string();
    agent.rank = None;
    agent.is_champion = false;

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain::{MetricRecord, ResourceAssignment};

    fn policy() -> PruningPolicy {
        PruningPolicy::default()
    }

    fn agent(id: &str, rank: u32) -> AgentScore {
        let mut a = AgentScore::new(id.to_string(), id.to_string(), ResourceAssignment { gpu_id: 0, lane_id: rank });
        a.rank = Some(rank);
        a.metrics = MetricRecord::default();
        a
    }

    #[test]
    fn initial_blast_never_prunes() {
        assert_eq!(keep_count_for_phase(Phase::InitialBlast, 20, &policy()), None);
    }

    #[test]
    fn first_pruning_keeps_at_least_optimal_count() {
        let p = policy();
        // 4 agents * 0.5 = 2, but optimal_keep_count is 3
        assert_eq!(keep_count_for_phase(Phase::FirstPruning, 4, &p), Some(3));
        // 20 agents * 0.5 = 10
        assert_eq!(keep_count_for_phase(Phase::FirstPruning, 20, &p), Some(10));
    }

    #[test]
    fn deep_pruning_uses_deep_fraction() {
        let p = policy();
        assert_eq!(keep_count_for_phase(Phase::DeepPruning, 20, &p), Some(5));
    }

    #[test]
    fn optimal_state_keeps_exactly_optimal_count() {
        assert_eq!(keep_count_for_phase(Phase::OptimalState, 100, &policy()), Some(3));
    }

    #[test]
    fn maintenance_never_auto_prunes() {
        assert_eq!(keep_count_for_phase(Phase::Maintenance, 3, &policy()), None);
    }

    #[test]
    fn advance_nominal_phase_never_regresses() {
        let (nominal, is_new) = advance_nominal_phase(Some(Phase::DeepPruning), Phase::FirstPruning);
        assert_eq!(nominal, Phase::DeepPruning);
        assert!(!is_new);
    }

    #[test]
    fn advance_nominal_phase_flags_first_observation_as_new() {
        let (nominal, is_new) = advance_nominal_phase(None, Phase::FirstPruning);
        assert_eq!(nominal, Phase::FirstPruning);
        assert!(is_new);
    }

    #[test]
    fn advance_nominal_phase_is_stable_within_the_same_phase() {
        let (nominal, is_new) = advance_nominal_phase(Some(Phase::FirstPruning), Phase::FirstPruning);
        assert_eq!(nominal, Phase::FirstPruning);
        assert!(!is_new);
    }

    #[test]
    fn enters_maintenance_at_or_below_optimal_count() {
        assert!(enters_maintenance(3, 3));
        assert!(enters_maintenance(2, 3));
        assert!(!enters_maintenance(4, 3));
    }

    #[test]
    fn select_evictions_picks_worst_ranked_beyond_keep_count() {
        let agents = vec![agent("a", 1), agent("b", 2), agent("c", 3), agent("d", 4)];
        let evicted = select_evictions(&agents, 2);
        assert_eq!(evicted, vec!["d".to_string(), "c".to_string()]);
    }

    #[test]
    fn select_evictions_skips_already_pruned() {
        let mut agents = vec![agent("a", 1), agent("b", 2)];
        agents[1].is_active = false;
        agents[1].rank = None;
        let evicted = select_evictions(&agents, 0);
        assert_eq!(evicted, vec!["a".to_string()]);
    }

    #[test]
    fn apply_eviction_sets_terminal_state_and_returns_matching_row() {
        let mut a = agent("x", 5);
        a.final_score = 42.0;
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let row = apply_eviction(&mut a, now, "ranked below cutoff", Phase::FirstPruning);

        assert!(!a.is_active);
        assert_eq!(a.pruned_at, Some(now));
        assert_eq!(a.pruned_reason, "ranked below cutoff");
        assert_eq!(a.rank, None);
        assert!(!a.is_champion);

        assert_eq!(row.agent_id, "x");
        assert_eq!(row.final_score, 42.0);
        assert_eq!(row.rank, 5);
        assert_eq!(row.timestamp, now);
    }
}
