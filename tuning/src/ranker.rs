//! Ranking and champion-set assignment (C5).
//!
//! Operates over the full roster (including already-pruned agents) so
//! callers never have to pre-filter; pruned agents are left untouched.

use chrono::{DateTime, Utc};

use domain::{AgentScore, Weights};

use crate::scorer;

/// Score every live agent, sort them, assign dense ranks starting at 1, and
/// mark the top `champion_count` (or fewer, if the live population is
/// smaller) as champions. Pruned agents keep `rank = None` and
/// `is_champion = false`.
pub fn rank_and_score(agents: &mut [AgentScore], weights: &Weights, champion_count: u32, now: DateTime<Utc>) {
    for agent in agents.iter_mut() {
        if !agent.is_active {
            agent.rank = None;
            agent.is_champion = false;
            continue;
        }
        let sanitized = agent.metrics.sanitized();
        agent.metrics = sanitized;
        agent.final_score = scorer::score(&sanitized, weights, agent.compute_usage_pct);
        agent.score_history.push((now, agent.final_score));
    }

    let mut live_indices: Vec<usize> = agents
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_active)
        .map(|(i, _)| i)
        .collect();

    live_indices.sort_by(|&i, &j| {
        scorer::rank_order(
            agents[i].final_score,
            agents[i].metrics.total_profit,
            agents[i].resource_assignment.lane_id,
            agents[j].final_score,
            agents[j].metrics.total_profit,
            agents[j].resource_assignment.lane_id,
        )
    });

    let champion_cutoff = champion_count as usize;
    for (rank, &idx) in live_indices.iter().enumerate() {
        agents[idx].rank = Some(rank as u32 + 1);
        agents[idx].is_champion = rank < champion_cutoff;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain::{MetricRecord, ResourceAssignment};

    fn weights() -> Weights {
        Weights {
            profit: 1.0,
            win_rate: 0.0,
            efficiency: 0.0,
            resource_penalty: 0.0,
            speed: 0.0,
            sentiment: 0.0,
            drawdown: 0.0,
        }
    }

    fn agent(id: &str, lane: u32, profit: f64) -> AgentScore {
        let mut a = AgentScore::new(id.to_string(), id.to_string(), ResourceAssignment { gpu_id: 0, lane_id: lane });
        a.metrics = MetricRecord {
            total_profit: profit,
            ..Default::default()
        };
        a
    }

    #[test]
    fn ranks_by_descending_score() {
        let mut agents = vec![agent("a", 0, 1000.0), agent("b", 1, 9000.0), agent("c", 2, 5000.0)];
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        rank_and_score(&mut agents, &weights(), 1, now);

        assert_eq!(agents[1].rank, Some(1)); // b highest profit
        assert_eq!(agents[2].rank, Some(2)); // c
        assert_eq!(agents[0].rank, Some(3)); // a
        assert!(agents[1].is_champion);
        assert!(!agents[2].is_champion);
    }

    #[test]
    fn pruned_agents_are_excluded_from_ranking() {
        let mut agents = vec![agent("a", 0, 1000.0), agent("b", 1, 9000.0)];
        agents[1].is_active = false;
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        rank_and_score(&mut agents, &weights(), 5, now);

        assert_eq!(agents[0].rank, Some(1));
        assert_eq!(agents[1].rank, None);
        assert!(!agents[1].is_champion);
    }

    #[test]
    fn champion_count_never_exceeds_live_population() {
        let mut agents = vec![agent("a", 0, 1000.0)];
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        rank_and_score(&mut agents, &weights(), 3, now);
        assert!(agents[0].is_champion);
    }

    #[test]
    fn score_history_accumulates_across_calls() {
        let mut agents = vec![agent("a", 0, 1000.0)];
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        rank_and_score(&mut agents, &weights(), 1, t1);
        rank_and_score(&mut agents, &weights(), 1, t2);
        assert_eq!(agents[0].score_history.len(), 2);
    }
}
