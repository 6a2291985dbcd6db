//! The weighted multi-objective scorer (C4).
//!
//! Every raw component is bounded to roughly [0,1000] so weight magnitudes
//! stay directly comparable; the final clamp to zero means a penalty-heavy
//! configuration can never produce a negative score that would invert
//! ordering at the tail.

use std::cmp::Ordering;

use domain::{MetricRecord, Weights};

const TIE_EPSILON: f64 = 1e-9;

/// Compute the final score for one sanitized `MetricRecord` under `weights`.
/// `compute_usage_pct` is resource-ledger-adjacent data, not part of
/// `MetricRecord` itself, so it is threaded in separately.
pub fn score(metrics: &MetricRecord, weights: &Weights, compute_usage_pct: f64) -> f64 {
    let profit_raw = if metrics.total_profit > 0.0 {
        (metrics.total_profit / 10_000.0).clamp(0.0, 1.0) * 1000.0
    } else {
        0.0
    };

    let win_raw = metrics.win_rate * 1000.0;

    let efficiency_raw = ((metrics.sharpe_ratio + 3.0) / 6.0).clamp(0.0, 1.0) * 1000.0;

    let resource_raw = compute_usage_pct * 10.0;

    let speed_raw = if weights.speed > 0.0 {
        (1000.0 / metrics.avg_trade_duration_minutes.max(1.0)).min(1000.0)
    } else {
        0.0
    };

    let sentiment_raw = if weights.sentiment > 0.0 {
        metrics.sentiment_accuracy * 1000.0
    } else {
        0.0
    };

    let drawdown_raw = if weights.drawdown > 0.0 {
        metrics.max_drawdown * 1000.0
    } else {
        0.0
    };

    let raw = weights.profit * profit_raw + weights.win_rate * win_raw
        + weights.efficiency * efficiency_raw
        + weights.speed * speed_raw
        + weights.sentiment * sentiment_raw
        - weights.resource_penalty * resource_raw
        - weights.drawdown * drawdown_raw;

    raw.max(0.0)
}

/// Deterministic ordering key for ranking: score DESC, then tie-break on
/// total_profit DESC, then lane_id ASC. Scores within `TIE_EPSILON` of each
/// other are treated as equal for the purpose of the first comparison.
pub fn rank_order(
    a_score: f64,
    a_profit: f64,
    a_lane: u32,
    b_score: f64,
    b_profit: f64,
    b_lane: u32,
) -> Ordering {
    if (a_score - b_score).abs() > TIE_EPSILON {
        return b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal);
    }
    if (a_profit - b_profit).abs() > f64::EPSILON {
        return b_profit.partial_cmp(&a_profit).unwrap_or(Ordering::Equal);
    }
    a_lane.cmp(&b_lane)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::MetricRecord;

    fn weights(profit: f64, win_rate: f64, efficiency: f64, resource_penalty: f64) -> Weights {
        Weights {
            profit,
            win_rate,
            efficiency,
            resource_penalty,
            speed: 0.0,
            sentiment: 0.0,
            drawdown: 0.0,
        }
    }

    #[test]
    fn zero_profit_contributes_nothing() {
        let m = MetricRecord {
            total_profit: -500.0,
            ..Default::default()
        };
        let w = weights(1.0, 0.0, 0.0, 0.0);
        assert_eq!(score(&m, &w, 0.0), 0.0);
    }

    #[test]
    fn profit_is_clamped_above_ten_thousand() {
        let m = MetricRecord {
            total_profit: 50_000.0,
            ..Default::default()
        };
        let w = weights(1.0, 0.0, 0.0, 0.0);
        assert_eq!(score(&m, &w, 0.0), 1000.0);
    }

    #[test]
    fn resource_penalty_subtracts_and_clamps_at_zero() {
        let m = MetricRecord::default();
        let w = weights(0.0, 0.0, 0.0, 1.0);
        // compute_usage_pct=100 -> resource_raw=1000, weight 1.0 -> would be -1000
        assert_eq!(score(&m, &w, 100.0), 0.0);
    }

    #[test]
    fn speed_ignored_unless_weighted() {
        let m = MetricRecord {
            avg_trade_duration_minutes: 1.0,
            ..Default::default()
        };
        let mut w = weights(0.0, 0.0, 0.0, 0.0);
        assert_eq!(score(&m, &w, 0.0), 0.0);

        w.speed = 0.5;
        assert_eq!(score(&m, &w, 0.0), 500.0);
    }

    #[test]
    fn drawdown_only_penalizes_when_weighted() {
        let m = MetricRecord {
            max_drawdown: 0.5,
            ..Default::default()
        };
        let mut w = weights(0.0, 0.0, 0.0, 0.0);
        assert_eq!(score(&m, &w, 0.0), 0.0);

        w.drawdown = 1.0;
        assert_eq!(score(&m, &w, 0.0), 0.0); // 0 - 1*(0.5*1000) clamps to 0
    }

    #[test]
    fn score_is_deterministic_for_fixed_input() {
        let m = MetricRecord {
            total_profit: 5000.0,
            win_rate: 0.6,
            sharpe_ratio: 1.0,
            ..Default::default()
        };
        let w = weights(0.5, 0.25, 0.15, 0.10);
        let s1 = score(&m, &w, 12.0);
        let s2 = score(&m, &w, 12.0);
        assert_eq!(s1, s2);
    }

    #[test]
    fn rank_order_breaks_ties_by_profit_then_lane() {
        assert_eq!(rank_order(100.0, 50.0, 2, 100.0, 60.0, 1), Ordering::Greater);
        assert_eq!(rank_order(100.0, 50.0, 1, 100.0, 50.0, 2), Ordering::Less);
        assert_eq!(rank_order(200.0, 0.0, 0, 100.0, 0.0, 0), Ordering::Less);
    }
}
