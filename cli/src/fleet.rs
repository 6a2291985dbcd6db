use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;

use domain::MetricRecord;
use tuning::{AgentHandle, AgentMetricsSample, AgentSource, ManualClock};

/// A synthetic fleet for the demo binary: deterministic, slowly drifting
/// metrics and a clock that warps forward on every probe, so the phase
/// lifecycle is visible without waiting real days.
pub struct DemoFleet {
    agent_count: usize,
    clock: Arc<ManualClock>,
    time_warp: ChronoDuration,
    tick: AtomicU64,
}

impl DemoFleet {
    pub fn new(agent_count: usize, clock: Arc<ManualClock>, time_warp: ChronoDuration) -> Self {
        Self {
            agent_count,
            clock,
            time_warp,
            tick: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl AgentSource for DemoFleet {
    async fn get_all_agents(&self) -> Result<Vec<AgentHandle>, String> {
        let tick = self.tick.fetch_add(1, Ordering::SeqCst) as f64;
        self.clock.advance(self.time_warp);

        let handles = (0..self.agent_count)
            .map(|i| {
                let idx = i as f64;
                let drift = tick * 0.01 * (idx + 1.0);
                AgentHandle {
                    id: format!("bot-{i}"),
                    name: format!("Agent {i}"),
                    metrics: AgentMetricsSample::Recorded(MetricRecord {
                        total_profit: 500.0 + (idx * 317.0 % 4000.0) + drift,
                        profit_pct: 0.01 * (idx + 1.0),
                        win_rate: (0.35 + idx * 0.04).min(0.9),
                        total_trades: 15 + i as u64,
                        avg_trade_duration_minutes: 20.0 + idx,
                        max_drawdown: (0.4 - idx * 0.02).max(0.02),
                        sharpe_ratio: -1.0 + idx * 0.3,
                        sentiment_accuracy: (0.5 + idx * 0.02).min(0.95),
                    }),
                    compute_usage_pct: Some(5.0 + (idx % 20.0)),
                }
            })
            .collect();

        Ok(handles)
    }

    async fn stop_agent(&self, id: &str) -> bool {
        tracing::info!(agent_id = %id, "demo fleet: stopping agent");
        true
    }

    async fn delete_agent(&self, id: &str) -> bool {
        tracing::info!(agent_id = %id, "demo fleet: deleting agent");
        true
    }
}
