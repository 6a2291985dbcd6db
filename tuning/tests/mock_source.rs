use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use domain::MetricRecord;
use tuning::{AgentHandle, AgentMetricsSample, AgentSource};

/// Scriptable in-memory collaborator, playing the role
/// `InMemorySessionStore` plays for `SessionManager`.
#[derive(Clone)]
pub struct MockAgentSource {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    agents: Vec<AgentHandle>,
    stopped: Vec<String>,
    deleted: Vec<String>,
}

impl MockAgentSource {
    /// `n` agents with strictly increasing profit (agent-0 worst, agent-{n-1} best).
    pub fn new(n: usize) -> Self {
        let agents = (0..n)
            .map(|i| AgentHandle {
                id: format!("agent-{i}"),
                name: format!("Agent {i}"),
                metrics: AgentMetricsSample::Recorded(MetricRecord {
                    total_profit: 1_000.0 + i as f64 * 500.0,
                    profit_pct: 0.1,
                    win_rate: 0.5,
                    total_trades: 20,
                    avg_trade_duration_minutes: 30.0,
                    max_drawdown: 0.1,
                    sharpe_ratio: 1.0,
                    sentiment_accuracy: 0.5,
                }),
                compute_usage_pct: Some(10.0),
            })
            .collect();

        Self {
            inner: Arc::new(Mutex::new(Inner {
                agents,
                ..Default::default()
            })),
        }
    }

    pub async fn fail_agent(&self, id: &str, reason: &str) {
        let mut inner = self.inner.lock().await;
        if let Some(a) = inner.agents.iter_mut().find(|a| a.id == id) {
            a.metrics = AgentMetricsSample::Failed(reason.to_string());
        }
    }

    pub async fn stopped_ids(&self) -> Vec<String> {
        self.inner.lock().await.stopped.clone()
    }
}

#[async_trait]
impl AgentSource for MockAgentSource {
    async fn get_all_agents(&self) -> Result<Vec<AgentHandle>, String> {
        Ok(self.inner.lock().await.agents.clone())
    }

    async fn stop_agent(&self, id: &str) -> bool {
        self.inner.lock().await.stopped.push(id.to_string());
        true
    }

    async fn delete_agent(&self, id: &str) -> bool {
        self.inner.lock().await.deleted.push(id.to_string());
        true
    }
}
