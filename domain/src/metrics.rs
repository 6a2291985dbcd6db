/// Raw performance readout pulled from a single agent on a single tick.
///
/// Fields mirror the agent's trading statistics bag; a missing field at the
/// collaborator boundary defaults to zero rather than failing the read.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricRecord {
    pub total_profit: f64,
    pub profit_pct: f64,
    pub win_rate: f64,
    pub total_trades: u64,
    pub avg_trade_duration_minutes: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sentiment_accuracy: f64,
}

impl MetricRecord {
    /// Replace any NaN/Infinity component with 0.0. The scorer must never
    /// observe a non-finite input.
    pub fn sanitized(self) -> Self {
        let clean = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            total_profit: clean(self.total_profit),
            profit_pct: clean(self.profit_pct),
            win_rate: clean(self.win_rate),
            total_trades: self.total_trades,
            avg_trade_duration_minutes: clean(self.avg_trade_duration_minutes),
            max_drawdown: clean(self.max_drawdown),
            sharpe_ratio: clean(self.sharpe_ratio),
            sentiment_accuracy: clean(self.sentiment_accuracy),
        }
    }
}
