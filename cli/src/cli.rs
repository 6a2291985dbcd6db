use clap::{Parser, ValueEnum};

use domain::OptimizationTarget;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TargetArg {
    MaxProfit,
    MaxGrowthPct,
    FastestSpeed,
    MaxWinRate,
    MinDrawdown,
    BestSharpe,
    SentimentAligned,
}

impl From<TargetArg> for OptimizationTarget {
    fn from(t: TargetArg) -> Self {
        match t {
            TargetArg::MaxProfit => OptimizationTarget::MaxProfit,
            TargetArg::MaxGrowthPct => OptimizationTarget::MaxGrowthPct,
            TargetArg::FastestSpeed => OptimizationTarget::FastestSpeed,
            TargetArg::MaxWinRate => OptimizationTarget::MaxWinRate,
            TargetArg::MinDrawdown => OptimizationTarget::MinDrawdown,
            TargetArg::BestSharpe => OptimizationTarget::BestSharpe,
            TargetArg::SentimentAligned => OptimizationTarget::SentimentAligned,
        }
    }
}

#[derive(Debug, Parser)]
#[clap(name = "atrwac", version)]
pub struct Cli {
    /// Optimisation target the fleet is tuned for.
    #[clap(long, value_enum, default_value = "max-profit")]
    pub target: TargetArg,

    /// Number of demo agents to seed the fleet with.
    #[clap(long, default_value_t = 12)]
    pub agents: usize,

    /// Evaluation interval, in seconds.
    #[clap(long, default_value_t = 5)]
    pub interval_secs: u64,

    /// Disable automatic pruning; the engine only scores and ranks.
    #[clap(long)]
    pub no_auto_prune: bool,

    /// Minutes of wall-clock time to simulate per real second (speeds up
    /// phase transitions for the demo instead of waiting real days).
    #[clap(long, default_value_t = 720)]
    pub time_warp_minutes_per_tick: i64,
}
