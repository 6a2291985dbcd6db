pub mod cli;
pub mod fleet;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration as ChronoDuration, Utc};
use clap::Parser;

use cli::Cli;
use common::logger::init_logger;
use domain::EngineConfig;
use fleet::DemoFleet;
use tuning::{AtrwacEngine, ManualClock};

const DEMO_SNAPSHOTS: u32 = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger("atrwac-cli");

    let cli = Cli::parse();

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let fleet = DemoFleet::new(
        cli.agents,
        clock.clone(),
        ChronoDuration::minutes(cli.time_warp_minutes_per_tick),
    );

    let mut config = EngineConfig::for_target(cli.target.into());
    config.enabled = true;
    config.auto_prune = !cli.no_auto_prune;
    config.evaluation_interval = StdDuration::from_secs(cli.interval_secs);

    let engine = AtrwacEngine::init(fleet, clock, config)?;
    engine.clone().start().await;

    for _ in 0..DEMO_SNAPSHOTS {
        tokio::time::sleep(StdDuration::from_secs(cli.interval_secs)).await;

        let status = engine.get_status().await;
        tracing::info!(
            phase = %status.phase,
            live = status.live_count,
            total = status.total_known,
            champions = status.champion_count,
            days_until_next_phase = ?status.days_until_next_phase,
            "tick snapshot"
        );
    }

    engine.stop().await;
    Ok(())
}
