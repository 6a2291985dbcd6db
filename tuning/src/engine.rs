//! The main engine handle (C1, C3–C8 orchestration).
//!
//! Grounded on `scheduler/src/engine.rs`'s `SchedulerEngine<S: SessionStore>`:
//! a generic handle over an injected collaborator, its mutable state behind
//! one lock, external entry points as `async` methods on `&self`/`Arc<Self>`.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use domain::{phase, EngineConfig, EngineError, Phase};

use crate::api::{self, AgentSnapshot, AuditRowDto, ResourceUsageSnapshot, StatusSnapshot};
use crate::clock::Clock;
use crate::pruning;
use crate::ranker;
use crate::source::AgentSource;
use crate::state::EngineState;

/// A bulk accessor failure backs the loop off for this long before retrying.
const PROBE_BACKOFF: StdDuration = StdDuration::from_secs(60);

pub struct AtrwacEngine<S: AgentSource + 'static> {
    source: Arc<S>,
    clock: Arc<dyn Clock>,
    state: Mutex<EngineState>,
    notify: Notify,
    loop_handle: StdMutex<Option<JoinHandle<()>>>,
}

impl<S: AgentSource + 'static> AtrwacEngine<S> {
    /// Wire the engine to its collaborators. Does not start the evaluation
    /// loop or register any agents — that happens in `start()`.
    pub fn init(source: S, clock: Arc<dyn Clock>, config: EngineConfig) -> Result<Arc<Self>, EngineError> {
        config.validate()?;
        Ok(Arc::new(Self {
            source: Arc::new(source),
            clock,
            state: Mutex::new(EngineState::new(config)),
            notify: Notify::new(),
            loop_handle: StdMutex::new(None),
        }))
    }

    /// Stopped -> Running. A no-op (with a warning) if already running.
    /// Takes `Arc<Self>` by value so the spawned loop can hold its own
    /// strong reference; callers clone the handle before calling
    /// (`engine.clone().start().await`) to keep using `engine` afterwards.
    pub async fn start(self: Arc<Self>) {
        let mut guard = self.state.lock().await;
        if guard.running {
            warn!("start() called while the engine is already running; ignoring");
            return;
        }

        let handles = match self.source.get_all_agents().await {
            Ok(handles) => handles,
            Err(reason) => {
                warn!(reason = %reason, "get_all_agents failed at start(); starting with an empty roster");
                Vec::new()
            }
        };

        let now = self.clock.now();
        guard.register_agents(handles);
        guard.running = true;
        guard.started_at = Some(now);
        guard.phase = Phase::InitialBlast;
        drop(guard);

        info!("engine started");

        let engine = Arc::clone(&self);
        let handle = tokio::spawn(async move { engine.run_loop().await });
        *self.loop_handle.lock().unwrap() = Some(handle);
    }

    /// Running -> Stopped. A no-op if not running. Blocks until the
    /// in-progress tick (if any) has completed fully (O4).
    pub async fn stop(&self) {
        {
            let mut guard = self.state.lock().await;
            if !guard.running {
                return;
            }
            guard.running = false;
        }
        self.notify.notify_one();

        let handle = self.loop_handle.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        info!("engine stopped");
    }

    async fn run_loop(self: Arc<Self>) {
        loop {
            let interval = { self.state.lock().await.config.evaluation_interval };
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.notify.notified() => {}
            }

            let mut guard = self.state.lock().await;
            if !guard.running {
                break;
            }
            let backoff = self.tick(&mut guard).await;
            drop(guard);

            if backoff {
                tokio::time::sleep(PROBE_BACKOFF).await;
            }
        }
    }

    /// Runs C1/C3-C6 for one evaluation. Returns `true` if the accessor
    /// failed in bulk and the caller should back off before the next tick
    /// (done outside the lock — see `run_loop`).
    #[instrument(skip(self, state), fields(phase, live_count, pruned_count))]
    async fn tick(&self, state: &mut EngineState) -> bool {
        let now = self.clock.now();

        let handles = match self.source.get_all_agents().await {
            Ok(handles) => handles,
            Err(reason) => {
                tracing::error!(reason = %reason, "accessor failed for the whole tick; backing off");
                return true;
            }
        };
        state.refresh_from_handles(handles);

        ranker::rank_and_score(
            &mut state.agents,
            &state.config.weights,
            state.config.pruning.optimal_keep_count,
            now,
        );

        let mut pruned_count = 0;
        if state.phase != Phase::Maintenance {
            let day_based = day_based_phase(state, now);
            let (nominal, is_new_entry) = pruning::advance_nominal_phase(state.last_evaluated_phase, day_based);
            if is_new_entry {
                state.last_evaluated_phase = Some(nominal);
                let live_before = state.live_count();
                if pruning::enters_maintenance(live_before, state.config.pruning.optimal_keep_count) {
                    state.phase = Phase::Maintenance;
                } else {
                    state.phase = nominal;
                    if state.config.auto_prune {
                        pruned_count = self.run_pruning(state, now).await;
                    }
                }
            }
        }

        let phase_str = state.phase.to_string();
        let span = tracing::Span::current();
        span.record("phase", &phase_str.as_str());
        span.record("live_count", &state.live_count());
        span.record("pruned_count", &pruned_count);

        false
    }

    async fn run_pruning(&self, state: &mut EngineState, now: DateTime<Utc>) -> usize {
        let live = state.live_count();
        let Some(keep) = pruning::keep_count_for_phase(state.phase, live, &state.config.pruning) else {
            return 0;
        };

        let victims = pruning::select_evictions(&state.agents, keep);
        let count = victims.len();
        for agent_id in victims {
            let rank = state.find(&agent_id).and_then(|i| state.agents[i].rank).unwrap_or(0);
            let reason = format!("Below threshold in {} phase (rank {}/{})", state.phase, rank, live);
            self.evict(state, &agent_id, now, &reason).await;
        }
        count
    }

    async fn evict(&self, state: &mut EngineState, agent_id: &str, now: DateTime<Utc>, reason: &str) {
        let ok = self.source.stop_agent(agent_id).await;
        if !ok {
            warn!(agent_id, "stop_agent failed during eviction; proceeding with bookkeeping anyway");
        }

        let phase = state.phase;
        if let Some(idx) = state.find(agent_id) {
            let row = pruning::apply_eviction(&mut state.agents[idx], now, reason, phase);
            state.audit.push(row);
        }
        state.ledger.release(agent_id);
    }

    /// Replace the entire configuration (atomic swap). Rejected documents
    /// leave the previous config untouched (P7).
    pub async fn update_config(&self, new_config: EngineConfig) -> Result<EngineConfig, EngineError> {
        new_config.validate()?;
        let mut guard = self.state.lock().await;
        guard.config = new_config.clone();
        Ok(new_config)
    }

    /// Manually prune one agent, regardless of phase or auto_prune. Returns
    /// the engine's status immediately afterward, per §6's operator API
    /// shape.
    pub async fn manual_prune(&self, agent_id: &str, reason: &str) -> Result<StatusSnapshot, EngineError> {
        let now = self.clock.now();
        let mut guard = self.state.lock().await;

        let idx = guard.find(agent_id).ok_or_else(|| EngineError::NotFound {
            agent_id: agent_id.to_string(),
        })?;
        if !guard.agents[idx].is_active {
            return Err(EngineError::Conflict {
                reason: format!("agent {agent_id} is already pruned"),
            });
        }

        self.evict(&mut guard, agent_id, now, reason).await;
        Ok(build_status_snapshot(&guard, now))
    }

    /// Runs C3->C5 only; never prunes, even if `auto_prune` is set.
    pub async fn force_evaluation(&self) -> Result<Vec<AgentSnapshot>, EngineError> {
        let now = self.clock.now();
        let mut guard = self.state.lock().await;
        if !guard.running {
            return Err(EngineError::Conflict {
                reason: "engine is not running".into(),
            });
        }

        match self.source.get_all_agents().await {
            Ok(handles) => guard.refresh_from_handles(handles),
            Err(reason) => {
                tracing::error!(reason = %reason, "accessor failed during force_evaluation");
            }
        }

        ranker::rank_and_score(
            &mut guard.agents,
            &guard.config.weights,
            guard.config.pruning.optimal_keep_count,
            now,
        );

        Ok(live_snapshots(&guard))
    }

    pub async fn get_status(&self) -> StatusSnapshot {
        let guard = self.state.lock().await;
        let now = self.clock.now();
        build_status_snapshot(&guard, now)
    }

    pub async fn get_rankings(&self) -> Vec<AgentSnapshot> {
        let guard = self.state.lock().await;
        live_snapshots(&guard)
    }

    pub async fn get_champion_info(&self) -> Vec<AgentSnapshot> {
        let guard = self.state.lock().await;
        guard
            .agents
            .iter()
            .filter(|a| a.is_champion)
            .map(AgentSnapshot::from)
            .collect()
    }

    pub async fn get_pruning_history(&self) -> Vec<AuditRowDto> {
        let guard = self.state.lock().await;
        guard.audit.iter().map(AuditRowDto::from).collect()
    }

    pub async fn get_resource_usage(&self) -> ResourceUsageSnapshot {
        let guard = self.state.lock().await;
        resource_usage(&guard)
    }

    pub fn targets(&self) -> Vec<domain::OptimizationTarget> {
        api::all_targets()
    }
}

fn build_status_snapshot(state: &EngineState, now: DateTime<Utc>) -> StatusSnapshot {
    StatusSnapshot {
        enabled: state.config.enabled,
        running: state.running,
        phase: state.phase.to_string(),
        target: state.config.target,
        started_at: state.started_at,
        live_count: state.live_count(),
        total_known: state.total_known(),
        champion_count: state.agents.iter().filter(|a| a.is_champion).count(),
        days_until_next_phase: days_until_next_phase(state, now),
        resource_usage: resource_usage(state),
    }
}

fn live_snapshots(state: &EngineState) -> Vec<AgentSnapshot> {
    let mut live: Vec<&domain::AgentScore> = state.agents.iter().filter(|a| a.is_active).collect();
    live.sort_by_key(|a| a.rank.unwrap_or(u32::MAX));
    live.into_iter().map(AgentSnapshot::from).collect()
}

fn resource_usage(state: &EngineState) -> ResourceUsageSnapshot {
    ResourceUsageSnapshot {
        active_gpu_count: state.ledger.active_gpu_count(),
        active_lane_count: state.ledger.active_lane_count(),
        compute_savings_pct: state.ledger.compute_savings_pct(state.total_known()),
    }
}

fn day_based_phase(state: &EngineState, now: DateTime<Utc>) -> Phase {
    let Some(started) = state.started_at else {
        return Phase::InitialBlast;
    };
    let days = (now - started).num_days();
    phase::classify(
        days,
        state.config.pruning.first_pruning_days,
        state.config.pruning.deep_pruning_days,
        state.config.pruning.optimal_state_days,
    )
}

fn days_until_next_phase(state: &EngineState, now: DateTime<Utc>) -> Option<i64> {
    let started = state.started_at?;
    let elapsed = (now - started).num_days();
    let p = &state.config.pruning;
    let target_day = match state.phase {
        Phase::InitialBlast => p.first_pruning_days as i64,
        Phase::FirstPruning => p.deep_pruning_days as i64,
        Phase::DeepPruning => p.optimal_state_days as i64,
        Phase::OptimalState | Phase::Maintenance => return None,
    };
    Some((target_day - elapsed).max(0))
}
