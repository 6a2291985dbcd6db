use thiserror::Error;

/// Error taxonomy surfaced to callers of the engine's entry points.
///
/// `AccessorFailure` and `LoopAborted` are internal-only conditions (logged
/// and counted by the evaluation loop) and deliberately have no variant
/// here — they never propagate out of the loop task.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("config invalid: {reason}")]
    ConfigInvalid { reason: String },

    #[error("agent not found: {agent_id}")]
    NotFound { agent_id: String },

    #[error("conflict: {reason}")]
    Conflict { reason: String },
}
