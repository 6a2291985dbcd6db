pub mod audit;
pub mod config;
pub mod error;
pub mod metrics;
pub mod phase;
pub mod resource;
pub mod score;

pub use audit::AuditRow;
pub use config::{EngineConfig, OptimizationTarget, PruningPolicy, Weights};
pub use error::EngineError;
pub use metrics::MetricRecord;
pub use phase::Phase;
pub use resource::ResourceAssignment;
pub use score::AgentScore;
