pub mod api;
pub mod clock;
pub mod engine;
pub mod pruning;
pub mod ranker;
pub mod scorer;
pub mod source;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::AtrwacEngine;
pub use source::{AgentHandle, AgentMetricsSample, AgentSource};
