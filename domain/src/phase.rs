use std::fmt;

/// Monotone lifecycle phase, driven by elapsed days since the engine started.
///
/// `Maintenance` is entered permanently once the live population has shrunk
/// to `optimal_keep_count` or below; it never reverts to an earlier phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    InitialBlast,
    FirstPruning,
    DeepPruning,
    OptimalState,
    Maintenance,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::InitialBlast => "initial_blast",
            Phase::FirstPruning => "first_pruning",
            Phase::DeepPruning => "deep_pruning",
            Phase::OptimalState => "optimal_state",
            Phase::Maintenance => "maintenance",
        };
        f.write_str(s)
    }
}

/// Classifies elapsed days since start into a phase, per the day thresholds
/// in `PruningPolicy`. Does not consider population size; `Maintenance` is
/// assigned by the pruning executor once the live count drops low enough.
pub fn classify(days: i64, first_pruning_days: u32, deep_pruning_days: u32, optimal_state_days: u32) -> Phase {
    let days = days.max(0) as u32;
    if days < first_pruning_days {
        Phase::InitialBlast
    } else if days < deep_pruning_days {
        Phase::FirstPruning
    } else if days < optimal_state_days {
        Phase::DeepPruning
    } else {
        Phase::OptimalState
    }
}
