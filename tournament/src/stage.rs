//! Tournament stages.

use rally_types::{NormalizedAmount, ProjectId, StageState, Timestamp};
use serde::{Deserialize, Serialize};

/// One elimination round within a tournament.
///
/// The roster is fixed once the stage starts; elimination only happens at
/// finalization, producing the next stage's roster.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stage {
    pub index: u32,
    /// Accumulated normalized reward pool, funded any time before finalization.
    pub reward_pool: NormalizedAmount,
    /// Share of the roster eliminated at finalization (0..=100).
    pub elimination_pct: u8,
    pub state: StageState,
    /// Carried from the prior stage's survivors (or the campaign's approved
    /// set for stage 0).
    pub roster: Vec<ProjectId>,
    pub started_at: Option<Timestamp>,
    pub finalized_at: Option<Timestamp>,
}

impl Stage {
    pub fn new(index: u32, roster: Vec<ProjectId>, elimination_pct: u8) -> Self {
        Self {
            index,
            reward_pool: NormalizedAmount::ZERO,
            elimination_pct,
            state: StageState::NotStarted,
            roster,
            started_at: None,
            finalized_at: None,
        }
    }

    /// How many projects finalization drops from this roster.
    /// Zero when disqualification is disabled tournament-wide.
    pub fn eliminated_count(&self, disqualify_enabled: bool) -> usize {
        if !disqualify_enabled {
            return 0;
        }
        self.roster.len() * self.elimination_pct as usize / 100
    }
}
