//! Lifecycle enums and vote-target addressing shared across engines.

use crate::id::{CampaignId, TournamentId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a closed pool of funds is split among winning projects.
///
/// Resolved once at distribution time; a campaign's rule is fixed at
/// creation and inherited by any tournament linked to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributionRule {
    /// Payout proportional to normalized vote totals.
    Linear,
    /// Payout proportional to the floor integer square root of vote totals,
    /// rewarding broad small-scale support over concentrated large votes.
    Quadratic,
}

/// What a vote is recorded against: a campaign, or a stage of a tournament.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VoteTarget {
    Campaign(CampaignId),
    Stage(TournamentId, u32),
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Campaign(id) => write!(f, "{id}"),
            Self::Stage(id, index) => write!(f, "{id}/stage-{index}"),
        }
    }
}

/// The lifecycle state of a campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignState {
    /// Created, start time not yet reached.
    Pending,
    /// Within the voting window; contributions accepted.
    Active,
    /// Past the end time or explicitly cancelled; awaiting distribution.
    Closed,
    /// Funds have been distributed. Terminal.
    Distributed,
}

impl CampaignState {
    /// Whether contributions may be recorded in this state.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether distribution may run from this state.
    pub fn can_distribute(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// The lifecycle state of a tournament.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TournamentState {
    /// Configured but not started.
    Created,
    /// Stages are running.
    Active,
    /// All stages finalized or the roster emptied. Terminal.
    Completed,
    /// Cancelled by explicit admin action. Terminal.
    Cancelled,
}

impl TournamentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// The lifecycle state of a single tournament stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageState {
    /// Roster assigned but voting not yet open.
    NotStarted,
    /// Voting window open.
    Started,
    /// Leaderboard computed, pool distributed, roster carried forward. Terminal.
    Finalized,
}

impl StageState {
    /// Whether votes may be recorded against a stage in this state.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Started)
    }
}
