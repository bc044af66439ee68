//! Audit events — one record per committed action.
//!
//! Every mutating engine action emits an `EventRecord` sufficient to
//! reconstruct the action. Records carry the resulting aggregate so that
//! downstream consumers (analytics, UI) never need to re-derive totals by
//! replaying raw votes.

use crate::amount::{NormalizedAmount, RawAmount};
use crate::id::{CampaignId, ProjectId, TournamentId, VoterId};
use crate::time::Timestamp;
use crate::token::TokenId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of action an event records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    VoteRecorded,
    VoteWithdrawn,
    CampaignCreated,
    CampaignClosed,
    CampaignDistributed,
    TournamentStarted,
    StageStarted,
    StageFunded,
    StageFinalized,
    TournamentCompleted,
    TournamentCancelled,
}

/// What an event was committed against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTarget {
    Campaign(CampaignId),
    Tournament(TournamentId),
    Stage(TournamentId, u32),
}

impl fmt::Display for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Campaign(id) => write!(f, "{id}"),
            Self::Tournament(id) => write!(f, "{id}"),
            Self::Stage(id, index) => write!(f, "{id}/stage-{index}"),
        }
    }
}

/// A committed-action audit record.
///
/// Optional fields are populated where the action has them: a vote carries
/// actor, project, token, and both amounts; a stage funding carries token
/// and amounts but no project; a finalization carries only the target.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    pub action: ActionKind,
    pub target: EventTarget,
    pub actor: Option<VoterId>,
    pub project: Option<ProjectId>,
    pub token: Option<TokenId>,
    pub raw_amount: Option<RawAmount>,
    pub normalized_amount: Option<NormalizedAmount>,
    /// The project's (or pool's) normalized aggregate after this action.
    pub resulting_aggregate: Option<NormalizedAmount>,
    pub timestamp: Timestamp,
}

impl EventRecord {
    /// A bare record with only action, target, and time; callers fill in the
    /// optional fields they have.
    pub fn new(action: ActionKind, target: EventTarget, timestamp: Timestamp) -> Self {
        Self {
            action,
            target,
            actor: None,
            project: None,
            token: None,
            raw_amount: None,
            normalized_amount: None,
            resulting_aggregate: None,
            timestamp,
        }
    }
}
