//! Per-project participation state within one target.

use rally_types::{NormalizedAmount, ProjectId, RawAmount, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A project's standing within a campaign or stage.
///
/// Aggregates are maintained incrementally on every record append so reads
/// are O(1); they always equal the sum over the target's records for this
/// project. `funds_received` is written exactly once, at payout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Participation {
    pub project: ProjectId,
    /// Total normalized votes (contributions minus compensations).
    pub total_votes: NormalizedAmount,
    /// Raw amounts received, broken down per token.
    pub raw_by_token: BTreeMap<TokenId, RawAmount>,
    /// Payout received at distribution. Set once; never overwritten.
    pub funds_received: Option<NormalizedAmount>,
}

impl Participation {
    pub fn new(project: ProjectId) -> Self {
        Self {
            project,
            total_votes: NormalizedAmount::ZERO,
            raw_by_token: BTreeMap::new(),
            funds_received: None,
        }
    }

    /// Raw aggregate for one token (zero if the token was never used).
    pub fn raw_for_token(&self, token: &TokenId) -> RawAmount {
        self.raw_by_token
            .get(token)
            .copied()
            .unwrap_or(RawAmount::ZERO)
    }

    pub fn has_been_paid(&self) -> bool {
        self.funds_received.is_some()
    }
}
