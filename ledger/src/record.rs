//! Immutable vote records.

use rally_types::{NormalizedAmount, ProjectId, RawAmount, Timestamp, TokenId, VoteTarget, VoterId};
use serde::{Deserialize, Serialize};

/// Whether a record adds value or compensates a prior contribution.
///
/// Withdrawal never erases history: it appends a `Compensation` record whose
/// amounts are subtracted from the aggregates, leaving the original
/// contribution record intact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Contribution,
    Compensation,
}

/// One immutable ledger entry. Never mutated or deleted once appended.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: VoterId,
    pub target: VoteTarget,
    pub project: ProjectId,
    pub token: TokenId,
    pub raw_amount: RawAmount,
    pub normalized_amount: NormalizedAmount,
    pub kind: RecordKind,
    pub timestamp: Timestamp,
}
