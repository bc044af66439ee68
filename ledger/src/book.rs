//! Per-target ledger book — records plus incrementally maintained aggregates.

use crate::error::LedgerError;
use crate::participation::Participation;
use crate::record::{RecordKind, VoteRecord};
use rally_types::{NormalizedAmount, ProjectId, RawAmount, TokenId, VoteTarget, VoterId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All ledger state for one campaign or stage.
///
/// `BTreeMap` keys give deterministic iteration order, which the leaderboard
/// tie-break (ascending project identity) relies on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TargetBook {
    pub target: VoteTarget,
    accepting: bool,
    participations: BTreeMap<ProjectId, Participation>,
    voter_totals: BTreeMap<VoterId, NormalizedAmount>,
    voter_project_totals: BTreeMap<(VoterId, ProjectId), NormalizedAmount>,
    voter_raw_totals: BTreeMap<(VoterId, ProjectId, TokenId), RawAmount>,
    records: Vec<VoteRecord>,
}

impl TargetBook {
    pub fn new(target: VoteTarget) -> Self {
        Self {
            target,
            accepting: false,
            participations: BTreeMap::new(),
            voter_totals: BTreeMap::new(),
            voter_project_totals: BTreeMap::new(),
            voter_raw_totals: BTreeMap::new(),
            records: Vec::new(),
        }
    }

    pub fn accepting(&self) -> bool {
        self.accepting
    }

    /// Flip the accepting-votes gate. Closing a book before reading its
    /// aggregates is what makes a distribution snapshot exact.
    pub fn set_accepting(&mut self, accepting: bool) {
        self.accepting = accepting;
    }

    /// Admit a project as an approved participant of this target.
    pub fn approve_project(&mut self, project: ProjectId) -> Result<(), LedgerError> {
        if self.participations.contains_key(&project) {
            return Err(LedgerError::ProjectAlreadyApproved(project));
        }
        self.participations
            .insert(project, Participation::new(project));
        Ok(())
    }

    pub fn is_approved(&self, project: &ProjectId) -> bool {
        self.participations.contains_key(project)
    }

    pub fn participation(&self, project: &ProjectId) -> Option<&Participation> {
        self.participations.get(project)
    }

    pub fn participation_mut(&mut self, project: &ProjectId) -> Option<&mut Participation> {
        self.participations.get_mut(project)
    }

    pub fn participations(&self) -> impl Iterator<Item = &Participation> {
        self.participations.values()
    }

    pub fn records(&self) -> &[VoteRecord] {
        &self.records
    }

    /// Check that a contribution with this normalized amount could be
    /// applied without violating any precondition. Used for the batch
    /// dry-run; performs no mutation.
    pub fn validate_contribution(
        &self,
        project: &ProjectId,
        normalized: NormalizedAmount,
        already_pending: NormalizedAmount,
    ) -> Result<(), LedgerError> {
        if !self.accepting {
            return Err(LedgerError::TargetNotAcceptingVotes(self.target.to_string()));
        }
        if normalized.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        let participation = self
            .participations
            .get(project)
            .ok_or(LedgerError::ProjectNotApproved(*project))?;
        participation
            .total_votes
            .checked_add(already_pending)
            .and_then(|v| v.checked_add(normalized))
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Append a contribution record and bump every aggregate it touches, as
    /// one mutation. Returns the project's resulting normalized total.
    ///
    /// All preconditions are re-checked here so the book can never be driven
    /// into an inconsistent state by a caller skipping validation.
    pub fn apply_contribution(
        &mut self,
        record: VoteRecord,
    ) -> Result<NormalizedAmount, LedgerError> {
        debug_assert_eq!(record.kind, RecordKind::Contribution);
        self.validate_contribution(
            &record.project,
            record.normalized_amount,
            NormalizedAmount::ZERO,
        )?;

        // Compute every new aggregate before committing anything.
        let participation = self
            .participations
            .get(&record.project)
            .ok_or(LedgerError::ProjectNotApproved(record.project))?;
        let new_total = participation
            .total_votes
            .checked_add(record.normalized_amount)
            .ok_or(LedgerError::Overflow)?;
        let new_raw = participation
            .raw_for_token(&record.token)
            .checked_add(record.raw_amount)
            .ok_or(LedgerError::Overflow)?;
        let voter_key = record.voter.clone();
        let new_voter_total = self
            .voter_totals
            .get(&voter_key)
            .copied()
            .unwrap_or(NormalizedAmount::ZERO)
            .checked_add(record.normalized_amount)
            .ok_or(LedgerError::Overflow)?;
        let vp_key = (record.voter.clone(), record.project);
        let new_voter_project = self
            .voter_project_totals
            .get(&vp_key)
            .copied()
            .unwrap_or(NormalizedAmount::ZERO)
            .checked_add(record.normalized_amount)
            .ok_or(LedgerError::Overflow)?;
        let raw_key = (record.voter.clone(), record.project, record.token.clone());
        let new_voter_raw = self
            .voter_raw_totals
            .get(&raw_key)
            .copied()
            .unwrap_or(RawAmount::ZERO)
            .checked_add(record.raw_amount)
            .ok_or(LedgerError::Overflow)?;

        let participation = self
            .participations
            .get_mut(&record.project)
            .ok_or(LedgerError::ProjectNotApproved(record.project))?;
        participation.total_votes = new_total;
        participation.raw_by_token.insert(record.token.clone(), new_raw);
        self.voter_totals.insert(voter_key, new_voter_total);
        self.voter_project_totals.insert(vp_key, new_voter_project);
        self.voter_raw_totals.insert(raw_key, new_voter_raw);
        self.records.push(record);
        Ok(new_total)
    }

    /// Append a compensation record, reducing the aggregates it touches.
    ///
    /// Both sides are capped at the voter's own prior contributions to the
    /// project: the normalized amount against their normalized total, the
    /// raw amount against their raw history in that token. No aggregate can
    /// go negative and no voter can pull out another voter's tokens.
    pub fn apply_compensation(
        &mut self,
        record: VoteRecord,
    ) -> Result<NormalizedAmount, LedgerError> {
        debug_assert_eq!(record.kind, RecordKind::Compensation);
        if !self.accepting {
            return Err(LedgerError::TargetNotAcceptingVotes(self.target.to_string()));
        }
        if record.normalized_amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        let vp_key = (record.voter.clone(), record.project);
        let contributed = self
            .voter_project_totals
            .get(&vp_key)
            .copied()
            .unwrap_or(NormalizedAmount::ZERO);
        if contributed < record.normalized_amount {
            return Err(LedgerError::WithdrawExceedsContribution {
                requested: record.normalized_amount.units(),
                available: contributed.units(),
            });
        }
        // Raw side is capped against the voter's own per-token history, not
        // the project-wide aggregate: withdrawing another voter's tokens
        // would corrupt the per-token raw breakdown.
        let raw_key = (record.voter.clone(), record.project, record.token.clone());
        let raw_contributed = self
            .voter_raw_totals
            .get(&raw_key)
            .copied()
            .unwrap_or(RawAmount::ZERO);
        let new_voter_raw = raw_contributed
            .checked_sub(record.raw_amount)
            .ok_or(LedgerError::WithdrawExceedsContribution {
                requested: record.raw_amount.raw(),
                available: raw_contributed.raw(),
            })?;
        let participation = self
            .participations
            .get(&record.project)
            .ok_or(LedgerError::ProjectNotApproved(record.project))?;
        // The voter's raw total never exceeds the participation's, and
        // total_votes >= voter_project_total, so these subtractions cannot
        // underflow once the caps above have passed.
        let new_raw = participation
            .raw_for_token(&record.token)
            .checked_sub(record.raw_amount)
            .ok_or(LedgerError::Overflow)?;
        let new_total = participation
            .total_votes
            .checked_sub(record.normalized_amount)
            .ok_or(LedgerError::Overflow)?;
        let voter_total = self
            .voter_totals
            .get(&record.voter)
            .copied()
            .unwrap_or(NormalizedAmount::ZERO);
        let new_voter_total = voter_total
            .checked_sub(record.normalized_amount)
            .ok_or(LedgerError::Overflow)?;

        let participation = self
            .participations
            .get_mut(&record.project)
            .ok_or(LedgerError::ProjectNotApproved(record.project))?;
        participation.total_votes = new_total;
        participation.raw_by_token.insert(record.token.clone(), new_raw);
        self.voter_totals.insert(record.voter.clone(), new_voter_total);
        self.voter_project_totals
            .insert(vp_key, contributed - record.normalized_amount);
        self.voter_raw_totals.insert(raw_key, new_voter_raw);
        self.records.push(record);
        Ok(new_total)
    }

    /// Record a project's payout. Single write: a participation that has
    /// already been paid can never be paid again.
    pub fn mark_paid(
        &mut self,
        project: &ProjectId,
        amount: NormalizedAmount,
    ) -> Result<(), LedgerError> {
        let participation = self
            .participations
            .get_mut(project)
            .ok_or(LedgerError::ProjectNotApproved(*project))?;
        if participation.has_been_paid() {
            return Err(LedgerError::AlreadyPaid(*project));
        }
        participation.funds_received = Some(amount);
        Ok(())
    }

    /// Normalized total for a project (zero for unknown projects).
    pub fn votes_for_project(&self, project: &ProjectId) -> NormalizedAmount {
        self.participations
            .get(project)
            .map(|p| p.total_votes)
            .unwrap_or(NormalizedAmount::ZERO)
    }

    /// Normalized total contributed by one voter across all projects.
    pub fn votes_for_voter(&self, voter: &VoterId) -> NormalizedAmount {
        self.voter_totals
            .get(voter)
            .copied()
            .unwrap_or(NormalizedAmount::ZERO)
    }

    /// Sum of normalized totals across all projects.
    pub fn total_votes(&self) -> NormalizedAmount {
        self.participations
            .values()
            .fold(NormalizedAmount::ZERO, |acc, p| acc + p.total_votes)
    }

    /// All approved projects ranked by descending normalized total, ties
    /// broken by ascending project identity.
    pub fn leaderboard(&self) -> Vec<(ProjectId, NormalizedAmount)> {
        let mut entries: Vec<(ProjectId, NormalizedAmount)> = self
            .participations
            .values()
            .map(|p| (p.project, p.total_votes))
            .collect();
        // Ascending-identity order comes from the BTreeMap; a stable sort on
        // the descending total preserves it within equal totals.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// Recompute a project's normalized total from the raw records.
    /// Consistency checker: verifies the incremental aggregates match reality.
    pub fn recompute_project_total(&self, project: &ProjectId) -> NormalizedAmount {
        self.records
            .iter()
            .filter(|r| r.project == *project)
            .fold(NormalizedAmount::ZERO, |acc, r| match r.kind {
                RecordKind::Contribution => acc + r.normalized_amount,
                RecordKind::Compensation => acc - r.normalized_amount,
            })
    }
}
