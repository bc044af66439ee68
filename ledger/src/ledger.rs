//! The vote ledger — owns every target book.

use crate::book::TargetBook;
use crate::error::LedgerError;
use crate::record::VoteRecord;
use rally_types::{NormalizedAmount, ProjectId, VoteTarget, VoterId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Append-only, idempotent vote store with per-target books.
///
/// Every operation is a single atomic state transition: it either fully
/// commits its effects or fails before any mutation.
#[derive(Clone, Debug, Default)]
pub struct VoteLedger {
    books: HashMap<VoteTarget, TargetBook>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book for a target. The book starts closed; the owning engine
    /// opens it when the target enters its accepting-votes state.
    pub fn open_target(&mut self, target: VoteTarget) -> Result<(), LedgerError> {
        if self.books.contains_key(&target) {
            return Err(LedgerError::TargetAlreadyExists(target.to_string()));
        }
        self.books.insert(target, TargetBook::new(target));
        Ok(())
    }

    /// Flip a target's accepting-votes gate.
    pub fn set_accepting(&mut self, target: &VoteTarget, accepting: bool) -> Result<(), LedgerError> {
        self.book_mut(target)?.set_accepting(accepting);
        Ok(())
    }

    /// Close a target for good before its aggregates are read for
    /// distribution. Votes arriving afterwards are rejected, not ignored.
    pub fn close_target(&mut self, target: &VoteTarget) -> Result<(), LedgerError> {
        self.set_accepting(target, false)
    }

    pub fn approve_project(
        &mut self,
        target: &VoteTarget,
        project: ProjectId,
    ) -> Result<(), LedgerError> {
        self.book_mut(target)?.approve_project(project)
    }

    pub fn is_approved(&self, target: &VoteTarget, project: &ProjectId) -> bool {
        self.books
            .get(target)
            .map(|b| b.is_approved(project))
            .unwrap_or(false)
    }

    pub fn book(&self, target: &VoteTarget) -> Result<&TargetBook, LedgerError> {
        self.books
            .get(target)
            .ok_or_else(|| LedgerError::TargetNotFound(target.to_string()))
    }

    fn book_mut(&mut self, target: &VoteTarget) -> Result<&mut TargetBook, LedgerError> {
        self.books
            .get_mut(target)
            .ok_or_else(|| LedgerError::TargetNotFound(target.to_string()))
    }

    /// Record a single contribution. Returns the project's resulting
    /// normalized total.
    pub fn record_vote(&mut self, record: VoteRecord) -> Result<NormalizedAmount, LedgerError> {
        let target = record.target;
        let project = record.project;
        let total = self.book_mut(&target)?.apply_contribution(record)?;
        debug!(%target, %project, total = total.units(), "vote recorded");
        Ok(total)
    }

    /// Record a batch of contributions against one target, all-or-nothing.
    ///
    /// Every entry is validated (including cumulative overflow across the
    /// batch) before the first one is applied, so a failing entry leaves no
    /// partial fund capture behind.
    pub fn record_votes(
        &mut self,
        target: &VoteTarget,
        records: Vec<VoteRecord>,
    ) -> Result<Vec<NormalizedAmount>, LedgerError> {
        if records.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }
        let book = self.book(target)?;
        let mut pending: HashMap<ProjectId, NormalizedAmount> = HashMap::new();
        for record in &records {
            let already = pending
                .get(&record.project)
                .copied()
                .unwrap_or(NormalizedAmount::ZERO);
            book.validate_contribution(&record.project, record.normalized_amount, already)?;
            let next = already
                .checked_add(record.normalized_amount)
                .ok_or(LedgerError::Overflow)?;
            pending.insert(record.project, next);
        }
        let book = self.book_mut(target)?;
        let mut totals = Vec::with_capacity(records.len());
        for record in records {
            totals.push(book.apply_contribution(record)?);
        }
        debug!(%target, entries = totals.len(), "vote batch recorded");
        Ok(totals)
    }

    /// Withdraw part of a prior contribution by appending a compensating
    /// record. Only permitted while the target is still accepting votes.
    pub fn withdraw_vote(&mut self, record: VoteRecord) -> Result<NormalizedAmount, LedgerError> {
        let target = record.target;
        let project = record.project;
        let total = self.book_mut(&target)?.apply_compensation(record)?;
        debug!(%target, %project, total = total.units(), "vote withdrawn");
        Ok(total)
    }

    /// Record a project's payout on its participation, exactly once.
    pub fn mark_paid(
        &mut self,
        target: &VoteTarget,
        project: &ProjectId,
        amount: NormalizedAmount,
    ) -> Result<(), LedgerError> {
        self.book_mut(target)?.mark_paid(project, amount)
    }

    pub fn votes_for_project(
        &self,
        target: &VoteTarget,
        project: &ProjectId,
    ) -> Result<NormalizedAmount, LedgerError> {
        Ok(self.book(target)?.votes_for_project(project))
    }

    pub fn votes_for_voter(
        &self,
        target: &VoteTarget,
        voter: &VoterId,
    ) -> Result<NormalizedAmount, LedgerError> {
        Ok(self.book(target)?.votes_for_voter(voter))
    }

    /// Deterministic leaderboard for a target.
    pub fn leaderboard(
        &self,
        target: &VoteTarget,
    ) -> Result<Vec<(ProjectId, NormalizedAmount)>, LedgerError> {
        Ok(self.book(target)?.leaderboard())
    }
}

/// Serializable snapshot of the full ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub books: Vec<TargetBook>,
}

impl VoteLedger {
    /// Serialize all books to bytes for persistence. Books are ordered by
    /// target so identical ledgers produce identical bytes.
    pub fn save_state(&self) -> Vec<u8> {
        let mut books: Vec<TargetBook> = self.books.values().cloned().collect();
        books.sort_by_key(|b| b.target);
        let snapshot = LedgerSnapshot { books };
        bincode::serialize(&snapshot).unwrap_or_default()
    }

    /// Restore a ledger from serialized bytes.
    pub fn load_state(data: &[u8]) -> Self {
        match bincode::deserialize::<LedgerSnapshot>(data) {
            Ok(snapshot) => {
                let mut books = HashMap::new();
                for book in snapshot.books {
                    books.insert(book.target, book);
                }
                Self { books }
            }
            Err(_) => Self::default(),
        }
    }
}
