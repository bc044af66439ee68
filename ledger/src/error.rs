use rally_types::ProjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no ledger book exists for target {0}")]
    TargetNotFound(String),

    #[error("a ledger book already exists for target {0}")]
    TargetAlreadyExists(String),

    #[error("target {0} is not accepting votes")]
    TargetNotAcceptingVotes(String),

    #[error("vote amount must be greater than zero")]
    ZeroAmount,

    #[error("{0} is not an approved participant of this target")]
    ProjectNotApproved(ProjectId),

    #[error("{0} is already an approved participant of this target")]
    ProjectAlreadyApproved(ProjectId),

    #[error("empty vote batch")]
    EmptyBatch,

    #[error("withdrawal of {requested} exceeds the voter's contribution of {available}")]
    WithdrawExceedsContribution { requested: u128, available: u128 },

    #[error("{0} has already received its payout")]
    AlreadyPaid(ProjectId),

    #[error("arithmetic overflow while updating aggregates")]
    Overflow,
}
