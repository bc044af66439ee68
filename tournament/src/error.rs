use rally_distribution::DistributionError;
use rally_ledger::LedgerError;
use rally_types::TournamentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),

    #[error("tournament is already active")]
    AlreadyActive,

    #[error("tournament is not in the correct state for this action: {0}")]
    WrongState(String),

    #[error("stage {index} of {tournament} not found")]
    StageNotFound {
        tournament: TournamentId,
        index: u32,
    },

    #[error("stage has already been finalized")]
    StageAlreadyFinalized,

    #[error("stage is not accepting votes")]
    StageNotAcceptingVotes,

    #[error("stage has already been started")]
    StageAlreadyStarted,

    #[error("stage voting window has not elapsed yet")]
    StageWindowNotElapsed,

    #[error("a tournament roster must contain at least one project")]
    EmptyRoster,

    #[error("stage count {requested} exceeds the configured maximum of {max}")]
    TooManyStages { requested: u32, max: u32 },

    #[error("elimination percentage must be between 0 and 100, got {0}")]
    InvalidEliminationPercentage(u8),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("distribution error: {0}")]
    Distribution(#[from] DistributionError),

    #[error("arithmetic overflow")]
    Overflow,
}
