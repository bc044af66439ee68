//! Per-crate error mapping onto the shared `RallyError` taxonomy.

use rally_distribution::DistributionError;
use rally_ledger::LedgerError;
use rally_oracle::OracleError;
use rally_tournament::TournamentError;
use rally_types::RallyError;

pub(crate) fn from_oracle(err: OracleError) -> RallyError {
    match err {
        OracleError::UnsupportedToken(id) => RallyError::UnsupportedToken(id.to_string()),
        OracleError::RateUnavailable(id) => RallyError::RateUnavailable(id.to_string()),
        OracleError::Overflow => RallyError::Overflow,
        other => RallyError::Other(other.to_string()),
    }
}

pub(crate) fn from_ledger(err: LedgerError) -> RallyError {
    match err {
        LedgerError::Overflow => RallyError::Overflow,
        other => RallyError::Validation(other.to_string()),
    }
}

pub(crate) fn from_distribution(err: DistributionError) -> RallyError {
    match err {
        DistributionError::AlreadyDistributed => RallyError::AlreadyDistributed,
        DistributionError::Overflow => RallyError::Overflow,
        DistributionError::Ledger(e) => from_ledger(e),
        other => RallyError::Validation(other.to_string()),
    }
}

pub(crate) fn from_tournament(err: TournamentError) -> RallyError {
    match err {
        TournamentError::AlreadyActive => RallyError::AlreadyActive,
        TournamentError::StageAlreadyFinalized => RallyError::StageAlreadyFinalized,
        TournamentError::StageNotAcceptingVotes => RallyError::StageNotAcceptingVotes,
        TournamentError::Overflow => RallyError::Overflow,
        TournamentError::Ledger(e) => from_ledger(e),
        TournamentError::Distribution(e) => from_distribution(e),
        other => RallyError::Validation(other.to_string()),
    }
}
