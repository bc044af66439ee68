use rally_ledger::LedgerError;
use rally_types::CampaignId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("campaign {0} not found")]
    CampaignNotFound(CampaignId),

    #[error("campaign has already been distributed")]
    AlreadyDistributed,

    #[error("campaign is not closed; distribution requires a closed campaign")]
    NotClosed,

    #[error("campaign is not in the correct state for this action: {0}")]
    WrongState(String),

    #[error("campaign voting window has not ended yet")]
    WindowNotElapsed,

    #[error("campaign voting window is not open")]
    WindowNotOpen,

    #[error("campaign start time must precede its end time")]
    InvalidWindow,

    #[error("fee percentages exceed the whole pool: {total_bps} bps")]
    FeesExceedPool { total_bps: u32 },

    #[error("campaign must allow at least one winner")]
    ZeroMaxWinners,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("arithmetic overflow during allocation")]
    Overflow,
}
