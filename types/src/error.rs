//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for the Rally engine, used at the platform façade where
/// per-crate errors converge.
#[derive(Debug, Error)]
pub enum RallyError {
    #[error("unsupported token: {0}")]
    UnsupportedToken(String),

    #[error("no exchange rate available for {0}")]
    RateUnavailable(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("campaign has already been distributed")]
    AlreadyDistributed,

    #[error("stage has already been finalized")]
    StageAlreadyFinalized,

    #[error("stage is not accepting votes")]
    StageNotAcceptingVotes,

    #[error("tournament is already active")]
    AlreadyActive,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("{0}")]
    Other(String),
}
