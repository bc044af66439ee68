use rally_types::TokenId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("unsupported token: {0}")]
    UnsupportedToken(TokenId),

    #[error("no exchange rate available for {0}")]
    RateUnavailable(TokenId),

    #[error("token {0} is already registered")]
    AlreadyRegistered(TokenId),

    #[error("a canonical token is already registered ({0})")]
    CanonicalAlreadyRegistered(TokenId),

    #[error("no canonical token has been registered")]
    NoCanonicalToken,

    #[error("arithmetic overflow during normalization")]
    Overflow,
}
