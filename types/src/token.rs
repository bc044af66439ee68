//! Token references — identifier, decimal precision, canonical flag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A token identifier (symbol or contract handle).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered token: identifier, decimal precision, and whether it is the
/// canonical base unit.
///
/// Exactly one canonical token exists per deployment; every other token must
/// resolve to it through the value normalizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub id: TokenId,
    /// Number of decimal places in the token's native representation.
    pub decimals: u8,
    /// Whether this token is the canonical unit all values normalize to.
    pub canonical: bool,
}

impl TokenInfo {
    pub fn new(id: TokenId, decimals: u8, canonical: bool) -> Self {
        Self {
            id,
            decimals,
            canonical,
        }
    }
}
