//! Token registry — the table of supported tokens and the canonical unit.

use crate::error::OracleError;
use rally_types::{TokenId, TokenInfo};
use std::collections::HashMap;

/// Registered tokens, exactly one of which is canonical.
///
/// The registry is populated at deployment configuration time; the engines
/// only ever read from it.
#[derive(Clone, Debug, Default)]
pub struct TokenRegistry {
    tokens: HashMap<TokenId, TokenInfo>,
    canonical: Option<TokenId>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token. At most one token may carry the canonical flag.
    pub fn register(&mut self, info: TokenInfo) -> Result<(), OracleError> {
        if self.tokens.contains_key(&info.id) {
            return Err(OracleError::AlreadyRegistered(info.id));
        }
        if info.canonical {
            if let Some(existing) = &self.canonical {
                return Err(OracleError::CanonicalAlreadyRegistered(existing.clone()));
            }
            self.canonical = Some(info.id.clone());
        }
        self.tokens.insert(info.id.clone(), info);
        Ok(())
    }

    /// Look up a registered token.
    pub fn get(&self, id: &TokenId) -> Option<&TokenInfo> {
        self.tokens.get(id)
    }

    pub fn is_registered(&self, id: &TokenId) -> bool {
        self.tokens.contains_key(id)
    }

    /// The canonical token, if one has been registered.
    pub fn canonical(&self) -> Result<&TokenInfo, OracleError> {
        let id = self.canonical.as_ref().ok_or(OracleError::NoCanonicalToken)?;
        self.tokens.get(id).ok_or(OracleError::NoCanonicalToken)
    }
}
