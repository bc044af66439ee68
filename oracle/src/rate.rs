//! Exchange-rate source — the injected capability the normalizer reads from.
//!
//! The lookup mechanism itself (price feed, AMM, broker) is out of scope;
//! the engine only sees this trait.

use rally_types::TokenId;
use std::collections::HashMap;

/// A source of exchange rates from a token to the canonical unit.
///
/// Rates are fixed-point u128 scaled by `PlatformParams::rate_scale`: a
/// return value equal to the scale means 1:1. `None` means no rate could be
/// obtained; the normalizer rejects the whole action rather than defaulting.
pub trait RateSource {
    fn rate(&self, token: &TokenId, canonical: &TokenId) -> Option<u128>;
}

/// A static rate table, used in tests and for deployments with externally
/// pushed rates.
#[derive(Clone, Debug, Default)]
pub struct FixedRateSource {
    rates: HashMap<TokenId, u128>,
}

impl FixedRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rate from `token` to the canonical unit.
    pub fn set_rate(&mut self, token: TokenId, rate: u128) {
        self.rates.insert(token, rate);
    }

    pub fn clear_rate(&mut self, token: &TokenId) {
        self.rates.remove(token);
    }
}

impl RateSource for FixedRateSource {
    fn rate(&self, token: &TokenId, _canonical: &TokenId) -> Option<u128> {
        self.rates.get(token).copied()
    }
}
