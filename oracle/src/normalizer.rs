//! Canonical-unit conversion.

use crate::error::OracleError;
use crate::rate::RateSource;
use crate::registry::TokenRegistry;
use rally_types::{NormalizedAmount, RawAmount, TokenId};

/// Converts raw token amounts into canonical base units.
///
/// Pure with respect to engine state: the only inputs are the registry, the
/// injected rate source, and the amount. Division truncates so a conversion
/// can lose at most one base unit, never gain one.
#[derive(Clone, Debug)]
pub struct Normalizer {
    registry: TokenRegistry,
    rate_scale: u128,
}

impl Normalizer {
    pub fn new(registry: TokenRegistry, rate_scale: u128) -> Self {
        Self {
            registry,
            rate_scale,
        }
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Convert `raw` units of `token` into canonical base units.
    ///
    /// The canonical token converts by identity with no precision loss. Any
    /// other token needs a rate from the source; a missing or zero rate is
    /// `RateUnavailable` (a zero rate would silently destroy the entire
    /// contribution, so it is never accepted as a real quote).
    pub fn normalize(
        &self,
        source: &dyn RateSource,
        token: &TokenId,
        raw: RawAmount,
    ) -> Result<NormalizedAmount, OracleError> {
        let info = self
            .registry
            .get(token)
            .ok_or_else(|| OracleError::UnsupportedToken(token.clone()))?;
        if info.canonical {
            return Ok(NormalizedAmount::new(raw.raw()));
        }
        let canonical = self.registry.canonical()?;
        let rate = source
            .rate(token, &canonical.id)
            .filter(|r| *r > 0)
            .ok_or_else(|| OracleError::RateUnavailable(token.clone()))?;

        // Align the token's precision with the canonical precision, then
        // apply the fixed-point rate with a single truncating division.
        let value = if canonical.decimals >= info.decimals {
            let shift = pow10(canonical.decimals - info.decimals)?;
            raw.raw()
                .checked_mul(shift)
                .and_then(|v| v.checked_mul(rate))
                .ok_or(OracleError::Overflow)?
                / self.rate_scale
        } else {
            let shift = pow10(info.decimals - canonical.decimals)?;
            let denom = self
                .rate_scale
                .checked_mul(shift)
                .ok_or(OracleError::Overflow)?;
            raw.raw().checked_mul(rate).ok_or(OracleError::Overflow)? / denom
        };
        Ok(NormalizedAmount::new(value))
    }
}

fn pow10(exp: u8) -> Result<u128, OracleError> {
    10u128.checked_pow(exp as u32).ok_or(OracleError::Overflow)
}
