//! Platform parameters — protocol-wide constants injected into the engines.

use serde::{Deserialize, Serialize};

/// Basis-point denominator: 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Protocol-wide configuration shared by every engine.
///
/// Per-campaign values (admin fee, max winners, distribution rule) live on
/// the campaign itself; these are the deployment-level knobs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlatformParams {
    /// Platform fee taken off the top of every distributed campaign pool,
    /// in basis points. Default: 1500 (15%).
    pub platform_fee_bps: u32,

    /// Maximum number of entries accepted in one batch vote call.
    pub max_batch_votes: usize,

    /// Maximum number of stages a tournament may be configured with.
    pub max_stages: u32,

    /// Fixed-point scale for exchange rates: a rate of `RATE_SCALE` means
    /// 1:1. Default: 10^12.
    pub rate_scale: u128,
}

impl Default for PlatformParams {
    fn default() -> Self {
        Self {
            platform_fee_bps: 1_500,
            max_batch_votes: 64,
            max_stages: 16,
            rate_scale: 1_000_000_000_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_platform_fee_is_fifteen_percent() {
        let params = PlatformParams::default();
        assert_eq!(params.platform_fee_bps, 1_500);
        assert!(params.platform_fee_bps < BPS_DENOMINATOR);
    }
}
