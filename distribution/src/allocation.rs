//! Payout allocation — linear and quadratic splits with exact conservation.

use crate::error::DistributionError;
use rally_types::{DistributionRule, NormalizedAmount, ProjectId};

/// Floor integer square root (Newton's method on u128).
///
/// Quadratic funding weights are computed on normalized-vote integers with
/// floor rounding so precision loss biases consistently downward across
/// implementations, never randomly.
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    // Seed with 2^ceil(bits/2) >= sqrt(n); Newton from above converges
    // monotonically down to the floor root without intermediate overflow.
    let bits = 128 - n.leading_zeros();
    let mut x = 1u128 << ((bits + 1) / 2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Split `pool` among `winners` according to `rule`.
///
/// `winners` must already be in leaderboard order (descending votes, ties by
/// ascending identity) with zero-vote entries removed. Each share truncates;
/// the dust remainder is assigned to the first-ranked winner so the returned
/// payouts always sum to `pool` exactly. An empty winner list returns an
/// empty payout list (the pool stays unclaimed).
pub fn allocate(
    pool: NormalizedAmount,
    winners: &[(ProjectId, NormalizedAmount)],
    rule: DistributionRule,
) -> Result<Vec<(ProjectId, NormalizedAmount)>, DistributionError> {
    if winners.is_empty() || pool.is_zero() {
        return Ok(winners
            .iter()
            .map(|(p, _)| (*p, NormalizedAmount::ZERO))
            .collect());
    }

    let weights: Vec<u128> = winners
        .iter()
        .map(|(_, votes)| match rule {
            DistributionRule::Linear => votes.units(),
            DistributionRule::Quadratic => isqrt(votes.units()),
        })
        .collect();
    let total_weight: u128 = weights
        .iter()
        .try_fold(0u128, |acc, w| acc.checked_add(*w))
        .ok_or(DistributionError::Overflow)?;
    // Winners all have non-zero votes, so every weight (and the sum) is >= 1.
    debug_assert!(total_weight > 0);

    let mut payouts = Vec::with_capacity(winners.len());
    let mut assigned = 0u128;
    for ((project, _), weight) in winners.iter().zip(&weights) {
        let share = pool
            .units()
            .checked_mul(*weight)
            .ok_or(DistributionError::Overflow)?
            / total_weight;
        assigned += share;
        payouts.push((*project, share));
    }
    // Dust from truncating division goes to the highest-ranked winner.
    let dust = pool.units() - assigned;
    payouts[0].1 += dust;

    Ok(payouts
        .into_iter()
        .map(|(p, units)| (p, NormalizedAmount::new(units)))
        .collect())
}
