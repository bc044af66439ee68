//! Campaigns and their lifecycle.

use rally_types::{
    CampaignId, CampaignState, DistributionRule, NormalizedAmount, Timestamp, TokenId, VoterId,
};
use serde::{Deserialize, Serialize};

/// Creation-time configuration for a campaign.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub admin: VoterId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Admin fee in basis points, taken after the platform fee.
    pub admin_fee_bps: u32,
    /// At most this many projects share the distributed pool.
    pub max_winners: u32,
    /// Fixed at creation; resolved once at distribution time.
    pub rule: DistributionRule,
    /// The token winners are paid in (informational for the payout layer;
    /// all engine arithmetic stays in canonical units).
    pub payout_token: TokenId,
}

/// A time-boxed funding competition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub admin: VoterId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub admin_fee_bps: u32,
    pub max_winners: u32,
    pub rule: DistributionRule,
    pub payout_token: TokenId,
    pub state: CampaignState,
    /// Sum of all normalized contributions captured for this campaign.
    pub total_collected: NormalizedAmount,
    pub created_at: Timestamp,
    pub distributed_at: Option<Timestamp>,
}

impl Campaign {
    pub fn new(id: CampaignId, config: CampaignConfig, now: Timestamp) -> Self {
        Self {
            id,
            admin: config.admin,
            start_time: config.start_time,
            end_time: config.end_time,
            admin_fee_bps: config.admin_fee_bps,
            max_winners: config.max_winners,
            rule: config.rule,
            payout_token: config.payout_token,
            state: CampaignState::Pending,
            total_collected: NormalizedAmount::ZERO,
            created_at: now,
            distributed_at: None,
        }
    }

    /// Whether `now` falls inside the configured voting window.
    pub fn window_open(&self, now: Timestamp) -> bool {
        now >= self.start_time && now < self.end_time
    }

    /// Whether the voting window has elapsed.
    pub fn window_elapsed(&self, now: Timestamp) -> bool {
        now >= self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CampaignConfig {
        CampaignConfig {
            admin: VoterId::new("admin"),
            start_time: Timestamp::new(100),
            end_time: Timestamp::new(200),
            admin_fee_bps: 500,
            max_winners: 3,
            rule: DistributionRule::Linear,
            payout_token: TokenId::new("RLY"),
        }
    }

    #[test]
    fn new_campaign_starts_pending() {
        let c = Campaign::new(CampaignId::new(1), config(), Timestamp::new(50));
        assert_eq!(c.state, CampaignState::Pending);
        assert!(c.total_collected.is_zero());
        assert!(c.distributed_at.is_none());
    }

    #[test]
    fn window_checks() {
        let c = Campaign::new(CampaignId::new(1), config(), Timestamp::new(50));
        assert!(!c.window_open(Timestamp::new(99)));
        assert!(c.window_open(Timestamp::new(100)));
        assert!(c.window_open(Timestamp::new(199)));
        assert!(!c.window_open(Timestamp::new(200)));
        assert!(c.window_elapsed(Timestamp::new(200)));
    }
}
