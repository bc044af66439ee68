//! Campaign engine — lifecycle transitions and the one-shot distribution.

use crate::allocation::allocate;
use crate::campaign::{Campaign, CampaignConfig};
use crate::error::DistributionError;
use rally_ledger::VoteLedger;
use rally_types::{
    CampaignId, CampaignState, NormalizedAmount, PlatformParams, ProjectId, Timestamp, VoteTarget,
    BPS_DENOMINATOR,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// One winning project's payout within a distribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPayout {
    pub project: ProjectId,
    /// The normalized vote total the share was computed from.
    pub votes: NormalizedAmount,
    pub amount: NormalizedAmount,
}

/// The audited result of a distribution.
///
/// `platform_fee + admin_fee + Σ payouts + unclaimed == total`, exactly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistributionBreakdown {
    pub campaign: CampaignId,
    pub total: NormalizedAmount,
    pub platform_fee: NormalizedAmount,
    pub admin_fee: NormalizedAmount,
    pub payouts: Vec<ProjectPayout>,
    /// Non-zero only when no project qualified as a winner.
    pub unclaimed: NormalizedAmount,
}

/// Manages campaigns and executes their terminal distribution.
pub struct CampaignEngine {
    params: PlatformParams,
    next_campaign_id: u64,
    campaigns: HashMap<CampaignId, Campaign>,
}

impl CampaignEngine {
    pub fn new(params: PlatformParams) -> Self {
        Self {
            params,
            next_campaign_id: 1,
            campaigns: HashMap::new(),
        }
    }

    pub fn params(&self) -> &PlatformParams {
        &self.params
    }

    pub fn campaign(&self, id: &CampaignId) -> Result<&Campaign, DistributionError> {
        self.campaigns
            .get(id)
            .ok_or(DistributionError::CampaignNotFound(*id))
    }

    fn campaign_mut(&mut self, id: &CampaignId) -> Result<&mut Campaign, DistributionError> {
        self.campaigns
            .get_mut(id)
            .ok_or(DistributionError::CampaignNotFound(*id))
    }

    /// Create a campaign and open its ledger book (not yet accepting votes).
    pub fn create_campaign(
        &mut self,
        ledger: &mut VoteLedger,
        config: CampaignConfig,
        now: Timestamp,
    ) -> Result<CampaignId, DistributionError> {
        if config.start_time >= config.end_time {
            return Err(DistributionError::InvalidWindow);
        }
        let total_bps = self
            .params
            .platform_fee_bps
            .saturating_add(config.admin_fee_bps);
        if total_bps > BPS_DENOMINATOR {
            return Err(DistributionError::FeesExceedPool { total_bps });
        }
        // max_winners of zero would strand the whole remaining pool as
        // unclaimed on every distribution.
        if config.max_winners == 0 {
            return Err(DistributionError::ZeroMaxWinners);
        }
        let id = CampaignId::new(self.next_campaign_id);
        ledger.open_target(VoteTarget::Campaign(id))?;
        self.next_campaign_id += 1;
        self.campaigns.insert(id, Campaign::new(id, config, now));
        info!(%id, "campaign created");
        Ok(id)
    }

    /// Approve a project as a participant. Allowed until the campaign closes.
    pub fn approve_project(
        &mut self,
        ledger: &mut VoteLedger,
        id: &CampaignId,
        project: ProjectId,
    ) -> Result<(), DistributionError> {
        let campaign = self.campaign(id)?;
        match campaign.state {
            CampaignState::Pending | CampaignState::Active => {}
            other => return Err(DistributionError::WrongState(format!("{other:?}"))),
        }
        ledger.approve_project(&VoteTarget::Campaign(*id), project)?;
        Ok(())
    }

    /// Move a pending campaign into its active (accepting votes) state.
    /// The time window is an advisory gate checked here, at call time.
    pub fn activate(
        &mut self,
        ledger: &mut VoteLedger,
        id: &CampaignId,
        now: Timestamp,
    ) -> Result<(), DistributionError> {
        let campaign = self.campaign_mut(id)?;
        if campaign.state != CampaignState::Pending {
            return Err(DistributionError::WrongState(format!("{:?}", campaign.state)));
        }
        if !campaign.window_open(now) {
            return Err(DistributionError::WindowNotOpen);
        }
        campaign.state = CampaignState::Active;
        ledger.set_accepting(&VoteTarget::Campaign(*id), true)?;
        Ok(())
    }

    /// Add a captured contribution to the campaign's collected total.
    /// Called once per committed vote record.
    pub fn note_contribution(
        &mut self,
        id: &CampaignId,
        amount: NormalizedAmount,
    ) -> Result<(), DistributionError> {
        let campaign = self.campaign_mut(id)?;
        if !campaign.state.accepts_votes() {
            return Err(DistributionError::WrongState(format!("{:?}", campaign.state)));
        }
        campaign.total_collected = campaign
            .total_collected
            .checked_add(amount)
            .ok_or(DistributionError::Overflow)?;
        Ok(())
    }

    /// Reverse a withdrawn contribution from the collected total.
    pub fn note_withdrawal(
        &mut self,
        id: &CampaignId,
        amount: NormalizedAmount,
    ) -> Result<(), DistributionError> {
        let campaign = self.campaign_mut(id)?;
        if !campaign.state.accepts_votes() {
            return Err(DistributionError::WrongState(format!("{:?}", campaign.state)));
        }
        campaign.total_collected = campaign
            .total_collected
            .checked_sub(amount)
            .ok_or(DistributionError::Overflow)?;
        Ok(())
    }

    /// Close an active campaign once its window has elapsed. Closing flips
    /// the ledger book out of its accepting state first, so the later
    /// distribution snapshot is exact.
    pub fn close(
        &mut self,
        ledger: &mut VoteLedger,
        id: &CampaignId,
        now: Timestamp,
    ) -> Result<(), DistributionError> {
        let campaign = self.campaign_mut(id)?;
        match campaign.state {
            CampaignState::Pending | CampaignState::Active => {}
            other => return Err(DistributionError::WrongState(format!("{other:?}"))),
        }
        if !campaign.window_elapsed(now) {
            return Err(DistributionError::WindowNotElapsed);
        }
        campaign.state = CampaignState::Closed;
        ledger.close_target(&VoteTarget::Campaign(*id))?;
        info!(%id, "campaign closed");
        Ok(())
    }

    /// Explicit admin cancel: closes the campaign regardless of its window.
    pub fn cancel(
        &mut self,
        ledger: &mut VoteLedger,
        id: &CampaignId,
    ) -> Result<(), DistributionError> {
        let campaign = self.campaign_mut(id)?;
        match campaign.state {
            CampaignState::Pending | CampaignState::Active => {}
            other => return Err(DistributionError::WrongState(format!("{other:?}"))),
        }
        campaign.state = CampaignState::Closed;
        ledger.close_target(&VoteTarget::Campaign(*id))?;
        info!(%id, "campaign cancelled");
        Ok(())
    }

    /// Execute the fee waterfall and payout split. Terminal and single-shot:
    /// a second call fails with `AlreadyDistributed` and changes nothing.
    pub fn distribute(
        &mut self,
        ledger: &mut VoteLedger,
        id: &CampaignId,
        now: Timestamp,
    ) -> Result<DistributionBreakdown, DistributionError> {
        let campaign = self.campaign(id)?;
        match campaign.state {
            CampaignState::Distributed => return Err(DistributionError::AlreadyDistributed),
            CampaignState::Closed => {}
            _ => return Err(DistributionError::NotClosed),
        }

        let total = campaign.total_collected;
        let platform_fee = fee_cut(total.units(), self.params.platform_fee_bps)?;
        let admin_fee = fee_cut(total.units(), campaign.admin_fee_bps)?;
        // Fee bps were validated at creation to sum below 100%, and each cut
        // truncates, so the waterfall can never exceed the pool.
        let remaining = total.units() - platform_fee - admin_fee;

        let target = VoteTarget::Campaign(*id);
        let winners: Vec<(ProjectId, NormalizedAmount)> = ledger
            .leaderboard(&target)?
            .into_iter()
            .filter(|(_, votes)| !votes.is_zero())
            .take(campaign.max_winners as usize)
            .collect();
        let rule = campaign.rule;
        let shares = allocate(NormalizedAmount::new(remaining), &winners, rule)?;

        let mut payouts = Vec::with_capacity(shares.len());
        let mut paid = 0u128;
        for ((project, amount), (_, votes)) in shares.iter().zip(&winners) {
            ledger.mark_paid(&target, project, *amount)?;
            paid += amount.units();
            payouts.push(ProjectPayout {
                project: *project,
                votes: *votes,
                amount: *amount,
            });
        }
        let unclaimed = remaining - paid;

        let campaign = self.campaign_mut(id)?;
        campaign.state = CampaignState::Distributed;
        campaign.distributed_at = Some(now);
        info!(
            %id,
            total = total.units(),
            platform_fee,
            admin_fee,
            winners = payouts.len(),
            unclaimed,
            "campaign distributed"
        );

        Ok(DistributionBreakdown {
            campaign: *id,
            total,
            platform_fee: NormalizedAmount::new(platform_fee),
            admin_fee: NormalizedAmount::new(admin_fee),
            payouts,
            unclaimed: NormalizedAmount::new(unclaimed),
        })
    }
}

/// Truncating basis-point cut of a pool.
fn fee_cut(total: u128, bps: u32) -> Result<u128, DistributionError> {
    total
        .checked_mul(bps as u128)
        .map(|v| v / BPS_DENOMINATOR as u128)
        .ok_or(DistributionError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rally_ledger::{RecordKind, VoteRecord};
    use rally_types::{DistributionRule, RawAmount, TokenId, VoterId};

    fn config(rule: DistributionRule, admin_fee_bps: u32, max_winners: u32) -> CampaignConfig {
        CampaignConfig {
            admin: VoterId::new("admin"),
            start_time: Timestamp::new(100),
            end_time: Timestamp::new(200),
            admin_fee_bps,
            max_winners,
            rule,
            payout_token: TokenId::new("RLY"),
        }
    }

    fn vote(id: CampaignId, voter: &str, project: u64, amount: u128) -> VoteRecord {
        VoteRecord {
            voter: VoterId::new(voter),
            target: VoteTarget::Campaign(id),
            project: ProjectId::new(project),
            token: TokenId::new("RLY"),
            raw_amount: RawAmount::new(amount),
            normalized_amount: NormalizedAmount::new(amount),
            kind: RecordKind::Contribution,
            timestamp: Timestamp::new(150),
        }
    }

    /// Engine + ledger with an active campaign, approved projects 1..=n, and
    /// the given votes already recorded and noted.
    fn setup(
        rule: DistributionRule,
        admin_fee_bps: u32,
        max_winners: u32,
        projects: u64,
        votes: &[(&str, u64, u128)],
    ) -> (CampaignEngine, VoteLedger, CampaignId) {
        let mut engine = CampaignEngine::new(PlatformParams::default());
        let mut ledger = VoteLedger::new();
        let id = engine
            .create_campaign(
                &mut ledger,
                config(rule, admin_fee_bps, max_winners),
                Timestamp::new(50),
            )
            .unwrap();
        for p in 1..=projects {
            engine
                .approve_project(&mut ledger, &id, ProjectId::new(p))
                .unwrap();
        }
        engine.activate(&mut ledger, &id, Timestamp::new(100)).unwrap();
        for (voter, project, amount) in votes {
            ledger.record_vote(vote(id, voter, *project, *amount)).unwrap();
            engine
                .note_contribution(&id, NormalizedAmount::new(*amount))
                .unwrap();
        }
        (engine, ledger, id)
    }

    #[test]
    fn quadratic_waterfall_matches_worked_example() {
        // Total collected 280, platform 15%, admin 5%: fees 42 and 14,
        // remaining 224 split over vote totals 450 and 390.
        let (mut engine, mut ledger, id) = setup(
            DistributionRule::Quadratic,
            500,
            5,
            2,
            &[("a", 1, 450), ("b", 2, 390)],
        );
        // The example fixes the pool at 280 independent of vote totals, so
        // rebuild the collected total to match.
        engine.campaigns.get_mut(&id).unwrap().total_collected = NormalizedAmount::new(280);
        engine.close(&mut ledger, &id, Timestamp::new(200)).unwrap();
        let breakdown = engine
            .distribute(&mut ledger, &id, Timestamp::new(201))
            .unwrap();

        assert_eq!(breakdown.platform_fee, NormalizedAmount::new(42));
        assert_eq!(breakdown.admin_fee, NormalizedAmount::new(14));
        // isqrt weights 21 and 19: shares 117 and 106, dust 1 to the leader.
        assert_eq!(breakdown.payouts[0].amount, NormalizedAmount::new(118));
        assert_eq!(breakdown.payouts[1].amount, NormalizedAmount::new(106));
        let paid: u128 = breakdown.payouts.iter().map(|p| p.amount.units()).sum();
        assert_eq!(42 + 14 + paid + breakdown.unclaimed.units(), 280);
    }

    #[test]
    fn linear_distribution_conserves_value() {
        let (mut engine, mut ledger, id) = setup(
            DistributionRule::Linear,
            250,
            10,
            3,
            &[("a", 1, 300), ("b", 2, 200), ("c", 3, 100)],
        );
        engine.close(&mut ledger, &id, Timestamp::new(200)).unwrap();
        let breakdown = engine
            .distribute(&mut ledger, &id, Timestamp::new(201))
            .unwrap();
        let paid: u128 = breakdown.payouts.iter().map(|p| p.amount.units()).sum();
        assert_eq!(
            breakdown.platform_fee.units()
                + breakdown.admin_fee.units()
                + paid
                + breakdown.unclaimed.units(),
            600
        );
        // Ranked by vote totals.
        assert_eq!(breakdown.payouts[0].project, ProjectId::new(1));
        assert_eq!(breakdown.payouts[2].project, ProjectId::new(3));
    }

    #[test]
    fn second_distribute_rejected_without_changes() {
        let (mut engine, mut ledger, id) = setup(
            DistributionRule::Linear,
            0,
            5,
            2,
            &[("a", 1, 100), ("b", 2, 50)],
        );
        engine.close(&mut ledger, &id, Timestamp::new(200)).unwrap();
        let first = engine
            .distribute(&mut ledger, &id, Timestamp::new(201))
            .unwrap();
        let result = engine.distribute(&mut ledger, &id, Timestamp::new(202));
        assert!(matches!(result, Err(DistributionError::AlreadyDistributed)));
        // Payouts stand exactly as the first call set them.
        let target = VoteTarget::Campaign(id);
        for payout in &first.payouts {
            let book = ledger.book(&target).unwrap();
            assert_eq!(
                book.participation(&payout.project).unwrap().funds_received,
                Some(payout.amount)
            );
        }
    }

    #[test]
    fn distribute_before_close_rejected() {
        let (mut engine, mut ledger, id) =
            setup(DistributionRule::Linear, 0, 5, 1, &[("a", 1, 100)]);
        let result = engine.distribute(&mut ledger, &id, Timestamp::new(150));
        assert!(matches!(result, Err(DistributionError::NotClosed)));
    }

    #[test]
    fn zero_winners_leaves_pool_unclaimed_but_distributes() {
        let (mut engine, mut ledger, id) = setup(DistributionRule::Linear, 500, 5, 3, &[]);
        engine.campaigns.get_mut(&id).unwrap().total_collected = NormalizedAmount::new(1000);
        engine.close(&mut ledger, &id, Timestamp::new(200)).unwrap();
        let breakdown = engine
            .distribute(&mut ledger, &id, Timestamp::new(201))
            .unwrap();
        assert!(breakdown.payouts.is_empty());
        assert_eq!(breakdown.platform_fee, NormalizedAmount::new(150));
        assert_eq!(breakdown.admin_fee, NormalizedAmount::new(50));
        assert_eq!(breakdown.unclaimed, NormalizedAmount::new(800));
        assert_eq!(
            engine.campaign(&id).unwrap().state,
            CampaignState::Distributed
        );
    }

    #[test]
    fn zero_vote_project_never_wins() {
        let (mut engine, mut ledger, id) =
            setup(DistributionRule::Linear, 0, 5, 3, &[("a", 2, 100)]);
        engine.close(&mut ledger, &id, Timestamp::new(200)).unwrap();
        let breakdown = engine
            .distribute(&mut ledger, &id, Timestamp::new(201))
            .unwrap();
        assert_eq!(breakdown.payouts.len(), 1);
        assert_eq!(breakdown.payouts[0].project, ProjectId::new(2));
    }

    #[test]
    fn max_winners_truncates_ranking() {
        let (mut engine, mut ledger, id) = setup(
            DistributionRule::Linear,
            0,
            2,
            4,
            &[("a", 1, 400), ("b", 2, 300), ("c", 3, 200), ("d", 4, 100)],
        );
        engine.close(&mut ledger, &id, Timestamp::new(200)).unwrap();
        let breakdown = engine
            .distribute(&mut ledger, &id, Timestamp::new(201))
            .unwrap();
        assert_eq!(breakdown.payouts.len(), 2);
        assert_eq!(breakdown.payouts[0].project, ProjectId::new(1));
        assert_eq!(breakdown.payouts[1].project, ProjectId::new(2));
        // Losers keep funds_received unset; winners' shares split 4:3.
        let target = VoteTarget::Campaign(id);
        let book = ledger.book(&target).unwrap();
        assert!(book.participation(&ProjectId::new(3)).unwrap().funds_received.is_none());
    }

    #[test]
    fn cancel_closes_without_window() {
        let (mut engine, mut ledger, id) =
            setup(DistributionRule::Linear, 0, 5, 1, &[("a", 1, 100)]);
        engine.cancel(&mut ledger, &id).unwrap();
        assert_eq!(engine.campaign(&id).unwrap().state, CampaignState::Closed);
        // Voting after cancel is rejected, not ignored.
        let result = ledger.record_vote(vote(id, "b", 1, 10));
        assert!(result.is_err());
    }

    #[test]
    fn excessive_fees_rejected_at_creation() {
        let mut engine = CampaignEngine::new(PlatformParams::default());
        let mut ledger = VoteLedger::new();
        let result = engine.create_campaign(
            &mut ledger,
            config(DistributionRule::Linear, 9_000, 5),
            Timestamp::new(0),
        );
        assert!(matches!(
            result,
            Err(DistributionError::FeesExceedPool { .. })
        ));
    }

    #[test]
    fn zero_max_winners_rejected_at_creation() {
        let mut engine = CampaignEngine::new(PlatformParams::default());
        let mut ledger = VoteLedger::new();
        let result = engine.create_campaign(
            &mut ledger,
            config(DistributionRule::Linear, 500, 0),
            Timestamp::new(0),
        );
        assert!(matches!(result, Err(DistributionError::ZeroMaxWinners)));
    }

    #[test]
    fn close_before_window_elapsed_rejected() {
        let (mut engine, mut ledger, id) =
            setup(DistributionRule::Linear, 0, 5, 1, &[("a", 1, 100)]);
        let result = engine.close(&mut ledger, &id, Timestamp::new(150));
        assert!(matches!(result, Err(DistributionError::WindowNotElapsed)));
    }
}
