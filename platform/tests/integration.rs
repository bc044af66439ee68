//! End-to-end flows through the platform façade: multi-token contribution,
//! campaign distribution, and a full tournament run.

use rally_distribution::CampaignConfig;
use rally_oracle::{FixedRateSource, Normalizer, TokenRegistry};
use rally_platform::Platform;
use rally_types::{
    ActionKind, CampaignId, DistributionRule, NormalizedAmount, PlatformParams, ProjectId,
    RallyError, RawAmount, Timestamp, TokenId, TokenInfo, VoteTarget, VoterId,
};

const SCALE: u128 = 1_000_000_000_000;

fn platform() -> Platform<FixedRateSource> {
    let mut registry = TokenRegistry::new();
    registry
        .register(TokenInfo::new(TokenId::new("RLY"), 12, true))
        .unwrap();
    registry
        .register(TokenInfo::new(TokenId::new("USDX"), 6, false))
        .unwrap();
    let mut rates = FixedRateSource::new();
    // 1 whole USDX = 2 canonical base units per raw base unit after the
    // decimal shift.
    rates.set_rate(TokenId::new("USDX"), 2 * SCALE);
    Platform::new(
        PlatformParams::default(),
        Normalizer::new(registry, SCALE),
        rates,
    )
}

fn campaign_config(rule: DistributionRule) -> CampaignConfig {
    CampaignConfig {
        admin: VoterId::new("admin"),
        start_time: Timestamp::new(100),
        end_time: Timestamp::new(200),
        admin_fee_bps: 500,
        max_winners: 5,
        rule,
        payout_token: TokenId::new("RLY"),
    }
}

fn active_campaign(
    p: &mut Platform<FixedRateSource>,
    rule: DistributionRule,
    projects: u64,
) -> CampaignId {
    let id = p.create_campaign(campaign_config(rule), Timestamp::new(50)).unwrap();
    for n in 1..=projects {
        p.approve_project(&id, ProjectId::new(n)).unwrap();
    }
    p.activate_campaign(&id, Timestamp::new(100)).unwrap();
    id
}

fn rly_vote(
    p: &mut Platform<FixedRateSource>,
    id: CampaignId,
    voter: &str,
    project: u64,
    amount: u128,
) -> NormalizedAmount {
    p.record_vote(
        VoterId::new(voter),
        id,
        ProjectId::new(project),
        TokenId::new("RLY"),
        RawAmount::new(amount),
        Timestamp::new(150),
    )
    .unwrap()
}

#[test]
fn quadratic_campaign_distributes_exactly() {
    let mut p = platform();
    let id = active_campaign(&mut p, DistributionRule::Quadratic, 2);
    rly_vote(&mut p, id, "alice", 1, 450);
    rly_vote(&mut p, id, "bob", 2, 390);

    p.close_campaign(&id, Timestamp::new(200)).unwrap();
    let breakdown = p.distribute(&id, Timestamp::new(201)).unwrap();

    // Collected 840: platform 15% = 126, admin 5% = 42, remaining 672.
    assert_eq!(breakdown.total, NormalizedAmount::new(840));
    assert_eq!(breakdown.platform_fee, NormalizedAmount::new(126));
    assert_eq!(breakdown.admin_fee, NormalizedAmount::new(42));
    // isqrt weights 21 and 19; shares 352 and 319, dust 1 to the leader.
    assert_eq!(breakdown.payouts[0].project, ProjectId::new(1));
    assert_eq!(breakdown.payouts[0].amount, NormalizedAmount::new(353));
    assert_eq!(breakdown.payouts[1].amount, NormalizedAmount::new(319));
    let paid: u128 = breakdown.payouts.iter().map(|x| x.amount.units()).sum();
    assert_eq!(
        breakdown.platform_fee.units()
            + breakdown.admin_fee.units()
            + paid
            + breakdown.unclaimed.units(),
        840
    );

    // Votes after close are rejections, not no-ops.
    let late = p.record_vote(
        VoterId::new("carol"),
        id,
        ProjectId::new(1),
        TokenId::new("RLY"),
        RawAmount::new(10),
        Timestamp::new(205),
    );
    assert!(late.is_err());
}

#[test]
fn mixed_token_contributions_share_one_leaderboard() {
    let mut p = platform();
    let id = active_campaign(&mut p, DistributionRule::Linear, 2);
    rly_vote(&mut p, id, "alice", 1, 1_000);
    // 3 raw USDX base units → 3 * 10^(12-6) * 2 = 6_000_000 canonical.
    p.record_vote(
        VoterId::new("bob"),
        id,
        ProjectId::new(2),
        TokenId::new("USDX"),
        RawAmount::new(3),
        Timestamp::new(150),
    )
    .unwrap();

    let board = p.leaderboard(&VoteTarget::Campaign(id)).unwrap();
    assert_eq!(
        board,
        vec![
            (ProjectId::new(2), NormalizedAmount::new(6_000_000)),
            (ProjectId::new(1), NormalizedAmount::new(1_000)),
        ]
    );
    assert_eq!(
        p.campaign(&id).unwrap().total_collected,
        NormalizedAmount::new(6_001_000)
    );
}

#[test]
fn batch_failure_leaves_no_partial_capture() {
    let mut p = platform();
    let id = active_campaign(&mut p, DistributionRule::Linear, 2);
    let result = p.record_votes(
        VoterId::new("alice"),
        id,
        vec![
            (ProjectId::new(1), TokenId::new("RLY"), RawAmount::new(50)),
            (ProjectId::new(99), TokenId::new("RLY"), RawAmount::new(25)),
        ],
        Timestamp::new(150),
    );
    assert!(result.is_err());
    assert!(p.campaign(&id).unwrap().total_collected.is_zero());
    assert_eq!(
        p.votes_for_project(&VoteTarget::Campaign(id), &ProjectId::new(1))
            .unwrap(),
        NormalizedAmount::ZERO
    );
}

#[test]
fn tournament_runs_stages_to_completion() {
    let mut p = platform();
    let id = active_campaign(&mut p, DistributionRule::Linear, 8);
    let tid = p.create_tournament(id, 3, 100, 25, true, true).unwrap();
    p.start_tournament(&tid, Timestamp::new(110)).unwrap();
    p.fund_stage(&tid, 0, TokenId::new("RLY"), RawAmount::new(1_000), Timestamp::new(110))
        .unwrap();

    // Descending vote totals over projects 1..=8.
    for n in 1..=8u64 {
        p.record_stage_vote(
            VoterId::new("v"),
            tid,
            0,
            ProjectId::new(n),
            TokenId::new("RLY"),
            RawAmount::new(100 * (9 - n as u128)),
            Timestamp::new(120),
        )
        .unwrap();
    }

    // 8 projects at 25% → the bottom two drop.
    let outcome = p.finalize_stage(&tid, 0, Timestamp::new(210)).unwrap();
    assert_eq!(outcome.eliminated, vec![ProjectId::new(7), ProjectId::new(8)]);
    assert_eq!(outcome.next_stage, Some(1));
    let paid: u128 = outcome.payouts.iter().map(|x| x.amount.units()).sum();
    assert_eq!(paid + outcome.unclaimed.units(), 1_000);

    // The finalized stage no longer takes votes.
    let late = p.record_stage_vote(
        VoterId::new("v"),
        tid,
        0,
        ProjectId::new(1),
        TokenId::new("RLY"),
        RawAmount::new(10),
        Timestamp::new(215),
    );
    assert!(matches!(late, Err(RallyError::StageNotAcceptingVotes)));

    // Stages 1 and 2: 6 → 5 → done.
    p.record_stage_vote(
        VoterId::new("v"),
        tid,
        1,
        ProjectId::new(1),
        TokenId::new("RLY"),
        RawAmount::new(10),
        Timestamp::new(220),
    )
    .unwrap();
    let outcome = p.finalize_stage(&tid, 1, Timestamp::new(320)).unwrap();
    assert_eq!(outcome.eliminated.len(), 1);
    assert!(!outcome.completed);

    p.record_stage_vote(
        VoterId::new("v"),
        tid,
        2,
        ProjectId::new(1),
        TokenId::new("RLY"),
        RawAmount::new(10),
        Timestamp::new(330),
    )
    .unwrap();
    let outcome = p.finalize_stage(&tid, 2, Timestamp::new(430)).unwrap();
    assert!(outcome.completed);
    assert_eq!(
        p.events().last().unwrap().action,
        ActionKind::TournamentCompleted
    );
}

#[test]
fn cancelled_tournament_rejects_further_votes() {
    let mut p = platform();
    let id = active_campaign(&mut p, DistributionRule::Linear, 4);
    let tid = p.create_tournament(id, 2, 100, 25, true, true).unwrap();
    p.start_tournament(&tid, Timestamp::new(110)).unwrap();
    p.cancel_tournament(&tid, Timestamp::new(120)).unwrap();

    let result = p.record_stage_vote(
        VoterId::new("v"),
        tid,
        0,
        ProjectId::new(1),
        TokenId::new("RLY"),
        RawAmount::new(10),
        Timestamp::new(130),
    );
    assert!(matches!(result, Err(RallyError::StageNotAcceptingVotes)));
}

#[test]
fn event_log_reconstructs_the_session() {
    let mut p = platform();
    let id = active_campaign(&mut p, DistributionRule::Linear, 1);
    rly_vote(&mut p, id, "alice", 1, 100);
    p.close_campaign(&id, Timestamp::new(200)).unwrap();
    p.distribute(&id, Timestamp::new(201)).unwrap();

    let actions: Vec<ActionKind> = p.events().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            ActionKind::CampaignCreated,
            ActionKind::VoteRecorded,
            ActionKind::CampaignClosed,
            ActionKind::CampaignDistributed,
        ]
    );
    let vote = &p.events()[1];
    assert_eq!(vote.actor, Some(VoterId::new("alice")));
    assert_eq!(vote.resulting_aggregate, Some(NormalizedAmount::new(100)));

    // Events are the external audit surface; they must serialize cleanly.
    let json = serde_json::to_string(p.events()).unwrap();
    assert!(json.contains("VoteRecorded"));
    assert!(json.contains("CampaignDistributed"));
}
