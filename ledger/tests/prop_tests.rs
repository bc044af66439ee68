use proptest::prelude::*;

use rally_ledger::{RecordKind, VoteLedger, VoteRecord};
use rally_types::{
    CampaignId, NormalizedAmount, ProjectId, RawAmount, Timestamp, TokenId, VoteTarget, VoterId,
};

fn target() -> VoteTarget {
    VoteTarget::Campaign(CampaignId::new(1))
}

fn ledger_with_projects(projects: &[u64]) -> VoteLedger {
    let mut l = VoteLedger::new();
    l.open_target(target()).unwrap();
    for p in projects {
        l.approve_project(&target(), ProjectId::new(*p)).unwrap();
    }
    l.set_accepting(&target(), true).unwrap();
    l
}

fn record(voter: u8, project: u64, amount: u128) -> VoteRecord {
    VoteRecord {
        voter: VoterId::new(format!("voter-{voter}")),
        target: target(),
        project: ProjectId::new(project),
        token: TokenId::new("RLY"),
        raw_amount: RawAmount::new(amount),
        normalized_amount: NormalizedAmount::new(amount),
        kind: RecordKind::Contribution,
        timestamp: Timestamp::new(0),
    }
}

proptest! {
    /// Project aggregates always equal the sum over the raw records.
    #[test]
    fn aggregates_match_record_sums(
        votes in prop::collection::vec((0u8..5, 0u64..4, 1u128..1_000_000), 1..50)
    ) {
        let mut l = ledger_with_projects(&[0, 1, 2, 3]);
        for (voter, project, amount) in votes {
            l.record_vote(record(voter, project, amount)).unwrap();
        }
        let book = l.book(&target()).unwrap();
        for p in 0u64..4 {
            let id = ProjectId::new(p);
            prop_assert_eq!(book.votes_for_project(&id), book.recompute_project_total(&id));
        }
    }

    /// Within an open target, a project's total never decreases as votes land.
    #[test]
    fn project_totals_monotonic(
        votes in prop::collection::vec((0u8..5, 0u64..3, 1u128..1_000_000), 1..40)
    ) {
        let mut l = ledger_with_projects(&[0, 1, 2]);
        let mut prev = [NormalizedAmount::ZERO; 3];
        for (voter, project, amount) in votes {
            l.record_vote(record(voter, project, amount)).unwrap();
            for p in 0u64..3 {
                let now = l.votes_for_project(&target(), &ProjectId::new(p)).unwrap();
                prop_assert!(now >= prev[p as usize]);
                prev[p as usize] = now;
            }
        }
    }

    /// An identical vote sequence always produces an identical leaderboard.
    #[test]
    fn leaderboard_deterministic(
        votes in prop::collection::vec((0u8..5, 0u64..4, 1u128..1_000_000), 1..40)
    ) {
        let mut a = ledger_with_projects(&[0, 1, 2, 3]);
        let mut b = ledger_with_projects(&[0, 1, 2, 3]);
        for (voter, project, amount) in &votes {
            a.record_vote(record(*voter, *project, *amount)).unwrap();
            b.record_vote(record(*voter, *project, *amount)).unwrap();
        }
        prop_assert_eq!(a.leaderboard(&target()).unwrap(), b.leaderboard(&target()).unwrap());
    }

    /// The leaderboard is sorted descending with ascending-identity ties.
    #[test]
    fn leaderboard_order_invariant(
        votes in prop::collection::vec((0u8..5, 0u64..6, 1u128..1_000), 0..40)
    ) {
        let mut l = ledger_with_projects(&[0, 1, 2, 3, 4, 5]);
        for (voter, project, amount) in votes {
            l.record_vote(record(voter, project, amount)).unwrap();
        }
        let board = l.leaderboard(&target()).unwrap();
        for pair in board.windows(2) {
            prop_assert!(
                pair[0].1 > pair[1].1 || (pair[0].1 == pair[1].1 && pair[0].0 < pair[1].0)
            );
        }
    }

    /// A failed batch leaves the ledger byte-identical to before the call.
    #[test]
    fn failed_batch_mutates_nothing(
        good in prop::collection::vec((0u8..5, 0u64..3, 1u128..1_000), 1..10)
    ) {
        let mut l = ledger_with_projects(&[0, 1, 2]);
        let before = l.save_state();
        let mut batch: Vec<VoteRecord> =
            good.iter().map(|(v, p, a)| record(*v, *p, *a)).collect();
        batch.push(record(0, 99, 10)); // unapproved project
        prop_assert!(l.record_votes(&target(), batch).is_err());
        prop_assert_eq!(l.save_state(), before);
    }
}
