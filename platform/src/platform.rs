//! The platform — every external entry point in one place.

use crate::convert;
use rally_distribution::{CampaignEngine, CampaignConfig, DistributionBreakdown};
use rally_ledger::{RecordKind, VoteLedger, VoteRecord};
use rally_oracle::{Normalizer, RateSource};
use rally_tournament::{StageOutcome, TournamentConfig, TournamentEngine};
use rally_types::{
    ActionKind, CampaignId, EventRecord, EventTarget, NormalizedAmount, PlatformParams,
    ProjectId, RallyError, RawAmount, StageState, Timestamp, TokenId, TournamentId, VoteTarget,
    VoterId,
};
use tracing::info;

/// The assembled engine, generic over the injected rate source.
pub struct Platform<R: RateSource> {
    params: PlatformParams,
    normalizer: Normalizer,
    rates: R,
    ledger: VoteLedger,
    campaigns: CampaignEngine,
    tournaments: TournamentEngine,
    events: Vec<EventRecord>,
}

impl<R: RateSource> Platform<R> {
    pub fn new(params: PlatformParams, normalizer: Normalizer, rates: R) -> Self {
        Self {
            campaigns: CampaignEngine::new(params.clone()),
            tournaments: TournamentEngine::new(params.clone()),
            params,
            normalizer,
            rates,
            ledger: VoteLedger::new(),
            events: Vec::new(),
        }
    }

    // ── Normalization ────────────────────────────────────────────────────

    /// Convert a raw token amount to canonical units (UI-side previews use
    /// this; it commits nothing).
    pub fn normalize(&self, token: &TokenId, raw: RawAmount) -> Result<NormalizedAmount, RallyError> {
        self.normalizer
            .normalize(&self.rates, token, raw)
            .map_err(convert::from_oracle)
    }

    // ── Campaigns ────────────────────────────────────────────────────────

    pub fn create_campaign(
        &mut self,
        config: CampaignConfig,
        now: Timestamp,
    ) -> Result<CampaignId, RallyError> {
        let id = self
            .campaigns
            .create_campaign(&mut self.ledger, config, now)
            .map_err(convert::from_distribution)?;
        self.events.push(EventRecord::new(
            ActionKind::CampaignCreated,
            EventTarget::Campaign(id),
            now,
        ));
        Ok(id)
    }

    pub fn approve_project(
        &mut self,
        campaign: &CampaignId,
        project: ProjectId,
    ) -> Result<(), RallyError> {
        self.campaigns
            .approve_project(&mut self.ledger, campaign, project)
            .map_err(convert::from_distribution)
    }

    pub fn activate_campaign(
        &mut self,
        campaign: &CampaignId,
        now: Timestamp,
    ) -> Result<(), RallyError> {
        self.campaigns
            .activate(&mut self.ledger, campaign, now)
            .map_err(convert::from_distribution)
    }

    pub fn close_campaign(
        &mut self,
        campaign: &CampaignId,
        now: Timestamp,
    ) -> Result<(), RallyError> {
        self.campaigns
            .close(&mut self.ledger, campaign, now)
            .map_err(convert::from_distribution)?;
        self.events.push(EventRecord::new(
            ActionKind::CampaignClosed,
            EventTarget::Campaign(*campaign),
            now,
        ));
        Ok(())
    }

    pub fn cancel_campaign(
        &mut self,
        campaign: &CampaignId,
        now: Timestamp,
    ) -> Result<(), RallyError> {
        self.campaigns
            .cancel(&mut self.ledger, campaign)
            .map_err(convert::from_distribution)?;
        self.events.push(EventRecord::new(
            ActionKind::CampaignClosed,
            EventTarget::Campaign(*campaign),
            now,
        ));
        Ok(())
    }

    pub fn campaign(&self, id: &CampaignId) -> Result<&rally_distribution::Campaign, RallyError> {
        self.campaigns.campaign(id).map_err(convert::from_distribution)
    }

    // ── Contributions ────────────────────────────────────────────────────

    /// Record one contribution against a campaign project. Returns the
    /// project's resulting normalized total.
    pub fn record_vote(
        &mut self,
        voter: VoterId,
        campaign: CampaignId,
        project: ProjectId,
        token: TokenId,
        raw: RawAmount,
        now: Timestamp,
    ) -> Result<NormalizedAmount, RallyError> {
        let normalized = self.normalize(&token, raw)?;
        self.precheck_collected(&campaign, normalized)?;
        let record = VoteRecord {
            voter: voter.clone(),
            target: VoteTarget::Campaign(campaign),
            project,
            token: token.clone(),
            raw_amount: raw,
            normalized_amount: normalized,
            kind: RecordKind::Contribution,
            timestamp: now,
        };
        let total = self
            .ledger
            .record_vote(record)
            .map_err(convert::from_ledger)?;
        self.campaigns
            .note_contribution(&campaign, normalized)
            .map_err(convert::from_distribution)?;
        self.push_vote_event(
            ActionKind::VoteRecorded,
            EventTarget::Campaign(campaign),
            voter,
            project,
            token,
            raw,
            normalized,
            total,
            now,
        );
        Ok(total)
    }

    /// Record a batch of contributions against one campaign, all-or-nothing.
    pub fn record_votes(
        &mut self,
        voter: VoterId,
        campaign: CampaignId,
        entries: Vec<(ProjectId, TokenId, RawAmount)>,
        now: Timestamp,
    ) -> Result<Vec<NormalizedAmount>, RallyError> {
        if entries.len() > self.params.max_batch_votes {
            return Err(RallyError::Validation(format!(
                "batch of {} exceeds the maximum of {}",
                entries.len(),
                self.params.max_batch_votes
            )));
        }
        let target = VoteTarget::Campaign(campaign);
        let mut records = Vec::with_capacity(entries.len());
        let mut batch_total = NormalizedAmount::ZERO;
        for (project, token, raw) in entries {
            let normalized = self.normalize(&token, raw)?;
            batch_total = batch_total
                .checked_add(normalized)
                .ok_or(RallyError::Overflow)?;
            records.push(VoteRecord {
                voter: voter.clone(),
                target,
                project,
                token,
                raw_amount: raw,
                normalized_amount: normalized,
                kind: RecordKind::Contribution,
                timestamp: now,
            });
        }
        self.precheck_collected(&campaign, batch_total)?;
        let event_inputs: Vec<(ProjectId, TokenId, RawAmount, NormalizedAmount)> = records
            .iter()
            .map(|r| (r.project, r.token.clone(), r.raw_amount, r.normalized_amount))
            .collect();
        let totals = self
            .ledger
            .record_votes(&target, records)
            .map_err(convert::from_ledger)?;
        self.campaigns
            .note_contribution(&campaign, batch_total)
            .map_err(convert::from_distribution)?;
        for ((project, token, raw, normalized), total) in event_inputs.into_iter().zip(&totals) {
            self.push_vote_event(
                ActionKind::VoteRecorded,
                EventTarget::Campaign(campaign),
                voter.clone(),
                project,
                token,
                raw,
                normalized,
                *total,
                now,
            );
        }
        Ok(totals)
    }

    /// Withdraw part of a prior contribution while the campaign is open.
    pub fn withdraw_vote(
        &mut self,
        voter: VoterId,
        campaign: CampaignId,
        project: ProjectId,
        token: TokenId,
        raw: RawAmount,
        now: Timestamp,
    ) -> Result<NormalizedAmount, RallyError> {
        let normalized = self.normalize(&token, raw)?;
        let record = VoteRecord {
            voter: voter.clone(),
            target: VoteTarget::Campaign(campaign),
            project,
            token: token.clone(),
            raw_amount: raw,
            normalized_amount: normalized,
            kind: RecordKind::Compensation,
            timestamp: now,
        };
        let total = self
            .ledger
            .withdraw_vote(record)
            .map_err(convert::from_ledger)?;
        self.campaigns
            .note_withdrawal(&campaign, normalized)
            .map_err(convert::from_distribution)?;
        self.push_vote_event(
            ActionKind::VoteWithdrawn,
            EventTarget::Campaign(campaign),
            voter,
            project,
            token,
            raw,
            normalized,
            total,
            now,
        );
        Ok(total)
    }

    // ── Distribution ─────────────────────────────────────────────────────

    /// Run the terminal fee waterfall and payout split for a closed campaign.
    pub fn distribute(
        &mut self,
        campaign: &CampaignId,
        now: Timestamp,
    ) -> Result<DistributionBreakdown, RallyError> {
        let breakdown = self
            .campaigns
            .distribute(&mut self.ledger, campaign, now)
            .map_err(convert::from_distribution)?;
        let mut event = EventRecord::new(
            ActionKind::CampaignDistributed,
            EventTarget::Campaign(*campaign),
            now,
        );
        event.normalized_amount = Some(breakdown.total);
        event.resulting_aggregate = Some(breakdown.unclaimed);
        self.events.push(event);
        info!(id = %campaign, winners = breakdown.payouts.len(), "distribution committed");
        Ok(breakdown)
    }

    // ── Tournaments ──────────────────────────────────────────────────────

    /// Create a tournament linked to a campaign. The distribution rule is
    /// inherited from the campaign.
    #[allow(clippy::too_many_arguments)]
    pub fn create_tournament(
        &mut self,
        campaign: CampaignId,
        stage_count: u32,
        stage_duration_secs: u64,
        elimination_pct: u8,
        auto_progress: bool,
        disqualify_enabled: bool,
    ) -> Result<TournamentId, RallyError> {
        let rule = self
            .campaigns
            .campaign(&campaign)
            .map_err(convert::from_distribution)?
            .rule;
        self.tournaments
            .create_tournament(TournamentConfig {
                campaign,
                rule,
                stage_count,
                stage_duration_secs,
                elimination_pct,
                auto_progress,
                disqualify_enabled,
            })
            .map_err(convert::from_tournament)
    }

    /// Start a tournament. Stage 0's roster is the linked campaign's full
    /// approved-project set.
    pub fn start_tournament(
        &mut self,
        tournament: &TournamentId,
        now: Timestamp,
    ) -> Result<(), RallyError> {
        let campaign = self
            .tournaments
            .tournament(tournament)
            .map_err(convert::from_tournament)?
            .campaign;
        let roster: Vec<ProjectId> = self
            .ledger
            .book(&VoteTarget::Campaign(campaign))
            .map_err(convert::from_ledger)?
            .participations()
            .map(|p| p.project)
            .collect();
        self.tournaments
            .start_tournament(&mut self.ledger, tournament, roster, now)
            .map_err(convert::from_tournament)?;
        self.events.push(EventRecord::new(
            ActionKind::TournamentStarted,
            EventTarget::Tournament(*tournament),
            now,
        ));
        Ok(())
    }

    /// Explicitly open a pending stage (tournaments without auto-progress).
    pub fn start_stage(
        &mut self,
        tournament: &TournamentId,
        stage: u32,
        now: Timestamp,
    ) -> Result<(), RallyError> {
        self.tournaments
            .start_stage(&mut self.ledger, tournament, stage, now)
            .map_err(convert::from_tournament)?;
        self.events.push(EventRecord::new(
            ActionKind::StageStarted,
            EventTarget::Stage(*tournament, stage),
            now,
        ));
        Ok(())
    }

    /// Add value to a stage's reward pool. Accumulates across calls.
    pub fn fund_stage(
        &mut self,
        tournament: &TournamentId,
        stage: u32,
        token: TokenId,
        raw: RawAmount,
        now: Timestamp,
    ) -> Result<NormalizedAmount, RallyError> {
        let normalized = self.normalize(&token, raw)?;
        let pool = self
            .tournaments
            .fund_stage(tournament, stage, normalized)
            .map_err(convert::from_tournament)?;
        let mut event = EventRecord::new(
            ActionKind::StageFunded,
            EventTarget::Stage(*tournament, stage),
            now,
        );
        event.token = Some(token);
        event.raw_amount = Some(raw);
        event.normalized_amount = Some(normalized);
        event.resulting_aggregate = Some(pool);
        self.events.push(event);
        Ok(pool)
    }

    /// Record a contribution against a project within a started stage.
    #[allow(clippy::too_many_arguments)]
    pub fn record_stage_vote(
        &mut self,
        voter: VoterId,
        tournament: TournamentId,
        stage: u32,
        project: ProjectId,
        token: TokenId,
        raw: RawAmount,
        now: Timestamp,
    ) -> Result<NormalizedAmount, RallyError> {
        let normalized = self.normalize(&token, raw)?;
        let record = VoteRecord {
            voter: voter.clone(),
            target: VoteTarget::Stage(tournament, stage),
            project,
            token: token.clone(),
            raw_amount: raw,
            normalized_amount: normalized,
            kind: RecordKind::Contribution,
            timestamp: now,
        };
        let total = self
            .tournaments
            .record_stage_vote(&mut self.ledger, record)
            .map_err(convert::from_tournament)?;
        self.push_vote_event(
            ActionKind::VoteRecorded,
            EventTarget::Stage(tournament, stage),
            voter,
            project,
            token,
            raw,
            normalized,
            total,
            now,
        );
        Ok(total)
    }

    /// Finalize a stage: rank, eliminate, pay out the stage pool, and open
    /// the next stage or complete the tournament.
    pub fn finalize_stage(
        &mut self,
        tournament: &TournamentId,
        stage: u32,
        now: Timestamp,
    ) -> Result<StageOutcome, RallyError> {
        let outcome = self
            .tournaments
            .finalize_stage(&mut self.ledger, tournament, stage, now)
            .map_err(convert::from_tournament)?;
        let mut event = EventRecord::new(
            ActionKind::StageFinalized,
            EventTarget::Stage(*tournament, stage),
            now,
        );
        event.resulting_aggregate = Some(outcome.unclaimed);
        self.events.push(event);
        // Auto-progress opens the next stage inside the engine; journal that
        // start too, so the event log reconstructs the full session.
        if let Some(next) = outcome.next_stage {
            let started = self
                .tournaments
                .tournament(tournament)
                .map_err(convert::from_tournament)?
                .stage(next)
                .map_or(false, |s| s.state == StageState::Started);
            if started {
                self.events.push(EventRecord::new(
                    ActionKind::StageStarted,
                    EventTarget::Stage(*tournament, next),
                    now,
                ));
            }
        }
        if outcome.completed {
            self.events.push(EventRecord::new(
                ActionKind::TournamentCompleted,
                EventTarget::Tournament(*tournament),
                now,
            ));
        }
        Ok(outcome)
    }

    pub fn cancel_tournament(
        &mut self,
        tournament: &TournamentId,
        now: Timestamp,
    ) -> Result<(), RallyError> {
        self.tournaments
            .cancel(&mut self.ledger, tournament)
            .map_err(convert::from_tournament)?;
        self.events.push(EventRecord::new(
            ActionKind::TournamentCancelled,
            EventTarget::Tournament(*tournament),
            now,
        ));
        Ok(())
    }

    pub fn tournament(
        &self,
        id: &TournamentId,
    ) -> Result<&rally_tournament::Tournament, RallyError> {
        self.tournaments.tournament(id).map_err(convert::from_tournament)
    }

    // ── Query surface ────────────────────────────────────────────────────

    pub fn leaderboard(
        &self,
        target: &VoteTarget,
    ) -> Result<Vec<(ProjectId, NormalizedAmount)>, RallyError> {
        self.ledger.leaderboard(target).map_err(convert::from_ledger)
    }

    pub fn votes_for_project(
        &self,
        target: &VoteTarget,
        project: &ProjectId,
    ) -> Result<NormalizedAmount, RallyError> {
        self.ledger
            .votes_for_project(target, project)
            .map_err(convert::from_ledger)
    }

    pub fn votes_for_voter(
        &self,
        target: &VoteTarget,
        voter: &VoterId,
    ) -> Result<NormalizedAmount, RallyError> {
        self.ledger
            .votes_for_voter(target, voter)
            .map_err(convert::from_ledger)
    }

    /// Audit events committed so far, oldest first.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Hand the committed events to the surrounding system.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// Reject up front when a contribution could not be added to the
    /// campaign's collected total, so the ledger is never mutated first.
    fn precheck_collected(
        &self,
        campaign: &CampaignId,
        amount: NormalizedAmount,
    ) -> Result<(), RallyError> {
        let c = self
            .campaigns
            .campaign(campaign)
            .map_err(convert::from_distribution)?;
        if !c.state.accepts_votes() {
            return Err(RallyError::Validation(format!(
                "campaign is not accepting votes in state {:?}",
                c.state
            )));
        }
        c.total_collected
            .checked_add(amount)
            .ok_or(RallyError::Overflow)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn push_vote_event(
        &mut self,
        action: ActionKind,
        target: EventTarget,
        voter: VoterId,
        project: ProjectId,
        token: TokenId,
        raw: RawAmount,
        normalized: NormalizedAmount,
        resulting_total: NormalizedAmount,
        now: Timestamp,
    ) {
        let mut event = EventRecord::new(action, target, now);
        event.actor = Some(voter);
        event.project = Some(project);
        event.token = Some(token);
        event.raw_amount = Some(raw);
        event.normalized_amount = Some(normalized);
        event.resulting_aggregate = Some(resulting_total);
        self.events.push(event);
    }
}
