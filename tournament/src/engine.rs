//! Tournament engine — stage lifecycle, elimination, and per-stage payouts.

use crate::error::TournamentError;
use crate::stage::Stage;
use crate::tournament::{Tournament, TournamentConfig};
use rally_distribution::{allocate, ProjectPayout};
use rally_ledger::{VoteLedger, VoteRecord};
use rally_types::{
    NormalizedAmount, PlatformParams, ProjectId, StageState, Timestamp, TournamentId,
    TournamentState, VoteTarget,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// The audited result of finalizing one stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageOutcome {
    pub tournament: TournamentId,
    pub stage: u32,
    /// Full stage leaderboard at the moment of finalization.
    pub leaderboard: Vec<(ProjectId, NormalizedAmount)>,
    /// Bottom-ranked projects dropped from the roster, in leaderboard order.
    pub eliminated: Vec<ProjectId>,
    pub payouts: Vec<ProjectPayout>,
    /// Pool value no surviving project qualified for.
    pub unclaimed: NormalizedAmount,
    /// Index of the stage opened with the survivor roster, if any.
    pub next_stage: Option<u32>,
    /// Whether this finalization completed the tournament.
    pub completed: bool,
}

/// Manages every tournament and drives the stage state machine.
pub struct TournamentEngine {
    params: PlatformParams,
    next_tournament_id: u64,
    tournaments: HashMap<TournamentId, Tournament>,
}

impl TournamentEngine {
    pub fn new(params: PlatformParams) -> Self {
        Self {
            params,
            next_tournament_id: 1,
            tournaments: HashMap::new(),
        }
    }

    pub fn tournament(&self, id: &TournamentId) -> Result<&Tournament, TournamentError> {
        self.tournaments
            .get(id)
            .ok_or(TournamentError::TournamentNotFound(*id))
    }

    fn tournament_mut(&mut self, id: &TournamentId) -> Result<&mut Tournament, TournamentError> {
        self.tournaments
            .get_mut(id)
            .ok_or(TournamentError::TournamentNotFound(*id))
    }

    /// Register a tournament in its `Created` state.
    pub fn create_tournament(
        &mut self,
        config: TournamentConfig,
    ) -> Result<TournamentId, TournamentError> {
        if config.stage_count == 0 || config.stage_count > self.params.max_stages {
            return Err(TournamentError::TooManyStages {
                requested: config.stage_count,
                max: self.params.max_stages,
            });
        }
        if config.elimination_pct > 100 {
            return Err(TournamentError::InvalidEliminationPercentage(
                config.elimination_pct,
            ));
        }
        let id = TournamentId::new(self.next_tournament_id);
        self.next_tournament_id += 1;
        self.tournaments.insert(id, Tournament::new(id, config));
        info!(%id, "tournament created");
        Ok(id)
    }

    /// Start a tournament: stage 0 opens with the linked campaign's approved
    /// roster and immediately accepts votes.
    pub fn start_tournament(
        &mut self,
        ledger: &mut VoteLedger,
        id: &TournamentId,
        roster: Vec<ProjectId>,
        now: Timestamp,
    ) -> Result<(), TournamentError> {
        let tournament = self.tournament(id)?;
        match tournament.state {
            TournamentState::Created => {}
            TournamentState::Active => return Err(TournamentError::AlreadyActive),
            other => return Err(TournamentError::WrongState(format!("{other:?}"))),
        }
        if roster.is_empty() {
            return Err(TournamentError::EmptyRoster);
        }
        let elimination_pct = tournament.elimination_pct;
        open_stage_book(ledger, *id, 0, &roster, true)?;

        let tournament = self.tournament_mut(id)?;
        let mut stage = Stage::new(0, roster, elimination_pct);
        stage.state = StageState::Started;
        stage.started_at = Some(now);
        tournament.stages.push(stage);
        tournament.state = TournamentState::Active;
        info!(%id, "tournament started");
        Ok(())
    }

    /// Explicitly open a `NotStarted` stage (used when auto-progress is off).
    pub fn start_stage(
        &mut self,
        ledger: &mut VoteLedger,
        id: &TournamentId,
        index: u32,
        now: Timestamp,
    ) -> Result<(), TournamentError> {
        let tournament = self.tournament_mut(id)?;
        if tournament.state != TournamentState::Active {
            return Err(TournamentError::WrongState(format!(
                "{:?}",
                tournament.state
            )));
        }
        let tid = tournament.id;
        let stage = tournament
            .stage_mut(index)
            .ok_or(TournamentError::StageNotFound {
                tournament: tid,
                index,
            })?;
        match stage.state {
            StageState::NotStarted => {}
            StageState::Started => return Err(TournamentError::StageAlreadyStarted),
            StageState::Finalized => return Err(TournamentError::StageAlreadyFinalized),
        }
        stage.state = StageState::Started;
        stage.started_at = Some(now);
        ledger.set_accepting(&VoteTarget::Stage(tid, index), true)?;
        info!(%tid, index, "stage started");
        Ok(())
    }

    /// Add normalized value to a stage's reward pool. Permitted any time
    /// before finalization; accumulates across calls.
    pub fn fund_stage(
        &mut self,
        id: &TournamentId,
        index: u32,
        amount: NormalizedAmount,
    ) -> Result<NormalizedAmount, TournamentError> {
        let tournament = self.tournament_mut(id)?;
        // A terminal tournament can never finalize a stage, so value funded
        // into it would be stranded forever.
        if tournament.state.is_terminal() {
            return Err(TournamentError::WrongState(format!(
                "{:?}",
                tournament.state
            )));
        }
        let tid = tournament.id;
        let stage = tournament
            .stage_mut(index)
            .ok_or(TournamentError::StageNotFound {
                tournament: tid,
                index,
            })?;
        if stage.state == StageState::Finalized {
            return Err(TournamentError::StageAlreadyFinalized);
        }
        stage.reward_pool = stage
            .reward_pool
            .checked_add(amount)
            .ok_or(TournamentError::Overflow)?;
        Ok(stage.reward_pool)
    }

    /// Record a vote against a stage, delegating to the ledger. The stage
    /// must be `Started`; any other state rejects before the ledger is
    /// touched so callers get the stage-specific error kind.
    pub fn record_stage_vote(
        &self,
        ledger: &mut VoteLedger,
        record: VoteRecord,
    ) -> Result<NormalizedAmount, TournamentError> {
        let (id, index) = match record.target {
            VoteTarget::Stage(id, index) => (id, index),
            VoteTarget::Campaign(_) => {
                return Err(TournamentError::WrongState("campaign target".into()))
            }
        };
        let tournament = self.tournament(&id)?;
        if tournament.state != TournamentState::Active {
            return Err(TournamentError::StageNotAcceptingVotes);
        }
        let stage = tournament
            .stage(index)
            .ok_or(TournamentError::StageNotFound {
                tournament: id,
                index,
            })?;
        if !stage.state.accepts_votes() {
            return Err(TournamentError::StageNotAcceptingVotes);
        }
        Ok(ledger.record_vote(record)?)
    }

    /// Finalize a stage: close its book, rank, eliminate, pay out, and open
    /// the next stage (or complete the tournament).
    pub fn finalize_stage(
        &mut self,
        ledger: &mut VoteLedger,
        id: &TournamentId,
        index: u32,
        now: Timestamp,
    ) -> Result<StageOutcome, TournamentError> {
        let tournament = self.tournament(id)?;
        if tournament.state != TournamentState::Active {
            return Err(TournamentError::WrongState(format!(
                "{:?}",
                tournament.state
            )));
        }
        let stage = tournament
            .stage(index)
            .ok_or(TournamentError::StageNotFound {
                tournament: *id,
                index,
            })?;
        match stage.state {
            StageState::Started => {}
            StageState::Finalized => return Err(TournamentError::StageAlreadyFinalized),
            StageState::NotStarted => {
                return Err(TournamentError::WrongState("NotStarted".into()))
            }
        }
        let started_at = stage.started_at.unwrap_or(Timestamp::EPOCH);
        if !started_at.has_expired(tournament.stage_duration_secs, now) {
            return Err(TournamentError::StageWindowNotElapsed);
        }

        // Close the book before reading aggregates so the snapshot is exact.
        let target = VoteTarget::Stage(*id, index);
        ledger.close_target(&target)?;
        let leaderboard = ledger.leaderboard(&target)?;

        let eliminated_count = stage.eliminated_count(tournament.disqualify_enabled);
        let survivor_count = leaderboard.len() - eliminated_count;
        let survivors: Vec<(ProjectId, NormalizedAmount)> =
            leaderboard[..survivor_count].to_vec();
        let eliminated: Vec<ProjectId> = leaderboard[survivor_count..]
            .iter()
            .map(|(p, _)| *p)
            .collect();

        // Pay the pool to surviving projects with non-zero votes, under the
        // campaign's rule. Zero-vote survivors advance but earn nothing.
        let winners: Vec<(ProjectId, NormalizedAmount)> = survivors
            .iter()
            .filter(|(_, votes)| !votes.is_zero())
            .cloned()
            .collect();
        let pool = stage.reward_pool;
        let shares = allocate(pool, &winners, tournament.rule)?;
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
        let unclaimed = NormalizedAmount::new(pool.units() - paid);

        let auto_progress = tournament.auto_progress;
        let elimination_pct = tournament.elimination_pct;
        let last_stage = index + 1 >= tournament.stage_count;
        let next_roster: Vec<ProjectId> = survivors.iter().map(|(p, _)| *p).collect();

        let (next_stage, completed) = if next_roster.is_empty() || last_stage {
            (None, true)
        } else {
            open_stage_book(ledger, *id, index + 1, &next_roster, auto_progress)?;
            (Some(index + 1), false)
        };

        let tournament = self.tournament_mut(id)?;
        {
            let stage = tournament.stage_mut(index).ok_or(
                TournamentError::StageNotFound {
                    tournament: *id,
                    index,
                },
            )?;
            stage.state = StageState::Finalized;
            stage.finalized_at = Some(now);
        }
        if let Some(next) = next_stage {
            let mut stage = Stage::new(next, next_roster, elimination_pct);
            if auto_progress {
                stage.state = StageState::Started;
                stage.started_at = Some(now);
            }
            tournament.stages.push(stage);
        }
        if completed {
            tournament.state = TournamentState::Completed;
        }
        info!(
            %id,
            index,
            eliminated = eliminated.len(),
            pool = pool.units(),
            completed,
            "stage finalized"
        );

        Ok(StageOutcome {
            tournament: *id,
            stage: index,
            leaderboard,
            eliminated,
            payouts,
            unclaimed,
            next_stage,
            completed,
        })
    }

    /// Explicit admin cancel, terminal from any non-completed state. Any
    /// open stage book is closed so no further votes land.
    pub fn cancel(
        &mut self,
        ledger: &mut VoteLedger,
        id: &TournamentId,
    ) -> Result<(), TournamentError> {
        let tournament = self.tournament_mut(id)?;
        if tournament.state.is_terminal() {
            return Err(TournamentError::WrongState(format!(
                "{:?}",
                tournament.state
            )));
        }
        let tid = tournament.id;
        let open_stages: Vec<u32> = tournament
            .stages
            .iter()
            .filter(|s| s.state == StageState::Started)
            .map(|s| s.index)
            .collect();
        tournament.state = TournamentState::Cancelled;
        for index in open_stages {
            ledger.close_target(&VoteTarget::Stage(tid, index))?;
        }
        info!(%tid, "tournament cancelled");
        Ok(())
    }
}

/// Create and populate a stage's ledger book.
fn open_stage_book(
    ledger: &mut VoteLedger,
    id: TournamentId,
    index: u32,
    roster: &[ProjectId],
    accepting: bool,
) -> Result<(), TournamentError> {
    let target = VoteTarget::Stage(id, index);
    ledger.open_target(target)?;
    for project in roster {
        ledger.approve_project(&target, *project)?;
    }
    if accepting {
        ledger.set_accepting(&target, true)?;
    }
    Ok(())
}

/// Serializable snapshot of the tournament engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub next_tournament_id: u64,
    pub tournaments: Vec<Tournament>,
}

impl TournamentEngine {
    /// Serialize all tournaments to bytes for persistence.
    pub fn save_state(&self) -> Vec<u8> {
        let mut tournaments: Vec<Tournament> = self.tournaments.values().cloned().collect();
        tournaments.sort_by_key(|t| t.id);
        let snapshot = TournamentSnapshot {
            next_tournament_id: self.next_tournament_id,
            tournaments,
        };
        bincode::serialize(&snapshot).unwrap_or_default()
    }

    /// Restore an engine from serialized bytes.
    pub fn load_state(data: &[u8], params: PlatformParams) -> Self {
        match bincode::deserialize::<TournamentSnapshot>(data) {
            Ok(snapshot) => {
                let mut tournaments = HashMap::new();
                for t in snapshot.tournaments {
                    tournaments.insert(t.id, t);
                }
                Self {
                    params,
                    next_tournament_id: snapshot.next_tournament_id,
                    tournaments,
                }
            }
            Err(_) => Self::new(params),
        }
    }
}
