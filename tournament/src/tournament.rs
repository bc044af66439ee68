//! Tournaments — configuration and top-level state.

use crate::stage::Stage;
use rally_types::{CampaignId, DistributionRule, TournamentId, TournamentState};
use serde::{Deserialize, Serialize};

/// Creation-time configuration for a tournament.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// The campaign whose approved projects seed stage 0 and whose
    /// distribution rule every stage payout inherits.
    pub campaign: CampaignId,
    pub rule: DistributionRule,
    /// Number of stages to run. Finalizing the last one completes the
    /// tournament even if survivors remain.
    pub stage_count: u32,
    /// Advisory stage voting-window length, checked at finalization time.
    pub stage_duration_secs: u64,
    /// Share of each stage's roster eliminated at finalization (0..=100).
    pub elimination_pct: u8,
    /// Open each next stage immediately on finalization instead of waiting
    /// for an explicit start.
    pub auto_progress: bool,
    /// When false the tournament is survival-scored: stages rank and pay
    /// out, but the full roster always carries forward.
    pub disqualify_enabled: bool,
}

/// A multi-stage elimination competition linked to a campaign.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub campaign: CampaignId,
    pub rule: DistributionRule,
    pub stage_count: u32,
    pub stage_duration_secs: u64,
    pub elimination_pct: u8,
    pub auto_progress: bool,
    pub disqualify_enabled: bool,
    pub state: TournamentState,
    pub stages: Vec<Stage>,
}

impl Tournament {
    pub fn new(id: TournamentId, config: TournamentConfig) -> Self {
        Self {
            id,
            campaign: config.campaign,
            rule: config.rule,
            stage_count: config.stage_count,
            stage_duration_secs: config.stage_duration_secs,
            elimination_pct: config.elimination_pct,
            auto_progress: config.auto_progress,
            disqualify_enabled: config.disqualify_enabled,
            state: TournamentState::Created,
            stages: Vec::new(),
        }
    }

    pub fn stage(&self, index: u32) -> Option<&Stage> {
        self.stages.get(index as usize)
    }

    pub fn stage_mut(&mut self, index: u32) -> Option<&mut Stage> {
        self.stages.get_mut(index as usize)
    }
}
