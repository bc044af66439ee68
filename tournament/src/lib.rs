//! Tournament staging for the Rally engine.
//!
//! A tournament derives its project roster from a linked campaign and runs
//! it through an ordered sequence of elimination stages. Each stage is its
//! own closed economic unit: it has its own ledger book, its own reward
//! pool, and its own payout; funds never roll between stages automatically.
//! Rosters only ever shrink or stay equal across stages.

pub mod engine;
pub mod error;
pub mod stage;
pub mod tournament;

pub use engine::{StageOutcome, TournamentEngine, TournamentSnapshot};
pub use error::TournamentError;
pub use stage::Stage;
pub use tournament::{Tournament, TournamentConfig};
