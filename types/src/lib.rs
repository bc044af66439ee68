//! Fundamental types for the Rally funding engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identifiers, amounts, timestamps, token references, lifecycle
//! enums, platform parameters, and audit events.

pub mod amount;
pub mod error;
pub mod event;
pub mod id;
pub mod params;
pub mod state;
pub mod time;
pub mod token;

pub use amount::{NormalizedAmount, RawAmount};
pub use error::RallyError;
pub use event::{ActionKind, EventRecord, EventTarget};
pub use id::{CampaignId, ProjectId, TournamentId, VoterId};
pub use params::{PlatformParams, BPS_DENOMINATOR};
pub use state::{CampaignState, DistributionRule, StageState, TournamentState, VoteTarget};
pub use time::Timestamp;
pub use token::{TokenId, TokenInfo};
