//! Fund distribution for the Rally engine.
//!
//! Owns campaign lifecycles and the terminal, one-shot distribution action:
//! a fee waterfall over the collected pool followed by a linear or quadratic
//! split among the top-ranked projects. All arithmetic is integer, division
//! truncates, and the dust remainder goes to the first-ranked winner so that
//! fees plus payouts always reconcile to the collected total exactly.

pub mod allocation;
pub mod campaign;
pub mod engine;
pub mod error;

pub use allocation::{allocate, isqrt};
pub use campaign::{Campaign, CampaignConfig};
pub use engine::{CampaignEngine, DistributionBreakdown, ProjectPayout};
pub use error::DistributionError;
