//! Platform façade for the Rally engine.
//!
//! Wires the value normalizer, vote ledger, campaign engine, and tournament
//! engine into the single surface external collaborators call: contribution
//! entry points, the read-only query surface, and the terminal distribution
//! and finalization actions. Every committed action appends an audit event
//! carrying the resulting aggregates, so consumers never replay raw votes.

mod convert;
pub mod platform;

pub use platform::Platform;
