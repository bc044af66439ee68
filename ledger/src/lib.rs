//! Vote ledger for the Rally engine.
//!
//! An append-only record of contributions with per-target books: each
//! campaign or tournament stage gets its own book holding immutable vote
//! records and incrementally maintained aggregates. Aggregates always equal
//! the sum of the records they summarize, and leaderboards are fully
//! deterministic (descending normalized total, ties by ascending project
//! identity).

pub mod book;
pub mod error;
pub mod ledger;
pub mod participation;
pub mod record;

pub use book::TargetBook;
pub use error::LedgerError;
pub use ledger::{LedgerSnapshot, VoteLedger};
pub use participation::Participation;
pub use record::{RecordKind, VoteRecord};
