//! Value normalizer for the Rally engine.
//!
//! Converts an amount of any supported token into a canonical base-unit
//! amount using an injected exchange-rate source. Normalization truncates,
//! never rounds up, so conversion can never create value.

pub mod error;
pub mod normalizer;
pub mod rate;
pub mod registry;

pub use error::OracleError;
pub use normalizer::Normalizer;
pub use rate::{FixedRateSource, RateSource};
pub use registry::TokenRegistry;
