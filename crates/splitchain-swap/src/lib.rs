//! # splitchain-swap
//!
//! **Settlement plane**: converts a netted debt into an actual cross-chain
//! token transfer using a hash-time-locked order against an external
//! quote/matching venue.
//!
//! ## Flow
//!
//! ```text
//! Quoting -> OrderSubmitted -> Monitoring -> {Completed | Expired | Cancelled | TimedOut}
//! ```
//!
//! 1. Request a quote and adopt its recommended execution preset
//! 2. Generate one secret per fill, derive the hash-lock commitment,
//!    submit the order with the secret hashes
//! 3. Poll order status on a fixed interval; reveal each secret exactly
//!    once as its fill becomes ready to accept it
//! 4. Report the venue-decided terminal state; a poll ceiling bounds the
//!    attempt and surfaces `TimedOut` for manual reconciliation
//!
//! Secrets live in the [`SecretVault`] only for the duration of the attempt
//! and are never logged or persisted.

pub mod orchestrator;
pub mod vault;
pub mod venue;

pub use orchestrator::{AttemptState, CancelHandle, SettlementOrchestrator, SwapOutcome, SwapParams};
pub use vault::{Secret, SecretVault};
pub use venue::MatchingVenue;
