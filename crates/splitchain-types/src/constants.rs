//! System-wide constants for the SplitChain settlement engine.

/// Length of a swap secret in bytes.
pub const SECRET_LEN: usize = 32;

/// Default interval between order-status polls in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Default maximum number of status polls before an attempt times out
/// (120 polls x 5 s = 10 minute ceiling).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 120;

/// Default number of local retries for order submission.
pub const DEFAULT_SUBMIT_RETRIES: u32 = 1;

/// Default backoff before retrying a failed order submission, milliseconds.
pub const DEFAULT_SUBMIT_BACKOFF_MS: u64 = 2_000;

/// Receipt idempotency cache size (number of receipt hashes to remember).
pub const RECEIPT_IDEMPOTENCY_CACHE_SIZE: usize = 500_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "SplitChain";
