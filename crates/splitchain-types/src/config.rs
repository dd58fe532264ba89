//! Configuration types for the settlement orchestrator and routing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{ChainId, Result, SplitchainError, TokenId, constants};

/// Timing and retry configuration for a settlement attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SwapConfig {
    /// Interval between order-status polls, milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum number of polls before the attempt is reported `TimedOut`.
    pub max_poll_attempts: u32,
    /// Local retries for a failed order submission.
    pub submit_retries: u32,
    /// Backoff before a submission retry, milliseconds.
    pub submit_backoff_ms: u64,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: constants::DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: constants::DEFAULT_MAX_POLL_ATTEMPTS,
            submit_retries: constants::DEFAULT_SUBMIT_RETRIES,
            submit_backoff_ms: constants::DEFAULT_SUBMIT_BACKOFF_MS,
        }
    }
}

/// One concrete cross-chain path for settling a token's debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRoute {
    /// Chain the debtor pays on.
    pub src_chain: ChainId,
    /// Token spent on the source chain.
    pub src_token: TokenId,
    /// Chain the creditor receives on.
    pub dst_chain: ChainId,
    /// Token delivered on the destination chain.
    pub dst_token: TokenId,
}

impl SwapRoute {
    /// Human-readable route label, recorded on settlement intents.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{}:{}->{}:{}",
            self.src_chain.0, self.src_token, self.dst_chain.0, self.dst_token
        )
    }
}

/// Maps a ledger token to the cross-chain route used to settle it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteBook {
    routes: HashMap<TokenId, SwapRoute>,
}

impl RouteBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: TokenId, route: SwapRoute) {
        self.routes.insert(token, route);
    }

    /// Resolve the route for a ledger token.
    ///
    /// # Errors
    /// Returns [`SplitchainError::Internal`] if no route is configured —
    /// settling a token with no route is a deployment misconfiguration.
    pub fn resolve(&self, token: &TokenId) -> Result<&SwapRoute> {
        self.routes
            .get(token)
            .ok_or_else(|| SplitchainError::Internal(format!("no route configured for {token}")))
    }
}
