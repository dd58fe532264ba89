//! The settlement attempt state machine.
//!
//! One orchestrator drives exactly one attempt:
//!
//! ```text
//! Quoting -> OrderSubmitted -> Monitoring -> {Completed | Expired | Cancelled | TimedOut}
//!     \______________________________________________________________-> Failed
//! ```
//!
//! Terminal states are final. `Completed` is the only state from which the
//! coordinator proceeds to record `SettlementFinalized`. `TimedOut` means
//! the poll ceiling was reached and the attempt needs manual reconciliation —
//! it is never conflated with `Failed`.
//!
//! Per-attempt state (secrets, revealed indices, poll counters) lives in
//! this owned context, so concurrent attempts on distinct edges are safe.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use splitchain_types::{
    Address, AttemptId, OrderHash, OrderPhase, Quote, QuoteRequest, ReceiptHash, Result,
    SplitchainError, SwapConfig, SwapOrder, SwapRoute, TxHash,
};

use crate::vault::SecretVault;
use crate::venue::MatchingVenue;

// ---------------------------------------------------------------------------
// States and outcomes
// ---------------------------------------------------------------------------

/// Lifecycle state of a settlement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Quoting,
    OrderSubmitted,
    Monitoring,
    Completed,
    Expired,
    Cancelled,
    TimedOut,
    Failed,
}

impl AttemptState {
    /// Whether no transition can leave this state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Expired | Self::Cancelled | Self::TimedOut | Self::Failed
        )
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Quoting => "QUOTING",
            Self::OrderSubmitted => "ORDER_SUBMITTED",
            Self::Monitoring => "MONITORING",
            Self::Completed => "COMPLETED",
            Self::Expired => "EXPIRED",
            Self::Cancelled => "CANCELLED",
            Self::TimedOut => "TIMED_OUT",
            Self::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

/// Venue-decided terminal outcome of an attempt that got an order on book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The order executed; the coordinator may finalize the ledger.
    Completed {
        order_hash: OrderHash,
        receipt_hash: ReceiptHash,
        dst_tx_hash: TxHash,
    },
    /// The venue reported the order expired.
    Expired { order_hash: OrderHash },
    /// The venue reported the order cancelled.
    Cancelled { order_hash: OrderHash },
    /// The poll ceiling was reached with the order still pending.
    /// Needs manual reconciliation — the ledger must not be touched.
    TimedOut { order_hash: OrderHash, polls: u32 },
}

/// Concrete parameters of one attempt, resolved by the coordinator before
/// initiation. The amount is snapshotted here and never re-read mid-flight.
#[derive(Debug, Clone)]
pub struct SwapParams {
    /// Amount to settle, in the source token's smallest unit.
    pub amount: u128,
    pub route: SwapRoute,
    /// Debtor address, paying on the source chain.
    pub sender: Address,
    /// Creditor address, receiving on the destination chain.
    pub recipient: Address,
}

impl SwapParams {
    fn quote_request(&self) -> QuoteRequest {
        QuoteRequest {
            amount: self.amount,
            src_chain: self.route.src_chain,
            src_token: self.route.src_token.clone(),
            dst_chain: self.route.dst_chain,
            dst_token: self.route.dst_token.clone(),
            sender: self.sender,
            recipient: self.recipient,
        }
    }
}

/// Cooperative cancellation for an attempt in `Monitoring`.
///
/// Cancelling suppresses further secret reveals; the local machine keeps
/// observing until the venue itself reports `cancelled` or `expired` (it
/// never forces on-chain cancellation).
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // Receiver alive as long as the orchestrator is; send can't fail
        // in a way we care about once the attempt is already terminal.
        let _ = self.tx.send(true);
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives a single settlement attempt through quote, order submission, and
/// secret-release monitoring.
pub struct SettlementOrchestrator {
    attempt_id: AttemptId,
    config: SwapConfig,
    vault: SecretVault,
    state: AttemptState,
    /// Fill indices already revealed — a secret is never resubmitted.
    revealed: HashSet<u64>,
    cancel_rx: watch::Receiver<bool>,
    cancel_tx: watch::Sender<bool>,
}

impl SettlementOrchestrator {
    #[must_use]
    pub fn new(config: SwapConfig) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Self {
            attempt_id: AttemptId::new(),
            config,
            vault: SecretVault::new(),
            state: AttemptState::Quoting,
            revealed: HashSet::new(),
            cancel_rx,
            cancel_tx,
        }
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Number of fills whose secret has been revealed so far.
    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    /// Handle for cancelling this attempt from outside.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    /// Run the attempt to a terminal state.
    ///
    /// # Errors
    /// Quote and submission failures (after the local retry budget) are
    /// fatal to this attempt: the state is set to `Failed` and the error is
    /// returned. Retrying means the caller starts a fresh attempt.
    pub async fn execute(
        &mut self,
        venue: &dyn MatchingVenue,
        params: &SwapParams,
    ) -> Result<SwapOutcome> {
        if self.state != AttemptState::Quoting {
            return Err(SplitchainError::AttemptFailed {
                reason: format!("attempt already ran to {}", self.state),
            });
        }

        let quote = match self.request_quote(venue, params).await {
            Ok(quote) => quote,
            Err(err) => return self.fail(err),
        };

        let order_hash = match self.submit_order(venue, params, &quote).await {
            Ok(hash) => hash,
            Err(err) => return self.fail(err),
        };

        let outcome = self.monitor(venue, order_hash).await;
        // Session end: secrets never outlive the attempt.
        self.vault.sweep();
        outcome
    }

    async fn request_quote(
        &mut self,
        venue: &dyn MatchingVenue,
        params: &SwapParams,
    ) -> Result<Quote> {
        debug!(attempt = %self.attempt_id, amount = params.amount, route = %params.route.label(), "requesting quote");
        let quote = venue.get_quote(&params.quote_request()).await?;
        quote.validate()?;
        info!(
            attempt = %self.attempt_id,
            quote = %quote.quote_id,
            fills = quote.recommended_preset.fill_count,
            "quote received"
        );
        Ok(quote)
    }

    async fn submit_order(
        &mut self,
        venue: &dyn MatchingVenue,
        params: &SwapParams,
        quote: &Quote,
    ) -> Result<OrderHash> {
        let fill_count = quote.recommended_preset.fill_count;
        let secret_hashes = self.vault.generate(fill_count);
        let lock = self.vault.commitment()?;

        let order = SwapOrder {
            maker: params.sender,
            receiver: params.recipient,
            src_chain: params.route.src_chain,
            src_token: params.route.src_token.clone(),
            src_amount: quote.src_amount,
            dst_chain: params.route.dst_chain,
            dst_token: params.route.dst_token.clone(),
            min_dst_amount: quote.dst_amount,
            lock,
            fill_count,
        };

        let mut tries = 0;
        loop {
            match venue
                .submit_order(params.route.src_chain, &order, &quote.quote_id, &secret_hashes)
                .await
            {
                Ok(order_hash) => {
                    self.state = AttemptState::OrderSubmitted;
                    info!(attempt = %self.attempt_id, %order_hash, fills = fill_count, "order submitted");
                    return Ok(order_hash);
                }
                Err(err) if tries < self.config.submit_retries => {
                    tries += 1;
                    warn!(attempt = %self.attempt_id, %err, retry = tries, "order submission failed, retrying");
                    sleep(Duration::from_millis(self.config.submit_backoff_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn monitor(
        &mut self,
        venue: &dyn MatchingVenue,
        order_hash: OrderHash,
    ) -> Result<SwapOutcome> {
        self.state = AttemptState::Monitoring;

        for poll in 1..=self.config.max_poll_attempts {
            let update = match venue.order_status(&order_hash).await {
                Ok(update) => update,
                Err(err) => {
                    // A single poll failure is retried on the next cycle.
                    warn!(attempt = %self.attempt_id, %order_hash, %err, poll, "status poll failed");
                    sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
                    continue;
                }
            };
            if let Err(err) = update.validate() {
                return self.fail(err);
            }

            match update.phase {
                OrderPhase::Executed => {
                    self.state = AttemptState::Completed;
                    // Presence guaranteed by validate(), but never unwrap.
                    let (Some(dst_tx_hash), Some(receipt_hash)) =
                        (update.dst_tx_hash, update.receipt_hash)
                    else {
                        return self.fail(SplitchainError::InvalidVenueResponse {
                            reason: "executed update missing hashes".into(),
                        });
                    };
                    info!(attempt = %self.attempt_id, %order_hash, %receipt_hash, "order executed");
                    return Ok(SwapOutcome::Completed {
                        order_hash,
                        receipt_hash,
                        dst_tx_hash,
                    });
                }
                OrderPhase::Expired => {
                    self.state = AttemptState::Expired;
                    warn!(attempt = %self.attempt_id, %order_hash, "order expired");
                    return Ok(SwapOutcome::Expired { order_hash });
                }
                OrderPhase::Cancelled => {
                    self.state = AttemptState::Cancelled;
                    warn!(attempt = %self.attempt_id, %order_hash, "order cancelled");
                    return Ok(SwapOutcome::Cancelled { order_hash });
                }
                OrderPhase::Pending => {
                    if *self.cancel_rx.borrow() {
                        // Cancel requested: stop revealing, keep observing.
                        debug!(attempt = %self.attempt_id, poll, "cancel requested, reveals suppressed");
                    } else {
                        self.reveal_ready_fills(venue, &order_hash).await;
                    }
                }
            }

            sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
        }

        self.state = AttemptState::TimedOut;
        warn!(
            attempt = %self.attempt_id,
            %order_hash,
            polls = self.config.max_poll_attempts,
            "poll ceiling reached, needs manual reconciliation"
        );
        Ok(SwapOutcome::TimedOut {
            order_hash,
            polls: self.config.max_poll_attempts,
        })
    }

    /// Reveal the secret for every ready fill not yet revealed. A failure
    /// for one index is logged and retried on the next poll cycle; it does
    /// not abort monitoring of other indices.
    async fn reveal_ready_fills(&mut self, venue: &dyn MatchingVenue, order_hash: &OrderHash) {
        let ready = match venue.ready_fills(order_hash).await {
            Ok(ready) => ready,
            Err(err) => {
                warn!(attempt = %self.attempt_id, %order_hash, %err, "ready-fill query failed");
                return;
            }
        };

        for index in ready {
            if self.revealed.contains(&index) {
                continue;
            }
            let secret = match self.vault.reveal_for(index) {
                Ok(secret) => secret,
                Err(err) => {
                    // Venue asked for a fill we never committed to.
                    warn!(attempt = %self.attempt_id, %order_hash, index, %err, "no secret for ready fill");
                    continue;
                }
            };
            match venue.submit_secret(order_hash, index, secret).await {
                Ok(()) => {
                    self.revealed.insert(index);
                    info!(attempt = %self.attempt_id, %order_hash, index, "secret revealed");
                }
                Err(err) => {
                    warn!(attempt = %self.attempt_id, %order_hash, index, %err, "secret submission failed, will retry");
                }
            }
        }
    }

    fn fail<T>(&mut self, err: SplitchainError) -> Result<T> {
        self.state = AttemptState::Failed;
        warn!(attempt = %self.attempt_id, %err, "attempt failed");
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        for state in [
            AttemptState::Completed,
            AttemptState::Expired,
            AttemptState::Cancelled,
            AttemptState::TimedOut,
            AttemptState::Failed,
        ] {
            assert!(state.is_terminal(), "{state} should be terminal");
        }
        for state in [
            AttemptState::Quoting,
            AttemptState::OrderSubmitted,
            AttemptState::Monitoring,
        ] {
            assert!(!state.is_terminal(), "{state} should not be terminal");
        }
    }

    #[test]
    fn state_display() {
        assert_eq!(format!("{}", AttemptState::TimedOut), "TIMED_OUT");
        assert_eq!(format!("{}", AttemptState::OrderSubmitted), "ORDER_SUBMITTED");
    }

    #[test]
    fn new_orchestrator_starts_quoting() {
        let orch = SettlementOrchestrator::new(SwapConfig::default());
        assert_eq!(orch.state(), AttemptState::Quoting);
        assert_eq!(orch.revealed_count(), 0);
    }
}
