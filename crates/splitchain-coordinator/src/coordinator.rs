//! Settlement coordination: one edge, one attempt, one ledger write.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{info, warn};

use splitchain_ledger::BalanceEngine;
use splitchain_swap::{
    AttemptState, MatchingVenue, SettlementOrchestrator, SwapOutcome, SwapParams,
};
use splitchain_types::{
    AttemptId, EdgeKey, GroupId, IntentHash, LedgerEvent, ReceiptHash, Result, RouteBook,
    SplitchainError, SwapConfig, TxHash,
};

use crate::event_log::EventLog;

/// What one settlement attempt ended as, for the caller's bookkeeping.
///
/// `state == Completed` iff `receipt_hash` and `dst_tx_hash` are present and
/// a `SettlementFinalized` event was appended.
#[derive(Debug, Clone)]
pub struct SettlementReport {
    pub attempt_id: AttemptId,
    pub intent_hash: IntentHash,
    pub state: AttemptState,
    /// Amount the attempt tried to settle, snapshotted at initiation.
    pub amount: u128,
    pub receipt_hash: Option<ReceiptHash>,
    pub dst_tx_hash: Option<TxHash>,
}

/// Drives settlement of debt edges against a matching venue.
///
/// The coordinator never holds balances of its own: the outstanding amount
/// is re-derived from the event log at initiation, and the log is appended
/// to only when the venue confirms execution. A second concurrent attempt
/// on the same edge is rejected with [`SplitchainError::AttemptInProgress`].
pub struct SettlementCoordinator {
    log: Arc<dyn EventLog>,
    venue: Arc<dyn MatchingVenue>,
    routes: RouteBook,
    config: SwapConfig,
    /// Edges with an attempt currently in flight.
    active: Mutex<HashSet<EdgeKey>>,
}

/// Removes the edge from the active set when the attempt ends, on every
/// path out of `settle_edge` including early error returns.
struct ActiveEdgeGuard<'a> {
    active: &'a Mutex<HashSet<EdgeKey>>,
    key: EdgeKey,
}

impl Drop for ActiveEdgeGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            active.remove(&self.key);
        }
    }
}

impl SettlementCoordinator {
    #[must_use]
    pub fn new(
        log: Arc<dyn EventLog>,
        venue: Arc<dyn MatchingVenue>,
        routes: RouteBook,
        config: SwapConfig,
    ) -> Self {
        Self {
            log,
            venue,
            routes,
            config,
            active: Mutex::new(HashSet::new()),
        }
    }

    /// Whether an attempt is currently in flight for the edge.
    #[must_use]
    pub fn is_settling(&self, key: &EdgeKey) -> bool {
        self.active
            .lock()
            .map(|active| active.contains(key))
            .unwrap_or(false)
    }

    /// Open edges of a group with their outstanding amounts, re-derived
    /// from the event log. The caller picks which edge to settle.
    ///
    /// # Errors
    /// Fails if the event log cannot be read.
    pub async fn candidate_edges(&self, group: GroupId) -> Result<Vec<(EdgeKey, u128)>> {
        let events = self.log.group_events(group).await?;
        let engine = BalanceEngine::project(&events);
        Ok(engine
            .open_edges()
            .map(|(key, edge)| (key.clone(), edge.amount))
            .collect())
    }

    /// Settle one debt edge end to end.
    ///
    /// Records `SettlementIntentCreated` before the order goes out, runs a
    /// single attempt, and appends `SettlementFinalized` only if the venue
    /// reports execution. Every non-`Completed` terminal state leaves the
    /// ledger untouched and is returned in the report.
    ///
    /// # Errors
    /// - [`SplitchainError::AttemptInProgress`] if the edge already has an
    ///   attempt in flight
    /// - [`SplitchainError::UnknownEdge`] if the projection has no such edge
    /// - [`SplitchainError::NothingToSettle`] if the edge is fully settled
    /// - quote/submission failures surfaced from the attempt itself
    pub async fn settle_edge(&self, key: &EdgeKey) -> Result<SettlementReport> {
        let _guard = self.claim_edge(key)?;

        // Snapshot the outstanding amount; it is not re-read mid-flight.
        let events = self.log.group_events(key.group).await?;
        let engine = BalanceEngine::project(&events);
        let Some(edge) = engine.edge(key) else {
            return Err(SplitchainError::UnknownEdge(key.clone()));
        };
        let amount = edge.amount;
        if amount == 0 {
            return Err(SplitchainError::NothingToSettle(key.clone()));
        }

        let route = self.routes.resolve(&key.token)?.clone();
        let mut orchestrator = SettlementOrchestrator::new(self.config);
        let attempt_id = orchestrator.attempt_id();
        let intent_hash = IntentHash::derive(
            key.group,
            key.debtor,
            key.creditor,
            &route.label(),
            attempt_id,
        );

        // The intent goes on record before any venue interaction, so an
        // attempt that dies mid-flight is still visible in the log.
        self.log
            .append(LedgerEvent::SettlementIntentCreated {
                intent_hash,
                group_id: key.group,
                debtor: key.debtor,
                creditor: key.creditor,
                route: route.label(),
                created_at: Utc::now(),
            })
            .await?;

        info!(edge = %key, %intent_hash, amount, "settlement attempt initiated");

        let params = SwapParams {
            amount,
            route: route.clone(),
            sender: key.debtor,
            recipient: key.creditor,
        };

        let outcome = orchestrator.execute(self.venue.as_ref(), &params).await?;

        let mut report = SettlementReport {
            attempt_id,
            intent_hash,
            state: orchestrator.state(),
            amount,
            receipt_hash: None,
            dst_tx_hash: None,
        };

        match outcome {
            SwapOutcome::Completed {
                receipt_hash,
                dst_tx_hash,
                ..
            } => {
                self.log
                    .append(LedgerEvent::SettlementFinalized {
                        receipt_hash,
                        group_id: key.group,
                        debtor: key.debtor,
                        creditor: key.creditor,
                        token: key.token.clone(),
                        amount,
                        dst_chain: route.dst_chain,
                        dst_tx_hash,
                        finalized_at: Utc::now(),
                    })
                    .await?;
                info!(edge = %key, %receipt_hash, amount, "settlement finalized");
                report.receipt_hash = Some(receipt_hash);
                report.dst_tx_hash = Some(dst_tx_hash);
            }
            SwapOutcome::Expired { order_hash } | SwapOutcome::Cancelled { order_hash } => {
                warn!(edge = %key, %order_hash, state = %report.state, "attempt ended without execution");
            }
            SwapOutcome::TimedOut { order_hash, polls } => {
                warn!(edge = %key, %order_hash, polls, "attempt timed out, needs manual reconciliation");
            }
        }

        Ok(report)
    }

    fn claim_edge(&self, key: &EdgeKey) -> Result<ActiveEdgeGuard<'_>> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| SplitchainError::Internal("active-edge lock poisoned".into()))?;
        if !active.insert(key.clone()) {
            return Err(SplitchainError::AttemptInProgress(key.clone()));
        }
        Ok(ActiveEdgeGuard {
            active: &self.active,
            key: key.clone(),
        })
    }
}
