//! The external quote/matching venue boundary.
//!
//! The relayer-driven matching service is consumed through this trait only,
//! so tests can inject a scripted venue and the orchestrator never depends
//! on a concrete SDK. All responses are the typed records from
//! `splitchain_types::venue`, validated at the boundary.

use async_trait::async_trait;
use splitchain_types::{
    ChainId, OrderHash, OrderUpdate, Quote, QuoteId, QuoteRequest, Result, SecretHash, SwapOrder,
};

use crate::vault::Secret;

/// Operations consumed from the external settlement relayer.
#[async_trait]
pub trait MatchingVenue: Send + Sync {
    /// Request a price/route quote, including the recommended execution
    /// preset that determines fill count and timing.
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote>;

    /// Submit a hash-time-locked order built against a quote, together with
    /// the per-fill secret hashes. Returns the venue-assigned order hash.
    async fn submit_order(
        &self,
        src_chain: ChainId,
        order: &SwapOrder,
        quote_id: &QuoteId,
        secret_hashes: &[SecretHash],
    ) -> Result<OrderHash>;

    /// Poll the current order status.
    async fn order_status(&self, order: &OrderHash) -> Result<OrderUpdate>;

    /// Fill indices currently ready to accept their secret.
    async fn ready_fills(&self, order: &OrderHash) -> Result<Vec<u64>>;

    /// Reveal the secret for one fill.
    async fn submit_secret(&self, order: &OrderHash, index: u64, secret: Secret) -> Result<()>;
}
