//! Typed records for the external quote/matching venue.
//!
//! The venue SDK exposes loosely shaped objects; everything crossing that
//! boundary is validated against these explicit records instead of trusting
//! ambient structure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Address, ChainId, HashLock, QuoteId, ReceiptHash, Result, SplitchainError, TokenId, TxHash,
};

// ---------------------------------------------------------------------------
// QuoteRequest / Quote / Preset
// ---------------------------------------------------------------------------

/// Everything the venue needs to price a cross-chain swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Amount to swap, in the source token's smallest unit.
    pub amount: u128,
    pub src_chain: ChainId,
    pub src_token: TokenId,
    pub dst_chain: ChainId,
    pub dst_token: TokenId,
    /// The debtor paying on the source chain.
    pub sender: Address,
    /// The creditor receiving on the destination chain.
    pub recipient: Address,
}

/// An execution preset recommended by the venue. Determines how many
/// partial fills (and thus secrets) the order uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Number of partial fills; each fill releases against one secret.
    pub fill_count: u32,
    /// Venue-side auction duration for this preset.
    pub auction_duration_secs: u64,
}

/// A price/route quote from the venue for a cross-chain swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub quote_id: QuoteId,
    /// Amount taken on the source chain, smallest unit.
    pub src_amount: u128,
    /// Amount delivered on the destination chain, smallest unit.
    pub dst_amount: u128,
    pub recommended_preset: Preset,
}

impl Quote {
    /// Boundary validation of a venue-supplied quote.
    ///
    /// # Errors
    /// Returns [`SplitchainError::InvalidVenueResponse`] on a structurally
    /// unusable quote (zero fills, zero destination amount).
    pub fn validate(&self) -> Result<()> {
        if self.recommended_preset.fill_count == 0 {
            return Err(SplitchainError::InvalidVenueResponse {
                reason: "quote preset has zero fill count".into(),
            });
        }
        if self.dst_amount == 0 {
            return Err(SplitchainError::InvalidVenueResponse {
                reason: "quote has zero destination amount".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SwapOrder
// ---------------------------------------------------------------------------

/// A destination-receiver-scoped hash-time-locked order, built locally and
/// submitted to the venue together with the quote ID and secret hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOrder {
    /// The debtor paying on the source chain.
    pub maker: Address,
    /// The creditor receiving on the destination chain.
    pub receiver: Address,
    pub src_chain: ChainId,
    pub src_token: TokenId,
    pub src_amount: u128,
    pub dst_chain: ChainId,
    pub dst_token: TokenId,
    /// Minimum acceptable delivery, taken from the quote.
    pub min_dst_amount: u128,
    /// Secret-hash commitment: direct hash for one fill, Merkle root otherwise.
    pub lock: HashLock,
    pub fill_count: u32,
}

// ---------------------------------------------------------------------------
// OrderUpdate
// ---------------------------------------------------------------------------

/// Venue-reported lifecycle phase of a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderPhase {
    Pending,
    Executed,
    Expired,
    Cancelled,
}

impl fmt::Display for OrderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Executed => write!(f, "executed"),
            Self::Expired => write!(f, "expired"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One order-status poll result from the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub phase: OrderPhase,
    /// Destination transaction hash, present once executed.
    pub dst_tx_hash: Option<TxHash>,
    /// Settlement receipt hash, present once executed.
    pub receipt_hash: Option<ReceiptHash>,
}

impl OrderUpdate {
    #[must_use]
    pub fn pending() -> Self {
        Self {
            phase: OrderPhase::Pending,
            dst_tx_hash: None,
            receipt_hash: None,
        }
    }

    /// Boundary validation: an `executed` update must carry the receipt
    /// hash and destination transaction hash.
    ///
    /// # Errors
    /// Returns [`SplitchainError::InvalidVenueResponse`] if either is missing.
    pub fn validate(&self) -> Result<()> {
        if self.phase == OrderPhase::Executed
            && (self.dst_tx_hash.is_none() || self.receipt_hash.is_none())
        {
            return Err(SplitchainError::InvalidVenueResponse {
                reason: "executed update missing receipt or destination tx hash".into(),
            });
        }
        Ok(())
    }
}
