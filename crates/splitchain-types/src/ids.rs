//! Globally unique identifiers used throughout SplitChain.
//!
//! Ledger entities (groups, expenses) carry contract-assigned numeric IDs.
//! Settlement artifacts are identified by 32-byte hashes, matching the
//! hash-lock wire format of the external venue. Attempt IDs use UUIDv7
//! for time-ordered lexicographic sorting.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// On-chain participant identity — a raw 20-byte account address.
///
/// Users have no attributes beyond their address; they are created lazily
/// on first reference in the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        format!("0x{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// GroupId / ExpenseId
// ---------------------------------------------------------------------------

/// Monotonically increasing group identifier assigned by the ledger contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group:{}", self.0)
    }
}

/// Monotonically increasing expense identifier assigned by the ledger contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ExpenseId(pub u64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expense:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TokenId / ChainId
// ---------------------------------------------------------------------------

/// Token identifier within a chain (symbol or asset address string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenId(pub String);

impl TokenId {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// EVM-style numeric chain identifier (e.g. 1 = mainnet, 8453 = Base).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// 32-byte hash identifiers
// ---------------------------------------------------------------------------

/// Receipt hash — the immutable identifier of a finalized [`crate::Settlement`].
///
/// Applying a settlement to a debt edge is idempotent per receipt hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ReceiptHash(pub [u8; 32]);

impl ReceiptHash {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ReceiptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rcpt:{}", hex::encode(&self.0[..8]))
    }
}

/// Intent hash — identifier of a pre-execution [`crate::SettlementIntent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct IntentHash(pub [u8; 32]);

impl IntentHash {
    /// Deterministic intent hash over the settlement commitment.
    ///
    /// Every replica derives the **exact same** intent hash for the same
    /// attempt, so the pre-commitment record is replay-stable.
    #[must_use]
    pub fn derive(
        group: GroupId,
        debtor: Address,
        creditor: Address,
        route: &str,
        attempt: AttemptId,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"splitchain:intent:v2:");
        hasher.update(group.0.to_le_bytes());
        hasher.update(debtor.0);
        hasher.update(creditor.0);
        hasher.update(route.as_bytes());
        hasher.update(attempt.0.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }
}

impl fmt::Display for IntentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "intent:{}", hex::encode(&self.0[..8]))
    }
}

/// Venue-assigned order hash for a submitted cross-chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderHash(pub [u8; 32]);

impl fmt::Display for OrderHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order:{}", hex::encode(&self.0[..8]))
    }
}

/// Destination-chain transaction hash of an executed settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx:{}", hex::encode(&self.0[..8]))
    }
}

/// SHA-256 hash of a single swap secret (one per fill).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SecretHash(pub [u8; 32]);

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sh:{}", hex::encode(&self.0[..8]))
    }
}

/// The lock commitment published with an order: a direct secret hash for
/// single-fill orders, or a Merkle root over all secret hashes for
/// multi-fill orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct HashLock(pub [u8; 32]);

impl fmt::Display for HashLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lock:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// AttemptId
// ---------------------------------------------------------------------------

/// Unique identifier for a single settlement attempt. Uses UUIDv7 for
/// time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AttemptId(pub Uuid);

impl AttemptId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// QuoteId
// ---------------------------------------------------------------------------

/// Opaque venue-assigned quote identifier, echoed back on order submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

impl QuoteId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quote:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_is_hex() {
        let addr = Address::from_bytes([0xAB; 20]);
        let s = format!("{addr}");
        assert!(s.starts_with("0xabab"));
        assert_eq!(s.len(), 2 + 40);
    }

    #[test]
    fn attempt_ids_are_unique() {
        let a = AttemptId::new();
        let b = AttemptId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn intent_hash_is_deterministic() {
        let attempt = AttemptId::new();
        let debtor = Address::from_bytes([1; 20]);
        let creditor = Address::from_bytes([2; 20]);
        let a = IntentHash::derive(GroupId(7), debtor, creditor, "base->arbitrum", attempt);
        let b = IntentHash::derive(GroupId(7), debtor, creditor, "base->arbitrum", attempt);
        assert_eq!(a, b);

        let c = IntentHash::derive(GroupId(8), debtor, creditor, "base->arbitrum", attempt);
        assert_ne!(a, c);
    }

    #[test]
    fn serde_roundtrips() {
        let addr = Address::from_bytes([3; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);

        let receipt = ReceiptHash::from_bytes([9; 32]);
        let json = serde_json::to_string(&receipt).unwrap();
        let back: ReceiptHash = serde_json::from_str(&json).unwrap();
        assert_eq!(receipt, back);

        let token = TokenId::new("USDC");
        let json = serde_json::to_string(&token).unwrap();
        let back: TokenId = serde_json::from_str(&json).unwrap();
        assert_eq!(token, back);
    }

    #[test]
    fn short_forms() {
        let addr = Address::from_bytes([0xCD; 20]);
        assert_eq!(addr.short(), "0xcdcdcdcd");

        let order = OrderHash([0x11; 32]);
        assert_eq!(format!("{order}"), "order:1111111111111111");
    }
}
