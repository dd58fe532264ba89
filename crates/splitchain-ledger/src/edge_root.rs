//! Deterministic digest of a debt-edge set.
//!
//! Replaying the same event history must reproduce the edge set exactly.
//! The `edge_root` is a SHA-256 digest over the sorted edge set that lets
//! replicas and replays be compared cheaply without diffing full payloads.

use sha2::{Digest, Sha256};
use splitchain_types::{DebtEdge, EdgeKey};

/// Compute the root hash over a set of edges.
///
/// Edges are sorted by key before hashing, so the digest is independent of
/// map iteration order. The same edge set always produces the same root.
#[must_use]
pub fn compute_edge_root<'a>(edges: impl IntoIterator<Item = (&'a EdgeKey, &'a DebtEdge)>) -> [u8; 32] {
    let mut sorted: Vec<(&EdgeKey, &DebtEdge)> = edges.into_iter().collect();
    sorted.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut hasher = Sha256::new();
    hasher.update(b"splitchain:edge_root:v2:");
    hasher.update((sorted.len() as u64).to_le_bytes());

    for (key, edge) in sorted {
        hasher.update(key.group.0.to_le_bytes());
        hasher.update(key.debtor.0);
        hasher.update(key.creditor.0);
        hasher.update((key.token.0.len() as u64).to_le_bytes());
        hasher.update(key.token.0.as_bytes());
        hasher.update(edge.amount.to_le_bytes());
    }

    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}

/// Verify that a given edge root matches the expected hash.
#[must_use]
pub fn verify_edge_root<'a>(
    edges: impl IntoIterator<Item = (&'a EdgeKey, &'a DebtEdge)>,
    expected_root: &[u8; 32],
) -> bool {
    compute_edge_root(edges) == *expected_root
}
