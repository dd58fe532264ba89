//! Secret generation and hash-lock commitments for a settlement attempt.
//!
//! The vault holds the raw swap secrets, keyed by fill index, strictly for
//! the lifetime of one attempt. Raw secrets are never logged (the `Debug`
//! impl redacts) and never serialized; `sweep` drops them at session end.

use std::collections::HashMap;
use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use splitchain_types::{HashLock, Result, SecretHash, SplitchainError, constants};

/// A single 32-byte swap secret. Revealing it releases the matching fill.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Secret([u8; constants::SECRET_LEN]);

impl Secret {
    /// The wire bytes, handed to the venue on reveal.
    #[must_use]
    pub fn to_bytes(self) -> [u8; constants::SECRET_LEN] {
        self.0
    }

    /// SHA-256 of the secret — the per-fill hash-lock leaf.
    #[must_use]
    pub fn hash(&self) -> SecretHash {
        let digest = Sha256::digest(self.0);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        SecretHash(bytes)
    }
}

// Redacted: raw secrets must never reach log output.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(..)")
    }
}

/// Holds the secrets of one settlement attempt, keyed by fill index.
#[derive(Debug, Default)]
pub struct SecretVault {
    secrets: HashMap<u64, Secret>,
}

impl SecretVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate `n` independent secrets (replacing any previous set) and
    /// return their hashes in fill-index order.
    pub fn generate(&mut self, n: u32) -> Vec<SecretHash> {
        self.secrets.clear();
        let mut hashes = Vec::with_capacity(n as usize);
        for index in 0..u64::from(n) {
            let mut bytes = [0u8; constants::SECRET_LEN];
            OsRng.fill_bytes(&mut bytes);
            let secret = Secret(bytes);
            hashes.push(secret.hash());
            self.secrets.insert(index, secret);
        }
        hashes
    }

    /// The secret hashes in fill-index order.
    #[must_use]
    pub fn secret_hashes(&self) -> Vec<SecretHash> {
        let mut indices: Vec<_> = self.secrets.keys().copied().collect();
        indices.sort_unstable();
        indices.iter().map(|i| self.secrets[i].hash()).collect()
    }

    /// The lock commitment for the current secret set: a direct hash-lock
    /// of the sole secret for single-fill attempts, a Merkle root over all
    /// secret hashes for multi-fill attempts (enabling partial-fill proofs).
    ///
    /// # Errors
    /// Returns [`SplitchainError::EmptyVault`] if no secrets were generated.
    pub fn commitment(&self) -> Result<HashLock> {
        let hashes = self.secret_hashes();
        match hashes.as_slice() {
            [] => Err(SplitchainError::EmptyVault),
            [single] => Ok(HashLock(single.0)),
            many => Ok(HashLock(merkle_root(many))),
        }
    }

    /// The secret for a fill index.
    ///
    /// # Errors
    /// Returns [`SplitchainError::SecretNotFound`] if the index was never
    /// generated or the vault was already swept.
    pub fn reveal_for(&self, index: u64) -> Result<Secret> {
        self.secrets
            .get(&index)
            .copied()
            .ok_or(SplitchainError::SecretNotFound { index })
    }

    /// Drop all secrets at the end of the attempt.
    pub fn sweep(&mut self) {
        self.secrets.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

/// Merkle root over secret-hash leaves: pairwise SHA-256, odd node promoted.
fn merkle_root(leaves: &[SecretHash]) -> [u8; 32] {
    let mut level: Vec<[u8; 32]> = leaves.iter().map(|h| h.0).collect();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            match pair {
                [left, right] => {
                    let mut hasher = Sha256::new();
                    hasher.update(left);
                    hasher.update(right);
                    let digest = hasher.finalize();
                    let mut node = [0u8; 32];
                    node.copy_from_slice(&digest);
                    next.push(node);
                }
                [odd] => next.push(*odd),
                _ => unreachable!("chunks(2) yields 1 or 2 elements"),
            }
        }
        level = next;
    }
    level.first().copied().unwrap_or([0u8; 32])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_returns_hashes_of_held_secrets() {
        let mut vault = SecretVault::new();
        let hashes = vault.generate(3);
        assert_eq!(hashes.len(), 3);
        assert_eq!(vault.len(), 3);

        for (i, hash) in hashes.iter().enumerate() {
            let secret = vault.reveal_for(i as u64).unwrap();
            assert_eq!(secret.hash(), *hash);
        }
    }

    #[test]
    fn secrets_are_independent() {
        let mut vault = SecretVault::new();
        let hashes = vault.generate(4);
        for i in 0..hashes.len() {
            for j in (i + 1)..hashes.len() {
                assert_ne!(hashes[i], hashes[j]);
            }
        }
    }

    #[test]
    fn single_fill_commitment_is_plain_hash_lock() {
        let mut vault = SecretVault::new();
        let hashes = vault.generate(1);
        let lock = vault.commitment().unwrap();
        assert_eq!(lock.0, hashes[0].0);
    }

    #[test]
    fn multi_fill_commitment_is_merkle_root() {
        let mut vault = SecretVault::new();
        let hashes = vault.generate(3);
        let lock = vault.commitment().unwrap();

        // The root is not any single leaf.
        for leaf in &hashes {
            assert_ne!(lock.0, leaf.0);
        }
        // And it is reproducible from the same leaves.
        assert_eq!(lock.0, merkle_root(&hashes));
    }

    #[test]
    fn empty_vault_has_no_commitment() {
        let vault = SecretVault::new();
        let err = vault.commitment().unwrap_err();
        assert!(matches!(err, SplitchainError::EmptyVault));
    }

    #[test]
    fn reveal_unknown_index_fails() {
        let mut vault = SecretVault::new();
        vault.generate(2);
        let err = vault.reveal_for(5).unwrap_err();
        assert!(matches!(err, SplitchainError::SecretNotFound { index: 5 }));
    }

    #[test]
    fn sweep_drops_all_secrets() {
        let mut vault = SecretVault::new();
        vault.generate(2);
        vault.sweep();
        assert!(vault.is_empty());

        let err = vault.reveal_for(0).unwrap_err();
        assert!(matches!(err, SplitchainError::SecretNotFound { index: 0 }));
    }

    #[test]
    fn debug_never_prints_secret_bytes() {
        let mut vault = SecretVault::new();
        vault.generate(1);
        let secret = vault.reveal_for(0).unwrap();
        assert_eq!(format!("{secret:?}"), "Secret(..)");

        let printed = format!("{vault:?}");
        assert!(!printed.contains(&hex_of(&secret.to_bytes())));
    }

    #[test]
    fn merkle_root_order_matters() {
        let a = SecretHash([1; 32]);
        let b = SecretHash([2; 32]);
        assert_ne!(merkle_root(&[a, b]), merkle_root(&[b, a]));
    }

    #[test]
    fn merkle_root_promotes_odd_leaf() {
        let a = SecretHash([1; 32]);
        let b = SecretHash([2; 32]);
        let c = SecretHash([3; 32]);
        // Three leaves: root(hash(a,b), c) — distinct from two-leaf root.
        assert_ne!(merkle_root(&[a, b, c]), merkle_root(&[a, b]));
    }

    fn hex_of(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}
