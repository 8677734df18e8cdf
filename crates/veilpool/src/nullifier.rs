//! nullifiers preventing double withdrawal
//!
//! a nullifier is published when a deposit is withdrawn
//! if it is already in the consumed set, the withdrawal is rejected

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};
use crate::NULLIFIER_DOMAIN;

/// nullifier - one-time-use withdrawal authorization handle
///
/// derived from the depositor secret, so only the owner can compute
/// it, and each deposit has exactly one nullifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nullifier(pub [u8; 32]);

impl Nullifier {
    /// derive nullifier from a depositor secret
    pub fn derive(secret: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(NULLIFIER_DOMAIN);
        hasher.update(secret);
        Self(*hasher.finalize().as_bytes())
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Nullifier {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Nullifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// consumed-nullifier set
///
/// membership means the nullifier authorized a withdrawal already;
/// absence means unconsumed
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NullifierSet {
    nullifiers: HashSet<Nullifier>,
}

impl NullifierSet {
    pub fn new() -> Self {
        Self {
            nullifiers: HashSet::new(),
        }
    }

    /// mark a nullifier consumed
    ///
    /// fails if it was already consumed (double-withdrawal attempt)
    pub fn consume(&mut self, nullifier: Nullifier) -> Result<()> {
        if !self.nullifiers.insert(nullifier) {
            return Err(PoolError::NullifierUsed(nullifier));
        }
        Ok(())
    }

    /// rollback for an aborted withdrawal
    ///
    /// returns true if the nullifier was consumed and is now released
    pub(crate) fn unconsume(&mut self, nullifier: &Nullifier) -> bool {
        self.nullifiers.remove(nullifier)
    }

    /// check if a nullifier was consumed
    pub fn is_used(&self, nullifier: &Nullifier) -> bool {
        self.nullifiers.contains(nullifier)
    }

    /// number of consumed nullifiers
    pub fn len(&self) -> usize {
        self.nullifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nullifiers.is_empty()
    }
}
