//! proof-scoping roots a withdrawal may reference
//!
//! admin-curated allowlist; roots are appended, never removed

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ROOT_DOMAIN;

/// root - admin-registered scoping value withdrawal proofs must
/// reference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Root(pub [u8; 32]);

impl Root {
    /// derive a root from a label (test and demo convenience; real
    /// roots come from whatever builds the proof scope)
    pub fn derive(label: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ROOT_DOMAIN);
        hasher.update(label);
        Self(*hasher.finalize().as_bytes())
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Root {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// registered-root allowlist
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RootRegistry {
    roots: HashSet<Root>,
}

impl RootRegistry {
    pub fn new() -> Self {
        Self {
            roots: HashSet::new(),
        }
    }

    /// append a root
    ///
    /// registering a known root is a benign no-op; returns false so
    /// admin tooling can still see it happened
    pub fn register(&mut self, root: Root) -> bool {
        let inserted = self.roots.insert(root);
        if !inserted {
            tracing::debug!("root {} already registered", root);
        }
        inserted
    }

    pub fn is_registered(&self, root: &Root) -> bool {
        self.roots.contains(root)
    }

    /// number of registered roots
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_check() {
        let mut registry = RootRegistry::new();
        let root = Root::derive(b"epoch-1");

        assert!(!registry.is_registered(&root));
        assert!(registry.register(root));
        assert!(registry.is_registered(&root));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reregistration_is_noop() {
        let mut registry = RootRegistry::new();
        let root = Root([3u8; 32]);

        assert!(registry.register(root));
        assert!(!registry.register(root));
        assert!(registry.is_registered(&root));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregistered_root() {
        let registry = RootRegistry::new();
        assert!(!registry.is_registered(&Root([5u8; 32])));
    }
}
