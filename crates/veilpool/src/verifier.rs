//! boundary to the withdrawal proof verifier
//!
//! the proof system itself is external; the ledger only sees an
//! opaque accept/reject answer over fixed-order public inputs

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nullifier::Nullifier;
use crate::roots::Root;
use crate::value::Amount;
use crate::INPUTS_DOMAIN;

/// opaque proof material, three parts as produced by the prover
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub a: Vec<u8>,
    pub b: Vec<u8>,
    pub c: Vec<u8>,
}

impl Proof {
    /// empty placeholder for scaffolding verifiers
    pub fn empty() -> Self {
        Self {
            a: Vec::new(),
            b: Vec::new(),
            c: Vec::new(),
        }
    }
}

/// public inputs a withdrawal proof commits to
///
/// field order is fixed: root, nullifier hash, amount; the encoding
/// below is versioned by its domain tag and changing the order means
/// a new tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicInputs {
    pub root: Root,
    pub nullifier_hash: Nullifier,
    pub amount: Amount,
}

impl PublicInputs {
    /// canonical byte encoding, in declared field order
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(INPUTS_DOMAIN.len() + 72);
        bytes.extend_from_slice(INPUTS_DOMAIN);
        bytes.extend_from_slice(&self.root.0);
        bytes.extend_from_slice(&self.nullifier_hash.0);
        bytes.extend_from_slice(&self.amount.0.to_le_bytes());
        bytes
    }

    /// digest of the canonical encoding
    pub fn digest(&self) -> [u8; 32] {
        *blake3::hash(&self.to_bytes()).as_bytes()
    }
}

/// errors surfaced by a verifier adapter
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("verifier unavailable: {0}")]
    Unavailable(String),

    #[error("malformed proof: {0}")]
    MalformedProof(String),
}

/// withdrawal proof verification
///
/// Ok(false) means the proof was checked and rejected; Err means the
/// check itself did not complete
pub trait ProofVerifier {
    fn verify(&self, proof: &Proof, inputs: &PublicInputs) -> Result<bool, VerifierError>;
}
