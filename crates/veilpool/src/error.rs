//! error types for the pool engine
//!
//! every failure aborts its operation with no partial state change;
//! the variant carries enough detail for callers to branch on cause

use thiserror::Error;

use crate::access::Capability;
use crate::commitment::Commitment;
use crate::nullifier::Nullifier;
use crate::reserve::ReserveError;
use crate::roots::Root;
use crate::value::{AccountId, Amount};
use crate::verifier::VerifierError;

/// coarse failure classification for integrators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    State,
    Authorization,
    External,
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("recipient must be non-zero")]
    ZeroRecipient,

    #[error("proof rejected by verifier")]
    InvalidProof,

    #[error("root not registered: {0}")]
    UnknownRoot(Root),

    #[error("claimed amount {claimed} does not match recorded principal {recorded}")]
    AmountMismatch { claimed: Amount, recorded: Amount },

    #[error("amount overflow in pool accounting")]
    Overflow,

    #[error("commitment already used: {0}")]
    CommitmentExists(Commitment),

    #[error("nullifier already used: {0}")]
    NullifierUsed(Nullifier),

    #[error("unknown commitment: {0}")]
    UnknownCommitment(Commitment),

    #[error("deposit already withdrawn: {0}")]
    AlreadyWithdrawn(Commitment),

    #[error("reserve not configured")]
    ReserveNotConfigured,

    #[error("pool is paused")]
    Paused,

    #[error("pool is not paused")]
    NotPaused,

    #[error("reentrant call rejected")]
    ReentrantCall,

    #[error("caller {caller} missing capability {capability}")]
    MissingCapability {
        caller: AccountId,
        capability: Capability,
    },

    #[error("reserve error: {0}")]
    Reserve(#[from] ReserveError),

    #[error("verifier error: {0}")]
    Verifier(#[from] VerifierError),
}

impl PoolError {
    /// classify into the coarse taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroAmount
            | Self::ZeroRecipient
            | Self::InvalidProof
            | Self::UnknownRoot(_)
            | Self::AmountMismatch { .. }
            | Self::Overflow => ErrorKind::Validation,
            Self::CommitmentExists(_) | Self::NullifierUsed(_) => ErrorKind::Conflict,
            Self::UnknownCommitment(_) => ErrorKind::NotFound,
            Self::AlreadyWithdrawn(_)
            | Self::ReserveNotConfigured
            | Self::Paused
            | Self::NotPaused
            | Self::ReentrantCall => ErrorKind::State,
            Self::MissingCapability { .. } => ErrorKind::Authorization,
            Self::Reserve(_) | Self::Verifier(_) => ErrorKind::External,
        }
    }
}

pub type Result<T> = std::result::Result<T, PoolError>;
