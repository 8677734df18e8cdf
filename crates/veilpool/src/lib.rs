//! veilpool
//!
//! pooled blinded deposits with pro-rata yield accounting over an
//! external reserve
//!
//! # architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       BLINDED POOL                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ledger (this crate)                                        │
//! │  ├─ commitment records (principal, open/withdrawn)          │
//! │  ├─ nullifier set (spent withdrawal tags)                   │
//! │  └─ root registry (scopes accepted proofs)                  │
//! │                                                             │
//! │  boundaries (injected)                                      │
//! │  ├─ ReserveAdapter: holds the funds, accrues yield          │
//! │  └─ ProofVerifier: checks withdrawal proofs                 │
//! │                                                             │
//! │  payout = principal + floor((R - T) * p / T)                │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! deposits are identified only by opaque commitments and spent by
//! presenting a proof plus a fresh nullifier, so the ledger never
//! links a withdrawal back to its deposit; yield is whatever the
//! reserve reports above tracked principal, split pro rata at the
//! moment of each withdrawal

pub mod access;
pub mod accrual;
pub mod commitment;
pub mod config;
pub mod error;
pub mod events;
pub mod mock;
pub mod nullifier;
pub mod pool;
pub mod reserve;
pub mod roots;
pub mod value;
pub mod verifier;

pub use access::{AccessGate, Capability};
pub use accrual::{compute_share, total_yield};
pub use commitment::{Commitment, CommitmentLedger, DepositRecord};
pub use config::PoolConfig;
pub use error::{ErrorKind, PoolError, Result};
pub use events::PoolEvent;
pub use nullifier::{Nullifier, NullifierSet};
pub use pool::{Pool, PoolStats, WithdrawRequest, WithdrawalReceipt};
pub use reserve::{ReserveAdapter, ReserveError};
pub use roots::{Root, RootRegistry};
pub use value::{AccountId, Amount, AssetId, Timestamp};
pub use verifier::{Proof, ProofVerifier, PublicInputs, VerifierError};

/// domain separator for deposit commitments
pub const COMMITMENT_DOMAIN: &[u8] = b"veilpool.commitment.v1";
/// domain separator for withdrawal nullifiers
pub const NULLIFIER_DOMAIN: &[u8] = b"veilpool.nullifier.v1";
/// domain separator for proof public inputs
pub const INPUTS_DOMAIN: &[u8] = b"veilpool.public-inputs.v1";
/// domain separator for account labels
pub const ACCOUNT_DOMAIN: &[u8] = b"veilpool.account.v1";
/// domain separator for root labels
pub const ROOT_DOMAIN: &[u8] = b"veilpool.root.v1";
