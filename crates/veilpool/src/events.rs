//! events recorded by pool operations
//!
//! every successful state-changing operation appends one; the pool
//! keeps them until the caller drains the log

use serde::{Deserialize, Serialize};

use crate::access::Capability;
use crate::commitment::Commitment;
use crate::nullifier::Nullifier;
use crate::roots::Root;
use crate::value::{AccountId, Amount, Timestamp};

/// state-changing pool activity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    DepositRecorded {
        commitment: Commitment,
        principal: Amount,
        created_at: Timestamp,
    },
    WithdrawalPaid {
        commitment: Commitment,
        nullifier: Nullifier,
        recipient: AccountId,
        principal: Amount,
        yield_share: Amount,
        moved: Amount,
    },
    RootRegistered {
        root: Root,
    },
    ReserveConfigured {
        by: AccountId,
    },
    Paused {
        by: AccountId,
    },
    Unpaused {
        by: AccountId,
    },
    CapabilityGranted {
        who: AccountId,
        capability: Capability,
    },
    CapabilityRevoked {
        who: AccountId,
        capability: Capability,
    },
    /// ledger records were not touched; totals no longer match the
    /// reserve after this
    EmergencyWithdrawal {
        recipient: AccountId,
        requested: Amount,
        moved: Amount,
    },
}
