//! capability gating for administrative operations
//!
//! one map from caller identity to granted capabilities, one query;
//! also owns the binary pause switch gating deposits and withdrawals

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};
use crate::value::AccountId;

/// administrative capability
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// append proof-scoping roots
    ManageRoots,
    /// install or replace the reserve adapter
    ConfigureReserve,
    /// pause and unpause the pool
    TogglePause,
    /// move reserve funds out past the ledger
    EmergencyRecovery,
    /// grant and revoke capabilities
    ManageAccess,
}

impl Capability {
    /// every capability, for seeding a full admin set
    pub const ALL: [Capability; 5] = [
        Capability::ManageRoots,
        Capability::ConfigureReserve,
        Capability::TogglePause,
        Capability::EmergencyRecovery,
        Capability::ManageAccess,
    ];
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::ManageRoots => "manage-roots",
            Capability::ConfigureReserve => "configure-reserve",
            Capability::TogglePause => "toggle-pause",
            Capability::EmergencyRecovery => "emergency-recovery",
            Capability::ManageAccess => "manage-access",
        };
        write!(f, "{}", name)
    }
}

/// access gate - capability map plus pause state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessGate {
    grants: HashMap<AccountId, HashSet<Capability>>,
    paused: bool,
}

impl AccessGate {
    /// gate with a genesis admin holding every capability
    pub fn new(admin: AccountId) -> Self {
        let mut grants = HashMap::new();
        grants.insert(admin, Capability::ALL.into_iter().collect());
        Self {
            grants,
            paused: false,
        }
    }

    /// fail unless `caller` holds `capability`
    pub fn require(&self, caller: AccountId, capability: Capability) -> Result<()> {
        if !self.has_capability(&caller, capability) {
            return Err(PoolError::MissingCapability { caller, capability });
        }
        Ok(())
    }

    pub fn has_capability(&self, caller: &AccountId, capability: Capability) -> bool {
        self.grants
            .get(caller)
            .map(|set| set.contains(&capability))
            .unwrap_or(false)
    }

    /// grant a capability; returns false if already held
    pub fn grant(&mut self, who: AccountId, capability: Capability) -> bool {
        self.grants.entry(who).or_default().insert(capability)
    }

    /// revoke a capability; returns false if it was not held
    pub fn revoke(&mut self, who: AccountId, capability: Capability) -> bool {
        match self.grants.get_mut(&who) {
            Some(set) => set.remove(&capability),
            None => false,
        }
    }

    /// fail when paused; deposits and withdrawals run through this
    pub fn ensure_active(&self) -> Result<()> {
        if self.paused {
            return Err(PoolError::Paused);
        }
        Ok(())
    }

    /// switch the pool off; fails if already paused
    pub fn pause(&mut self) -> Result<()> {
        if self.paused {
            return Err(PoolError::Paused);
        }
        self.paused = true;
        Ok(())
    }

    /// switch the pool back on; fails if not paused
    pub fn unpause(&mut self) -> Result<()> {
        if !self.paused {
            return Err(PoolError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
