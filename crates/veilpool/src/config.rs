//! pool configuration

use serde::{Deserialize, Serialize};

use crate::value::{AccountId, AssetId};

/// static pool parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// asset this pool accounts for
    pub asset: AssetId,
    /// identity the reserve credits the pooled funds to
    pub pool_account: AccountId,
    /// referral code forwarded to the reserve on supply
    pub referral_code: u16,
}

impl PoolConfig {
    /// pool over the native asset
    pub fn native(pool_account: AccountId) -> Self {
        Self {
            asset: AssetId::NATIVE,
            pool_account,
            referral_code: 0,
        }
    }

    /// pool over a specific asset
    pub fn for_asset(asset: AssetId, pool_account: AccountId) -> Self {
        Self {
            asset,
            pool_account,
            referral_code: 0,
        }
    }

    pub fn with_referral(mut self, referral_code: u16) -> Self {
        self.referral_code = referral_code;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::native(AccountId::derive(b"veilpool.pool"))
    }
}
