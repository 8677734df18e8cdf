//! boundary to the external yield reserve
//!
//! the reserve holds the pooled funds and accrues yield on them; the
//! ledger only talks to it through this trait and treats every return
//! value as untrusted until checked

use thiserror::Error;

use crate::value::{AccountId, Amount, AssetId};

/// errors surfaced by a reserve adapter
#[derive(Debug, Error)]
pub enum ReserveError {
    #[error("reserve rejected supply: {0}")]
    SupplyRejected(String),

    #[error("reserve rejected withdrawal: {0}")]
    WithdrawRejected(String),

    #[error("reserve balance query failed: {0}")]
    BalanceUnavailable(String),
}

/// external yield reserve operations
///
/// implementations wrap whatever facility actually holds the funds;
/// callers authorize fund movement out-of-band before supply
///
/// contract: an `Err` from supply or withdraw means no funds moved,
/// which is what lets the caller unwind its own bookkeeping
pub trait ReserveAdapter {
    /// move `amount` of `asset` into the reserve, credited to
    /// `beneficiary`
    fn supply(
        &mut self,
        asset: AssetId,
        amount: Amount,
        beneficiary: AccountId,
        referral: u16,
    ) -> Result<(), ReserveError>;

    /// move `amount` of `asset` out of the reserve to `recipient`
    ///
    /// returns the amount actually moved; callers must not assume it
    /// equals the requested amount
    fn withdraw(
        &mut self,
        asset: AssetId,
        amount: Amount,
        recipient: AccountId,
    ) -> Result<Amount, ReserveError>;

    /// current balance the reserve attributes to `holder`
    ///
    /// volatile external quantity: re-read at every computation,
    /// never cached
    fn balance_of(&self, asset: AssetId, holder: AccountId) -> Result<Amount, ReserveError>;
}
