//! pro-rata yield math
//!
//! yield is never stored; every figure is recomputed from the live
//! reserve observation at the moment it is needed

use crate::value::Amount;

/// yield currently attributed to the pool: max(0, observed - total)
///
/// an observation below the tracked principal clamps to zero rather
/// than going negative
pub fn total_yield(reserve_observation: Amount, total_principal: Amount) -> Amount {
    reserve_observation.saturating_sub(total_principal)
}

/// split a withdrawal payout: the principal echoed back unchanged and
/// the pro-rata share of pool yield owed to it
///
/// share = floor(yield * principal / total), with the multiplication
/// widened to u128 so u64 operands cannot overflow it; truncation
/// keeps the remainder in the pool
///
/// pure in its three inputs, no state reads
pub fn compute_share(
    principal: Amount,
    reserve_observation: Amount,
    total_principal: Amount,
) -> (Amount, Amount) {
    if total_principal.is_zero() {
        return (principal, Amount::ZERO);
    }
    let yield_total = total_yield(reserve_observation, total_principal);
    if yield_total.is_zero() {
        return (principal, Amount::ZERO);
    }
    let share = yield_total.0 as u128 * principal.0 as u128 / total_principal.0 as u128;
    // a principal above the pool total saturates the share; tracked
    // principals never exceed the total
    (principal, Amount(share.min(u64::MAX as u128) as u64))
}
