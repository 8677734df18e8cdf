//! reference adapters for tests and local runs
//!
//! the mock reserve keeps balances in memory and lets callers inject
//! yield or force failures; the verifiers are scaffolding stand-ins,
//! not proof systems

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::reserve::{ReserveAdapter, ReserveError};
use crate::value::{AccountId, Amount, AssetId};
use crate::verifier::{Proof, ProofVerifier, PublicInputs, VerifierError};

#[derive(Debug, Default)]
struct MockState {
    balances: HashMap<(AssetId, AccountId), Amount>,
    payouts: HashMap<AccountId, Amount>,
    fail_next_supply: bool,
    fail_next_withdraw: bool,
    holdback: Amount,
}

/// in-memory reserve with injectable yield and failure switches
///
/// `holder` plays the pool's reserve position: supplies credit their
/// beneficiary, withdrawals debit the holder
///
/// clones share one underlying state, so a caller can hand the pool a
/// boxed clone and keep its own handle for accrual and assertions
#[derive(Clone, Debug)]
pub struct MockReserve {
    holder: AccountId,
    state: Rc<RefCell<MockState>>,
}

impl MockReserve {
    pub fn new(holder: AccountId) -> Self {
        Self {
            holder,
            state: Rc::new(RefCell::new(MockState::default())),
        }
    }

    /// credit yield to the holder's position
    pub fn accrue(&self, asset: AssetId, amount: Amount) {
        let mut state = self.state.borrow_mut();
        let balance = state.balances.entry((asset, self.holder)).or_default();
        *balance = balance.saturating_add(amount);
        tracing::debug!("mock reserve accrued {} to {}", amount, self.holder);
    }

    /// make the next supply call fail
    pub fn fail_next_supply(&self) {
        self.state.borrow_mut().fail_next_supply = true;
    }

    /// make the next withdraw call fail
    pub fn fail_next_withdraw(&self) {
        self.state.borrow_mut().fail_next_withdraw = true;
    }

    /// short the next withdrawal by `amount`
    pub fn holdback_next_withdraw(&self, amount: Amount) {
        self.state.borrow_mut().holdback = amount;
    }

    /// holder's current position
    pub fn balance(&self, asset: AssetId) -> Amount {
        self.state
            .borrow()
            .balances
            .get(&(asset, self.holder))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// cumulative amount delivered to `recipient`
    pub fn paid_to(&self, recipient: &AccountId) -> Amount {
        self.state
            .borrow()
            .payouts
            .get(recipient)
            .copied()
            .unwrap_or(Amount::ZERO)
    }
}

impl ReserveAdapter for MockReserve {
    fn supply(
        &mut self,
        asset: AssetId,
        amount: Amount,
        beneficiary: AccountId,
        _referral: u16,
    ) -> Result<(), ReserveError> {
        let mut state = self.state.borrow_mut();
        if state.fail_next_supply {
            state.fail_next_supply = false;
            return Err(ReserveError::SupplyRejected("forced failure".into()));
        }
        let balance = state.balances.entry((asset, beneficiary)).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| ReserveError::SupplyRejected("balance overflow".into()))?;
        Ok(())
    }

    fn withdraw(
        &mut self,
        asset: AssetId,
        amount: Amount,
        recipient: AccountId,
    ) -> Result<Amount, ReserveError> {
        let mut state = self.state.borrow_mut();
        if state.fail_next_withdraw {
            state.fail_next_withdraw = false;
            return Err(ReserveError::WithdrawRejected("forced failure".into()));
        }
        let holdback = std::mem::take(&mut state.holdback);
        let available = state
            .balances
            .get(&(asset, self.holder))
            .copied()
            .unwrap_or(Amount::ZERO);

        // deliver what is actually there, minus any forced holdback
        let moved = std::cmp::min(amount, available).saturating_sub(holdback);
        if let Some(balance) = state.balances.get_mut(&(asset, self.holder)) {
            *balance = balance.saturating_sub(moved);
        }
        let paid = state.payouts.entry(recipient).or_default();
        *paid = paid.saturating_add(moved);

        tracing::debug!("mock reserve moved {} of {} to {}", moved, amount, recipient);
        Ok(moved)
    }

    fn balance_of(&self, asset: AssetId, holder: AccountId) -> Result<Amount, ReserveError> {
        Ok(self
            .state
            .borrow()
            .balances
            .get(&(asset, holder))
            .copied()
            .unwrap_or(Amount::ZERO))
    }
}

/// verifier that accepts every proof (scaffolding only)
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllVerifier;

impl ProofVerifier for AcceptAllVerifier {
    fn verify(&self, _proof: &Proof, _inputs: &PublicInputs) -> Result<bool, VerifierError> {
        Ok(true)
    }
}

/// verifier that rejects every proof
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectAllVerifier;

impl ProofVerifier for RejectAllVerifier {
    fn verify(&self, _proof: &Proof, _inputs: &PublicInputs) -> Result<bool, VerifierError> {
        Ok(false)
    }
}

/// verifier whose checks never complete
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableVerifier;

impl ProofVerifier for UnavailableVerifier {
    fn verify(&self, _proof: &Proof, _inputs: &PublicInputs) -> Result<bool, VerifierError> {
        Err(VerifierError::Unavailable("forced failure".into()))
    }
}
