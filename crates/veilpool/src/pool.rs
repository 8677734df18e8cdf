//! the pool aggregate
//!
//! owns every piece of mutable ledger state and wires the injected
//! reserve and verifier boundaries into the deposit/withdraw flow
//!
//! ordering contract: all checks and internal mutations land before
//! the external reserve call; a reserve error unwinds the mutations
//! so a failed operation is as if it never started

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::access::{AccessGate, Capability};
use crate::accrual;
use crate::commitment::{Commitment, CommitmentLedger, DepositRecord};
use crate::config::PoolConfig;
use crate::error::{PoolError, Result};
use crate::events::PoolEvent;
use crate::nullifier::{Nullifier, NullifierSet};
use crate::reserve::ReserveAdapter;
use crate::roots::{Root, RootRegistry};
use crate::value::{AccountId, Amount, Timestamp};
use crate::verifier::{Proof, ProofVerifier, PublicInputs};

/// withdrawal request presented by a depositor
#[derive(Clone, Debug)]
pub struct WithdrawRequest {
    pub proof: Proof,
    pub root: Root,
    pub nullifier: Nullifier,
    pub commitment: Commitment,
    /// claimed amount, must equal the recorded principal
    pub amount: Amount,
    pub recipient: AccountId,
}

/// outcome of a paid withdrawal
///
/// `moved` comes back from the reserve and is authoritative; when it
/// falls short of `requested` the gap is the caller's to act on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    pub commitment: Commitment,
    pub nullifier: Nullifier,
    pub recipient: AccountId,
    pub principal: Amount,
    pub yield_share: Amount,
    /// principal plus yield share
    pub requested: Amount,
    /// amount the reserve actually delivered
    pub moved: Amount,
}

impl WithdrawalReceipt {
    pub fn fully_satisfied(&self) -> bool {
        self.moved == self.requested
    }

    pub fn shortfall(&self) -> Amount {
        self.requested.saturating_sub(self.moved)
    }
}

/// operator snapshot of the ledger state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub total_principal: Amount,
    pub active_principal: Amount,
    pub record_count: usize,
    pub nullifier_count: usize,
    pub root_count: usize,
    pub paused: bool,
}

/// the pool
///
/// explicitly constructed and passed into every call; no singletons
pub struct Pool {
    config: PoolConfig,
    ledger: CommitmentLedger,
    nullifiers: NullifierSet,
    roots: RootRegistry,
    gate: AccessGate,
    reserve: Option<Box<dyn ReserveAdapter>>,
    verifier: Box<dyn ProofVerifier>,
    events: Vec<PoolEvent>,
    in_flight: bool,
}

impl Pool {
    /// new pool; the genesis admin holds every capability and the
    /// reserve stays unconfigured until set_reserve installs one
    pub fn new(config: PoolConfig, verifier: Box<dyn ProofVerifier>, admin: AccountId) -> Self {
        Self {
            config,
            ledger: CommitmentLedger::new(),
            nullifiers: NullifierSet::new(),
            roots: RootRegistry::new(),
            gate: AccessGate::new(admin),
            reserve: None,
            verifier,
            events: Vec::new(),
            in_flight: false,
        }
    }

    // --- deposits ---

    /// record a deposit and forward the funds to the reserve
    pub fn deposit(
        &mut self,
        commitment: Commitment,
        principal: Amount,
        now: Timestamp,
    ) -> Result<()> {
        self.enter()?;
        let result = self.deposit_inner(commitment, principal, now);
        self.in_flight = false;
        result
    }

    fn deposit_inner(
        &mut self,
        commitment: Commitment,
        principal: Amount,
        now: Timestamp,
    ) -> Result<()> {
        self.gate.ensure_active()?;
        let Some(reserve) = self.reserve.as_mut() else {
            return Err(PoolError::ReserveNotConfigured);
        };

        // ledger checks and mutation first, reserve call last
        self.ledger.deposit(commitment, principal, now)?;

        if let Err(e) = reserve.supply(
            self.config.asset,
            principal,
            self.config.pool_account,
            self.config.referral_code,
        ) {
            // an adapter error means no funds moved; unwind the record
            self.ledger.rollback_deposit(&commitment);
            return Err(e.into());
        }

        info!("deposit recorded: {} principal {}", commitment, principal);
        self.events.push(PoolEvent::DepositRecorded {
            commitment,
            principal,
            created_at: now,
        });
        Ok(())
    }

    // --- withdrawals ---

    /// pay out a deposit plus its pro-rata yield share
    ///
    /// check order is fixed: pause gate, structural validation,
    /// reserve configured, proof, root, nullifier, record state,
    /// yield computation, ledger mutation, reserve withdrawal
    pub fn withdraw(&mut self, request: &WithdrawRequest) -> Result<WithdrawalReceipt> {
        self.enter()?;
        let result = self.withdraw_inner(request);
        self.in_flight = false;
        result
    }

    fn withdraw_inner(&mut self, request: &WithdrawRequest) -> Result<WithdrawalReceipt> {
        self.gate.ensure_active()?;
        if request.recipient.is_zero() {
            return Err(PoolError::ZeroRecipient);
        }
        if request.amount.is_zero() {
            return Err(PoolError::ZeroAmount);
        }
        if self.reserve.is_none() {
            return Err(PoolError::ReserveNotConfigured);
        }

        let inputs = PublicInputs {
            root: request.root,
            nullifier_hash: request.nullifier,
            amount: request.amount,
        };
        if !self.verifier.verify(&request.proof, &inputs)? {
            return Err(PoolError::InvalidProof);
        }
        if !self.roots.is_registered(&request.root) {
            return Err(PoolError::UnknownRoot(request.root));
        }

        // first durable mutation; everything after unwinds it on failure
        self.nullifiers.consume(request.nullifier)?;

        match self.finish_withdraw(request) {
            Ok(receipt) => {
                info!(
                    "withdrawal paid: {} principal {} yield {} to {}",
                    request.nullifier, receipt.principal, receipt.yield_share, request.recipient
                );
                self.events.push(PoolEvent::WithdrawalPaid {
                    commitment: request.commitment,
                    nullifier: request.nullifier,
                    recipient: request.recipient,
                    principal: receipt.principal,
                    yield_share: receipt.yield_share,
                    moved: receipt.moved,
                });
                Ok(receipt)
            }
            Err(e) => {
                self.nullifiers.unconsume(&request.nullifier);
                Err(e)
            }
        }
    }

    fn finish_withdraw(&mut self, request: &WithdrawRequest) -> Result<WithdrawalReceipt> {
        let record = *self.ledger.lookup(&request.commitment)?;
        if record.withdrawn {
            return Err(PoolError::AlreadyWithdrawn(request.commitment));
        }
        if record.principal != request.amount {
            return Err(PoolError::AmountMismatch {
                claimed: request.amount,
                recorded: record.principal,
            });
        }

        let Some(reserve) = self.reserve.as_mut() else {
            return Err(PoolError::ReserveNotConfigured);
        };

        // fresh observation; yield is computed at call time, never cached
        let observation = reserve.balance_of(self.config.asset, self.config.pool_account)?;
        let (principal, yield_share) =
            accrual::compute_share(record.principal, observation, self.ledger.total_principal());
        let payout = principal
            .checked_add(yield_share)
            .ok_or(PoolError::Overflow)?;

        // internal mutation commits before the reserve is called
        self.ledger.mark_withdrawn(&request.commitment)?;

        let moved = match reserve.withdraw(self.config.asset, payout, request.recipient) {
            Ok(moved) => moved,
            Err(e) => {
                // no funds moved; put the record back
                self.ledger.reopen(&request.commitment);
                return Err(e.into());
            }
        };

        if moved != payout {
            warn!("reserve moved {} of {} requested", moved, payout);
        }

        Ok(WithdrawalReceipt {
            commitment: request.commitment,
            nullifier: request.nullifier,
            recipient: request.recipient,
            principal,
            yield_share,
            requested: payout,
            moved,
        })
    }

    // --- admin ---

    /// install or replace the reserve adapter
    pub fn set_reserve(
        &mut self,
        caller: AccountId,
        reserve: Box<dyn ReserveAdapter>,
    ) -> Result<()> {
        self.gate.require(caller, Capability::ConfigureReserve)?;
        self.reserve = Some(reserve);
        info!("reserve adapter configured by {}", caller);
        self.events.push(PoolEvent::ReserveConfigured { by: caller });
        Ok(())
    }

    /// append a proof-scoping root; re-registration is a benign no-op
    pub fn register_root(&mut self, caller: AccountId, root: Root) -> Result<bool> {
        self.gate.require(caller, Capability::ManageRoots)?;
        let inserted = self.roots.register(root);
        if inserted {
            info!("root registered: {}", root);
            self.events.push(PoolEvent::RootRegistered { root });
        }
        Ok(inserted)
    }

    pub fn pause(&mut self, caller: AccountId) -> Result<()> {
        self.gate.require(caller, Capability::TogglePause)?;
        self.gate.pause()?;
        info!("pool paused by {}", caller);
        self.events.push(PoolEvent::Paused { by: caller });
        Ok(())
    }

    pub fn unpause(&mut self, caller: AccountId) -> Result<()> {
        self.gate.require(caller, Capability::TogglePause)?;
        self.gate.unpause()?;
        info!("pool unpaused by {}", caller);
        self.events.push(PoolEvent::Unpaused { by: caller });
        Ok(())
    }

    /// grant a capability
    pub fn grant(&mut self, caller: AccountId, who: AccountId, capability: Capability) -> Result<()> {
        self.gate.require(caller, Capability::ManageAccess)?;
        if self.gate.grant(who, capability) {
            self.events.push(PoolEvent::CapabilityGranted { who, capability });
        }
        Ok(())
    }

    /// revoke a capability
    pub fn revoke(&mut self, caller: AccountId, who: AccountId, capability: Capability) -> Result<()> {
        self.gate.require(caller, Capability::ManageAccess)?;
        if self.gate.revoke(who, capability) {
            self.events.push(PoolEvent::CapabilityRevoked { who, capability });
        }
        Ok(())
    }

    /// move reserve funds out past the ledger
    ///
    /// escape hatch only: records and the running total stay as they
    /// are, so they no longer match the reserve afterwards and every
    /// later yield figure is suspect; usable while paused
    pub fn emergency_withdraw(
        &mut self,
        caller: AccountId,
        amount: Amount,
        recipient: AccountId,
    ) -> Result<Amount> {
        self.gate.require(caller, Capability::EmergencyRecovery)?;
        if recipient.is_zero() {
            return Err(PoolError::ZeroRecipient);
        }
        if amount.is_zero() {
            return Err(PoolError::ZeroAmount);
        }
        let Some(reserve) = self.reserve.as_mut() else {
            return Err(PoolError::ReserveNotConfigured);
        };

        let moved = reserve.withdraw(self.config.asset, amount, recipient)?;
        warn!(
            "emergency withdrawal by {}: {} of {} requested to {}",
            caller, moved, amount, recipient
        );
        self.events.push(PoolEvent::EmergencyWithdrawal {
            recipient,
            requested: amount,
            moved,
        });
        Ok(moved)
    }

    // --- queries ---

    pub fn has_commitment(&self, commitment: &Commitment) -> bool {
        self.ledger.contains(commitment)
    }

    pub fn is_nullifier_used(&self, nullifier: &Nullifier) -> bool {
        self.nullifiers.is_used(nullifier)
    }

    pub fn is_root_registered(&self, root: &Root) -> bool {
        self.roots.is_registered(root)
    }

    /// look up a deposit record
    pub fn lookup(&self, commitment: &Commitment) -> Result<&DepositRecord> {
        self.ledger.lookup(commitment)
    }

    pub fn total_principal(&self) -> Amount {
        self.ledger.total_principal()
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// yield share a principal would receive right now
    pub fn preview_yield(&self, principal: Amount) -> Result<Amount> {
        let Some(reserve) = self.reserve.as_ref() else {
            return Err(PoolError::ReserveNotConfigured);
        };
        let observation = reserve.balance_of(self.config.asset, self.config.pool_account)?;
        let (_, share) =
            accrual::compute_share(principal, observation, self.ledger.total_principal());
        Ok(share)
    }

    /// operator snapshot
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_principal: self.ledger.total_principal(),
            active_principal: self.ledger.active_principal(),
            record_count: self.ledger.record_count(),
            nullifier_count: self.nullifiers.len(),
            root_count: self.roots.len(),
            paused: self.gate.is_paused(),
        }
    }

    /// drain recorded events
    pub fn take_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn enter(&mut self) -> Result<()> {
        if self.in_flight {
            return Err(PoolError::ReentrantCall);
        }
        self.in_flight = true;
        Ok(())
    }
}
