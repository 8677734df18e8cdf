//! full deposit/withdraw lifecycle against the mock reserve
//!
//! drives the pool through the same sequences an operator would see:
//! yield accrual between operations, forced reserve failures, partial
//! deliveries, and the admin surface

use veilpool::mock::{AcceptAllVerifier, MockReserve, UnavailableVerifier};
use veilpool::{
    AccountId, Amount, AssetId, Capability, Commitment, ErrorKind, Nullifier, Pool, PoolConfig,
    PoolError, PoolEvent, Proof, Root, Timestamp, WithdrawRequest,
};

fn admin() -> AccountId {
    AccountId::derive(b"admin")
}

struct Setup {
    pool: Pool,
    reserve: MockReserve,
    root: Root,
}

fn setup() -> Setup {
    let config = PoolConfig::native(AccountId::derive(b"pool-position"));
    let mut pool = Pool::new(config, Box::new(AcceptAllVerifier), admin());
    let reserve = MockReserve::new(config.pool_account);
    pool.set_reserve(admin(), Box::new(reserve.clone())).unwrap();
    let root = Root::derive(b"epoch-1");
    pool.register_root(admin(), root).unwrap();
    Setup { pool, reserve, root }
}

/// commitment and nullifier from one secret, the way a depositor
/// would derive them
fn request_for(root: Root, secret: &[u8; 32], amount: Amount, recipient: &[u8]) -> WithdrawRequest {
    WithdrawRequest {
        proof: Proof::empty(),
        root,
        nullifier: Nullifier::derive(secret),
        commitment: Commitment::derive(secret, amount),
        amount,
        recipient: AccountId::derive(recipient),
    }
}

// === YIELD DISTRIBUTION ===

#[test]
fn test_sole_depositor_takes_all_yield() {
    let Setup {
        mut pool,
        reserve,
        root,
    } = setup();

    let a = request_for(root, &[0xaa; 32], Amount::new(20_000), b"alice");
    pool.deposit(a.commitment, a.amount, Timestamp::new(1)).unwrap();
    assert_eq!(reserve.balance(AssetId::NATIVE), Amount::new(20_000));

    reserve.accrue(AssetId::NATIVE, Amount::new(5_000));
    assert_eq!(pool.preview_yield(a.amount).unwrap(), Amount::new(5_000));

    let receipt = pool.withdraw(&a).unwrap();
    assert_eq!(receipt.principal, Amount::new(20_000));
    assert_eq!(receipt.yield_share, Amount::new(5_000));
    assert_eq!(receipt.requested, Amount::new(25_000));
    assert_eq!(receipt.moved, Amount::new(25_000));
    assert!(receipt.fully_satisfied());
    assert_eq!(reserve.paid_to(&a.recipient), Amount::new(25_000));
    assert_eq!(reserve.balance(AssetId::NATIVE), Amount::ZERO);

    // a later depositor sees none of the earlier yield
    let b = request_for(root, &[0xbb; 32], Amount::new(10_000), b"bob");
    pool.deposit(b.commitment, b.amount, Timestamp::new(2)).unwrap();
    assert_eq!(pool.total_principal(), Amount::new(10_000));
    assert_eq!(pool.preview_yield(b.amount).unwrap(), Amount::ZERO);

    let receipt = pool.withdraw(&b).unwrap();
    assert_eq!(receipt.principal, Amount::new(10_000));
    assert_eq!(receipt.yield_share, Amount::ZERO);
    assert_eq!(reserve.paid_to(&b.recipient), Amount::new(10_000));

    let stats = pool.stats();
    assert_eq!(stats.total_principal, Amount::ZERO);
    assert_eq!(stats.record_count, 2);
    assert_eq!(stats.nullifier_count, 2);
}

#[test]
fn test_yield_splits_pro_rata() {
    let Setup {
        mut pool,
        reserve,
        root,
    } = setup();

    let a = request_for(root, &[0xaa; 32], Amount::new(20_000), b"alice");
    let b = request_for(root, &[0xbb; 32], Amount::new(10_000), b"bob");
    pool.deposit(a.commitment, a.amount, Timestamp::new(1)).unwrap();
    pool.deposit(b.commitment, b.amount, Timestamp::new(2)).unwrap();
    reserve.accrue(AssetId::NATIVE, Amount::new(6_000));

    // observation 36_000 over total 30_000: a's share is 4_000
    let receipt = pool.withdraw(&a).unwrap();
    assert_eq!(receipt.yield_share, Amount::new(4_000));
    assert_eq!(receipt.moved, Amount::new(24_000));

    // remainder 12_000 over total 10_000: b takes the rest
    let receipt = pool.withdraw(&b).unwrap();
    assert_eq!(receipt.yield_share, Amount::new(2_000));
    assert_eq!(receipt.moved, Amount::new(12_000));

    // everything supplied plus everything accrued was paid out
    assert_eq!(reserve.balance(AssetId::NATIVE), Amount::ZERO);
    assert_eq!(
        reserve
            .paid_to(&a.recipient)
            .checked_add(reserve.paid_to(&b.recipient))
            .unwrap(),
        Amount::new(36_000)
    );
}

#[test]
fn test_payouts_never_exceed_reserve() {
    let Setup {
        mut pool,
        reserve,
        root,
    } = setup();

    // awkward amounts so the pro-rata division truncates
    let amounts = [7_001u64, 13_007, 29_989];
    let requests: Vec<_> = amounts
        .iter()
        .enumerate()
        .map(|(i, &amount)| {
            let secret = [i as u8 + 1; 32];
            request_for(root, &secret, Amount::new(amount), b"depositor")
        })
        .collect();
    for (i, request) in requests.iter().enumerate() {
        pool.deposit(request.commitment, request.amount, Timestamp::new(i as u64))
            .unwrap();
    }
    reserve.accrue(AssetId::NATIVE, Amount::new(999));

    for request in &requests {
        let receipt = pool.withdraw(request).unwrap();
        assert!(receipt.fully_satisfied());
    }

    // truncated shares stay in the pot for later withdrawals; the
    // reserve is never overdrawn
    let supplied: u64 = amounts.iter().sum::<u64>() + 999;
    let paid = reserve.paid_to(&AccountId::derive(b"depositor"));
    assert!(paid.0 <= supplied);
    assert_eq!(reserve.balance(AssetId::NATIVE).0, supplied - paid.0);
}

// === DOUBLE SPEND DEFENSES ===

#[test]
fn test_nullifier_single_use() {
    let Setup {
        mut pool,
        reserve: _,
        root,
    } = setup();

    let a = request_for(root, &[0xaa; 32], Amount::new(1_000), b"alice");
    pool.deposit(a.commitment, a.amount, Timestamp::new(1)).unwrap();
    pool.withdraw(&a).unwrap();

    let err = pool.withdraw(&a).unwrap_err();
    assert!(matches!(err, PoolError::NullifierUsed(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_withdrawn_record_stays_closed() {
    let Setup {
        mut pool,
        reserve: _,
        root,
    } = setup();

    let a = request_for(root, &[0xaa; 32], Amount::new(1_000), b"alice");
    pool.deposit(a.commitment, a.amount, Timestamp::new(1)).unwrap();
    pool.withdraw(&a).unwrap();

    // fresh nullifier against the spent commitment
    let mut replay = a.clone();
    replay.nullifier = Nullifier::derive(&[0xab; 32]);
    let err = pool.withdraw(&replay).unwrap_err();
    assert!(matches!(err, PoolError::AlreadyWithdrawn(_)));

    // the failed attempt did not burn the fresh nullifier
    assert!(!pool.is_nullifier_used(&replay.nullifier));
}

#[test]
fn test_claimed_amount_must_match_recorded() {
    let Setup {
        mut pool,
        reserve: _,
        root,
    } = setup();

    let secret = [0xaa; 32];
    let commitment = Commitment::derive(&secret, Amount::new(1_000));
    pool.deposit(commitment, Amount::new(1_000), Timestamp::new(1)).unwrap();

    let request = WithdrawRequest {
        proof: Proof::empty(),
        root,
        nullifier: Nullifier::derive(&secret),
        commitment,
        amount: Amount::new(999),
        recipient: AccountId::derive(b"alice"),
    };
    let err = pool.withdraw(&request).unwrap_err();
    assert!(matches!(
        err,
        PoolError::AmountMismatch {
            claimed: Amount(999),
            recorded: Amount(1_000),
        }
    ));
    assert!(!pool.is_nullifier_used(&request.nullifier));
    assert!(pool.lookup(&commitment).unwrap().is_open());
}

#[test]
fn test_unknown_commitment_rolls_back_nullifier() {
    let Setup {
        mut pool,
        reserve: _,
        root,
    } = setup();

    let ghost = request_for(root, &[0xee; 32], Amount::new(500), b"eve");
    let err = pool.withdraw(&ghost).unwrap_err();
    assert!(matches!(err, PoolError::UnknownCommitment(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!pool.is_nullifier_used(&ghost.nullifier));
}

// === FAILURE ATOMICITY ===

#[test]
fn test_reserve_withdraw_failure_leaves_no_trace() {
    let Setup {
        mut pool,
        reserve,
        root,
    } = setup();

    let a = request_for(root, &[0xaa; 32], Amount::new(2_000), b"alice");
    pool.deposit(a.commitment, a.amount, Timestamp::new(1)).unwrap();
    reserve.accrue(AssetId::NATIVE, Amount::new(100));

    reserve.fail_next_withdraw();
    let err = pool.withdraw(&a).unwrap_err();
    assert!(matches!(err, PoolError::Reserve(_)));
    assert_eq!(err.kind(), ErrorKind::External);

    // every mutation unwound, running total still matches the audit sum
    assert!(!pool.is_nullifier_used(&a.nullifier));
    assert!(pool.lookup(&a.commitment).unwrap().is_open());
    assert_eq!(pool.total_principal(), Amount::new(2_000));
    let stats = pool.stats();
    assert_eq!(stats.total_principal, stats.active_principal);
    assert_eq!(reserve.paid_to(&a.recipient), Amount::ZERO);

    // the retry sees the same yield and succeeds
    let receipt = pool.withdraw(&a).unwrap();
    assert_eq!(receipt.moved, Amount::new(2_100));
}

#[test]
fn test_reserve_supply_failure_unwinds_deposit() {
    let Setup {
        mut pool,
        reserve,
        root: _,
    } = setup();

    let commitment = Commitment::derive(&[0xaa; 32], Amount::new(2_000));
    reserve.fail_next_supply();
    let err = pool
        .deposit(commitment, Amount::new(2_000), Timestamp::new(1))
        .unwrap_err();
    assert!(matches!(err, PoolError::Reserve(_)));

    assert!(!pool.has_commitment(&commitment));
    assert_eq!(pool.total_principal(), Amount::ZERO);

    // same commitment is accepted once the reserve cooperates
    pool.deposit(commitment, Amount::new(2_000), Timestamp::new(2)).unwrap();
}

#[test]
fn test_partial_delivery_is_final_and_visible() {
    let Setup {
        mut pool,
        reserve,
        root,
    } = setup();

    let a = request_for(root, &[0xaa; 32], Amount::new(2_000), b"alice");
    pool.deposit(a.commitment, a.amount, Timestamp::new(1)).unwrap();

    reserve.holdback_next_withdraw(Amount::new(500));
    let receipt = pool.withdraw(&a).unwrap();
    assert_eq!(receipt.requested, Amount::new(2_000));
    assert_eq!(receipt.moved, Amount::new(1_500));
    assert!(!receipt.fully_satisfied());
    assert_eq!(receipt.shortfall(), Amount::new(500));

    // a short delivery still settles the record
    assert!(!pool.lookup(&a.commitment).unwrap().is_open());
    assert!(pool.is_nullifier_used(&a.nullifier));
}

#[test]
fn test_verifier_outage_consumes_nothing() {
    let config = PoolConfig::native(AccountId::derive(b"pool-position"));
    let mut pool = Pool::new(config, Box::new(UnavailableVerifier), admin());
    let reserve = MockReserve::new(config.pool_account);
    pool.set_reserve(admin(), Box::new(reserve.clone())).unwrap();
    let root = Root::derive(b"epoch-1");
    pool.register_root(admin(), root).unwrap();

    let a = request_for(root, &[0xaa; 32], Amount::new(1_000), b"alice");
    pool.deposit(a.commitment, a.amount, Timestamp::new(1)).unwrap();

    let err = pool.withdraw(&a).unwrap_err();
    assert!(matches!(err, PoolError::Verifier(_)));
    assert_eq!(err.kind(), ErrorKind::External);
    assert!(!pool.is_nullifier_used(&a.nullifier));
    assert_eq!(pool.total_principal(), Amount::new(1_000));
}

// === ADMIN SURFACE ===

#[test]
fn test_pause_blocks_funds_movement_only() {
    let Setup {
        mut pool,
        reserve: _,
        root,
    } = setup();

    let a = request_for(root, &[0xaa; 32], Amount::new(1_000), b"alice");
    pool.deposit(a.commitment, a.amount, Timestamp::new(1)).unwrap();
    pool.pause(admin()).unwrap();

    assert!(matches!(pool.withdraw(&a).unwrap_err(), PoolError::Paused));
    let b = Commitment::derive(&[0xbb; 32], Amount::new(500));
    assert!(matches!(
        pool.deposit(b, Amount::new(500), Timestamp::new(2)).unwrap_err(),
        PoolError::Paused
    ));

    // queries and admin keep working
    assert!(pool.has_commitment(&a.commitment));
    assert!(pool.is_paused());
    pool.register_root(admin(), Root::derive(b"epoch-2")).unwrap();

    pool.unpause(admin()).unwrap();
    pool.withdraw(&a).unwrap();
}

#[test]
fn test_pause_transitions_require_correct_state() {
    let Setup { mut pool, .. } = setup();

    assert!(matches!(pool.unpause(admin()).unwrap_err(), PoolError::NotPaused));
    pool.pause(admin()).unwrap();
    let err = pool.pause(admin()).unwrap_err();
    assert!(matches!(err, PoolError::Paused));
    assert_eq!(err.kind(), ErrorKind::State);
}

#[test]
fn test_capability_delegation() {
    let Setup { mut pool, .. } = setup();
    let operator = AccountId::derive(b"operator");

    let err = pool.register_root(operator, Root::derive(b"epoch-2")).unwrap_err();
    assert!(matches!(err, PoolError::MissingCapability { .. }));
    assert_eq!(err.kind(), ErrorKind::Authorization);

    pool.grant(admin(), operator, Capability::ManageRoots).unwrap();
    pool.register_root(operator, Root::derive(b"epoch-2")).unwrap();

    // granted scope does not bleed into other capabilities
    assert!(pool.pause(operator).is_err());

    pool.revoke(admin(), operator, Capability::ManageRoots).unwrap();
    assert!(pool.register_root(operator, Root::derive(b"epoch-3")).is_err());
}

#[test]
fn test_emergency_withdraw_skips_the_ledger() {
    let Setup {
        mut pool,
        reserve,
        root,
    } = setup();

    let a = request_for(root, &[0xaa; 32], Amount::new(5_000), b"alice");
    pool.deposit(a.commitment, a.amount, Timestamp::new(1)).unwrap();
    pool.pause(admin()).unwrap();

    // usable while paused, moves funds without touching records
    let rescue = AccountId::derive(b"rescue");
    let moved = pool.emergency_withdraw(admin(), Amount::new(3_000), rescue).unwrap();
    assert_eq!(moved, Amount::new(3_000));
    assert_eq!(reserve.paid_to(&rescue), Amount::new(3_000));
    assert_eq!(pool.total_principal(), Amount::new(5_000));
    assert!(pool.lookup(&a.commitment).unwrap().is_open());

    // ledger and reserve now disagree: a's payout comes up short
    pool.unpause(admin()).unwrap();
    let receipt = pool.withdraw(&a).unwrap();
    assert_eq!(receipt.requested, Amount::new(5_000));
    assert_eq!(receipt.moved, Amount::new(2_000));
    assert_eq!(receipt.shortfall(), Amount::new(3_000));
}

#[test]
fn test_root_registration_is_idempotent() {
    let Setup { mut pool, root, .. } = setup();

    assert!(!pool.register_root(admin(), root).unwrap());
    assert!(pool.register_root(admin(), Root::derive(b"epoch-2")).unwrap());
    assert_eq!(pool.stats().root_count, 2);
}

// === EVENTS ===

#[test]
fn test_events_trace_the_lifecycle() {
    let Setup {
        mut pool,
        reserve: _,
        root,
    } = setup();
    pool.take_events();

    let a = request_for(root, &[0xaa; 32], Amount::new(1_000), b"alice");
    pool.deposit(a.commitment, a.amount, Timestamp::new(7)).unwrap();
    let receipt = pool.withdraw(&a).unwrap();

    let events = pool.take_events();
    assert_eq!(
        events,
        vec![
            PoolEvent::DepositRecorded {
                commitment: a.commitment,
                principal: Amount::new(1_000),
                created_at: Timestamp::new(7),
            },
            PoolEvent::WithdrawalPaid {
                commitment: a.commitment,
                nullifier: a.nullifier,
                recipient: a.recipient,
                principal: receipt.principal,
                yield_share: receipt.yield_share,
                moved: receipt.moved,
            },
        ]
    );

    // drained once, gone
    assert!(pool.take_events().is_empty());
}
