//! Veilpool CLI
//!
//! Drives a pool instance against the in-memory mock reserve and
//! offers small helpers for working with deposit secrets.
//!
//! ## Usage
//!
//! ```bash
//! # Scripted two-depositor scenario with yield accrual
//! veilpool-cli demo --first 20000 --second 10000 --accrue 5000
//!
//! # Same scenario, machine-readable
//! veilpool-cli demo --json
//!
//! # Commitment and nullifier for a deposit secret
//! veilpool-cli derive --secret <32-byte-hex> --amount 20000
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use veilpool::mock::{AcceptAllVerifier, MockReserve};
use veilpool::{
    AccountId, Amount, AssetId, Commitment, Nullifier, Pool, PoolConfig, Proof, Root, Timestamp,
    WithdrawRequest,
};

#[derive(Parser)]
#[command(name = "veilpool-cli")]
#[command(about = "Blinded deposit pool demo and operator helpers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted deposit/accrue/withdraw scenario on the mock reserve
    Demo {
        /// First deposit amount
        #[arg(long, default_value = "20000")]
        first: u64,

        /// Second deposit amount
        #[arg(long, default_value = "10000")]
        second: u64,

        /// Yield credited to the reserve before withdrawals start
        #[arg(long, default_value = "5000")]
        accrue: u64,

        /// Print receipts, stats and events as JSON
        #[arg(long)]
        json: bool,
    },

    /// Derive the commitment and nullifier for a deposit secret
    Derive {
        /// Deposit secret (32 bytes, hex)
        #[arg(long)]
        secret: String,

        /// Deposit amount in raw units
        #[arg(long)]
        amount: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("veilpool={level},veilpool_cli={level}").into()),
        )
        .init();

    match cli.command {
        Commands::Demo {
            first,
            second,
            accrue,
            json,
        } => run_demo(first, second, accrue, json),
        Commands::Derive { secret, amount } => run_derive(&secret, amount),
    }
}

fn run_demo(first: u64, second: u64, accrue: u64, json: bool) -> Result<()> {
    let admin = AccountId::derive(b"demo-admin");
    let config = PoolConfig::native(AccountId::derive(b"demo-pool"));
    let mut pool = Pool::new(config, Box::new(AcceptAllVerifier), admin);
    let reserve = MockReserve::new(config.pool_account);
    pool.set_reserve(admin, Box::new(reserve.clone()))?;
    let root = Root::derive(b"demo-epoch");
    pool.register_root(admin, root)?;

    let depositors = [
        (b"alice".as_slice(), [0xa1u8; 32], Amount::new(first)),
        (b"bob".as_slice(), [0xb2u8; 32], Amount::new(second)),
    ];

    for (i, (name, secret, amount)) in depositors.iter().enumerate() {
        let commitment = Commitment::derive(secret, *amount);
        pool.deposit(commitment, *amount, Timestamp::new(i as u64))?;
        info!("deposited {} for {}", amount, String::from_utf8_lossy(name));
    }

    reserve.accrue(AssetId::NATIVE, Amount::new(accrue));
    info!("reserve accrued {}", accrue);

    let mut receipts = Vec::new();
    for (name, secret, amount) in &depositors {
        let receipt = pool.withdraw(&WithdrawRequest {
            proof: Proof::empty(),
            root,
            nullifier: Nullifier::derive(secret),
            commitment: Commitment::derive(secret, *amount),
            amount: *amount,
            recipient: AccountId::derive(name),
        })?;
        receipts.push(receipt);
    }

    let stats = pool.stats();
    let events = pool.take_events();

    if json {
        let report = serde_json::json!({
            "receipts": receipts,
            "stats": stats,
            "events": events,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for receipt in &receipts {
            let short = if receipt.fully_satisfied() {
                String::new()
            } else {
                format!(" (short {})", receipt.shortfall())
            };
            println!(
                "paid {} to {}: principal {} yield {}{}",
                receipt.moved, receipt.recipient, receipt.principal, receipt.yield_share, short
            );
        }
        println!(
            "reserve balance after payouts: {}",
            reserve.balance(AssetId::NATIVE)
        );
        println!(
            "records {} nullifiers {} total principal {}",
            stats.record_count, stats.nullifier_count, stats.total_principal
        );
        println!("events recorded: {}", events.len());
    }
    Ok(())
}

fn run_derive(secret: &str, amount: u64) -> Result<()> {
    let bytes =
        hex::decode(secret.trim_start_matches("0x")).context("secret is not valid hex")?;
    let secret: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow!("secret must be exactly 32 bytes"))?;

    let amount = Amount::new(amount);
    println!("commitment: {}", Commitment::derive(&secret, amount));
    println!("nullifier:  {}", Nullifier::derive(&secret));
    Ok(())
}
