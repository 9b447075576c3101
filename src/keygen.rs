//! Key generation for member wallets
//!
//! Usage:
//!   collector-dao keygen               Write a new wallet to the default path
//!   collector-dao keygen --out PATH    Write it somewhere else

use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::info;

use collector_dao::wallet::Wallet;

use crate::flag_value;

pub fn run(args: &[String]) -> Result<()> {
    let path = flag_value(args, "--out").map_or_else(Wallet::default_path, PathBuf::from);
    if path.exists() {
        bail!("refusing to overwrite existing wallet at {}", path.display());
    }

    let mut wallet = Wallet::generate();
    wallet.save(&path)?;
    info!(address = %wallet.address(), path = %path.display(), "Wallet created");

    println!("Generated new Collector DAO wallet");
    println!("----------------------------------------------------------------");
    println!("Public Key (Hex):");
    println!("{}", wallet.public_key().to_hex());
    println!();
    println!("Address:");
    println!("{}", wallet.address());
    println!();
    println!("Saved to: {}", path.display());
    println!("----------------------------------------------------------------");
    Ok(())
}
