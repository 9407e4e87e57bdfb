// Utility functions for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Parse a pubkey from string
pub fn parse_pubkey(s: &str) -> Result<Pubkey> {
    Pubkey::from_str(s).with_context(|| format!("Invalid public key: {}", s))
}

/// Print success message with checkmark
pub fn success(msg: &str) {
    println!("[OK] {}", msg);
}

/// Print info message
pub fn info(msg: &str) {
    println!("[INFO] {}", msg);
}

/// Print warning message
pub fn warn(msg: &str) {
    eprintln!("[WARN] {}", msg);
}

/// Print a labelled, pretty-printed JSON value
pub fn print_json<T: Serialize>(label: &str, value: &T) -> Result<()> {
    println!("\n{}: {}", label, serde_json::to_string_pretty(value)?);
    Ok(())
}
