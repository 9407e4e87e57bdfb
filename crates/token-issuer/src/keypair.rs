//! Keypair file handling
//!
//! Signer material is never compiled in; it is read from Solana CLI style
//! JSON keypair files at runtime.

use std::path::PathBuf;

use solana_sdk::signature::{read_keypair_file, write_keypair_file, Keypair};

use crate::error::{IssuerError, IssuerResult};

/// Expand a leading `~` to the home directory
pub fn expand_path(path: &str) -> IssuerResult<PathBuf> {
    if let Some(rest) = path.strip_prefix('~') {
        let home = std::env::var("HOME")
            .map_err(|_| IssuerError::Keypair("HOME environment variable not set".to_string()))?;
        Ok(PathBuf::from(format!("{}{}", home, rest)))
    } else {
        Ok(PathBuf::from(path))
    }
}

/// Load a keypair from a file path, expanding ~ if needed
pub fn load_keypair(path: &str) -> IssuerResult<Keypair> {
    let expanded = expand_path(path)?;
    read_keypair_file(&expanded).map_err(|e| {
        IssuerError::Keypair(format!(
            "failed to load keypair from {}: {}",
            expanded.display(),
            e
        ))
    })
}

/// Write a keypair to a file path, expanding ~ if needed
pub fn save_keypair(keypair: &Keypair, path: &str) -> IssuerResult<PathBuf> {
    let expanded = expand_path(path)?;
    write_keypair_file(keypair, &expanded).map_err(|e| {
        IssuerError::Keypair(format!(
            "failed to write keypair to {}: {}",
            expanded.display(),
            e
        ))
    })?;
    Ok(expanded)
}
