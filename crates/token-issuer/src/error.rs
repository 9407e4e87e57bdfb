//! Error types for token issuance

use solana_sdk::{program_error::ProgramError, pubkey::Pubkey};
use thiserror::Error;

/// Issuer error type
#[derive(Error, Debug)]
pub enum IssuerError {
    /// RPC transport or confirmation failure
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Instruction building or account decoding failed in the token program crates
    #[error("Program error: {0}")]
    Program(#[from] ProgramError),

    /// Account does not exist on the cluster
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    /// Account exists but does not hold the expected state
    #[error("Invalid account data for {account}: {reason}")]
    InvalidAccountData { account: Pubkey, reason: String },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Keypair file could not be read or written
    #[error("Keypair error: {0}")]
    Keypair(String),

    /// Payer cannot fund the accounts the transaction creates
    #[error("Insufficient balance: required {required} lamports, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<solana_client::client_error::ClientError> for IssuerError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        IssuerError::Rpc(err.to_string())
    }
}

impl From<serde_json::Error> for IssuerError {
    fn from(err: serde_json::Error) -> Self {
        IssuerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for IssuerError {
    fn from(err: toml::de::Error) -> Self {
        IssuerError::InvalidConfig(err.to_string())
    }
}

impl From<toml::ser::Error> for IssuerError {
    fn from(err: toml::ser::Error) -> Self {
        IssuerError::Serialization(err.to_string())
    }
}

impl IssuerError {
    pub fn invalid_account(account: Pubkey, reason: impl Into<String>) -> Self {
        IssuerError::InvalidAccountData {
            account,
            reason: reason.into(),
        }
    }
}

pub type IssuerResult<T> = Result<T, IssuerError>;
