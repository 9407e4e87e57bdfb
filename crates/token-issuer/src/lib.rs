//! Token issuer
//!
//! Creates a Token-2022 mint that stores its own metadata (metadata pointer
//! extension pointing at the mint), writes name, symbol, URI and custom
//! fields, and mints an initial supply to the payer's associated token
//! account. Provides:
//! - Configuration loading and validation
//! - Instruction builders for the creation bundle
//! - A sequential issuance pipeline over any [`client::LedgerClient`]
//! - Decoded snapshots of the resulting on-chain state
pub mod client;
pub mod cluster;
pub mod config;
pub mod error;
pub mod instructions;
pub mod issuer;
pub mod keypair;
pub mod state;
pub mod testing;

pub use client::{LedgerAccount, LedgerClient, RpcLedger};
pub use cluster::Cluster;
pub use config::{ClusterConfig, IssuerConfig, MetadataConfig, TokenConfig};
pub use error::{IssuerError, IssuerResult};
pub use issuer::{CreationPlan, IssuanceReport, Issuer, MintToOutcome};
pub use state::{MetadataPointerSnapshot, MetadataSnapshot, MintSnapshot, TokenAccountSnapshot};
