//! Cluster endpoints, commitment levels and explorer links

use std::{fmt, str::FromStr};

use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature};

use crate::error::{IssuerError, IssuerResult};

const EXPLORER_URL: &str = "https://solana.fm";

/// Solana cluster the issuer talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cluster {
    Devnet,
    Testnet,
    Mainnet,
    Localnet,
    /// Any other JSON-RPC endpoint
    Custom(String),
}

impl Cluster {
    /// JSON-RPC endpoint URL
    pub fn url(&self) -> &str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::Mainnet => "https://api.mainnet-beta.solana.com",
            Cluster::Localnet => "http://localhost:8899",
            Cluster::Custom(url) => url,
        }
    }

    /// Value of the explorer `cluster` query parameter
    pub fn explorer_cluster(&self) -> String {
        match self {
            Cluster::Devnet => "devnet-solana".to_string(),
            Cluster::Testnet => "testnet-solana".to_string(),
            Cluster::Mainnet => "mainnet-alpha".to_string(),
            Cluster::Localnet => "localnet-solana".to_string(),
            Cluster::Custom(url) => format!("custom&customUrl={}", url),
        }
    }

    /// Explorer link for a transaction signature
    pub fn transaction_link(&self, signature: &Signature) -> String {
        format!(
            "{}/tx/{}?cluster={}",
            EXPLORER_URL,
            signature,
            self.explorer_cluster()
        )
    }

    /// Explorer link for an account address
    pub fn address_link(&self, address: &Pubkey) -> String {
        format!(
            "{}/address/{}?cluster={}",
            EXPLORER_URL,
            address,
            self.explorer_cluster()
        )
    }
}

impl FromStr for Cluster {
    type Err = IssuerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "devnet" | "d" => Ok(Cluster::Devnet),
            "testnet" | "t" => Ok(Cluster::Testnet),
            "mainnet" | "mainnet-beta" | "m" => Ok(Cluster::Mainnet),
            "localnet" | "localhost" | "l" => Ok(Cluster::Localnet),
            url if url.starts_with("http://") || url.starts_with("https://") => {
                Ok(Cluster::Custom(url.to_string()))
            }
            other => Err(IssuerError::InvalidConfig(format!(
                "unknown cluster '{}', expected devnet, testnet, mainnet, localnet or an http(s) URL",
                other
            ))),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cluster::Devnet => write!(f, "devnet"),
            Cluster::Testnet => write!(f, "testnet"),
            Cluster::Mainnet => write!(f, "mainnet"),
            Cluster::Localnet => write!(f, "localnet"),
            Cluster::Custom(url) => write!(f, "{}", url),
        }
    }
}

/// Parse a commitment level name
pub fn parse_commitment(level: &str) -> IssuerResult<CommitmentConfig> {
    match level.trim() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(IssuerError::InvalidConfig(format!(
            "unknown commitment '{}', expected processed, confirmed or finalized",
            other
        ))),
    }
}
