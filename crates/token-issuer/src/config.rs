//! Issuer configuration loaded from a TOML file

use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;

use crate::{
    cluster::{parse_commitment, Cluster},
    error::{IssuerError, IssuerResult},
};

pub const MAX_DECIMALS: u8 = 9;
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 12;
pub const MAX_URI_LENGTH: usize = 200;

/// Base metadata fields that cannot be used as custom keys
const RESERVED_KEYS: &[&str] = &["name", "symbol", "uri"];

/// Complete issuer configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IssuerConfig {
    /// Connection and signer settings
    pub cluster: ClusterConfig,

    /// Mint parameters
    pub token: TokenConfig,

    /// On-chain metadata written into the mint
    pub metadata: MetadataConfig,
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Cluster name (devnet, testnet, mainnet, localnet) or RPC URL
    pub url: String,

    /// Commitment used for queries and confirmation
    pub commitment: String,

    /// Path to the payer keypair file
    pub keypair: String,
}

/// Mint parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Decimal places of the mint
    pub decimals: u8,

    /// Raw amount minted to the payer after creation
    pub initial_supply: u64,

    /// Whether the payer also becomes freeze authority
    pub freeze_authority: bool,
}

/// Token metadata stored in the mint account
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub name: String,
    pub symbol: String,

    /// Link to the off-chain JSON document
    pub uri: String,

    /// Custom key/value pairs, written in order after initialization
    pub additional: Vec<(String, String)>,
}

impl IssuerConfig {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> IssuerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            IssuerError::InvalidConfig(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: IssuerConfig = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> IssuerResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> IssuerResult<()> {
        self.cluster.validate()?;
        self.token.validate()?;
        self.metadata.validate()?;
        Ok(())
    }
}

impl ClusterConfig {
    pub fn cluster(&self) -> IssuerResult<Cluster> {
        self.url.parse()
    }

    pub fn commitment(&self) -> IssuerResult<CommitmentConfig> {
        parse_commitment(&self.commitment)
    }

    fn validate(&self) -> IssuerResult<()> {
        self.cluster()?;
        self.commitment()?;

        if self.keypair.trim().is_empty() {
            return Err(IssuerError::InvalidConfig(
                "keypair path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl TokenConfig {
    fn validate(&self) -> IssuerResult<()> {
        if self.decimals > MAX_DECIMALS {
            return Err(IssuerError::InvalidConfig(format!(
                "decimals {} exceeds maximum of {}",
                self.decimals, MAX_DECIMALS
            )));
        }
        Ok(())
    }
}

impl MetadataConfig {
    fn validate(&self) -> IssuerResult<()> {
        validate_field("name", &self.name, MAX_NAME_LENGTH)?;
        validate_field("symbol", &self.symbol, MAX_SYMBOL_LENGTH)?;
        validate_field("uri", &self.uri, MAX_URI_LENGTH)?;

        if !self.uri.starts_with("https://") && !self.uri.starts_with("http://") {
            return Err(IssuerError::InvalidConfig(format!(
                "uri must be an http(s) URL, got '{}'",
                self.uri
            )));
        }

        let mut seen = HashSet::new();
        for (key, _) in &self.additional {
            if key.trim().is_empty() {
                return Err(IssuerError::InvalidConfig(
                    "additional metadata keys must not be empty".to_string(),
                ));
            }
            if RESERVED_KEYS.contains(&key.as_str()) {
                return Err(IssuerError::InvalidConfig(format!(
                    "'{}' is a base metadata field, not a custom key",
                    key
                )));
            }
            if !seen.insert(key.as_str()) {
                return Err(IssuerError::InvalidConfig(format!(
                    "duplicate additional metadata key '{}'",
                    key
                )));
            }
        }

        Ok(())
    }
}

fn validate_field(field: &str, value: &str, max_len: usize) -> IssuerResult<()> {
    if value.trim().is_empty() {
        return Err(IssuerError::InvalidConfig(format!(
            "metadata {} must not be empty",
            field
        )));
    }
    if value.len() > max_len {
        return Err(IssuerError::InvalidConfig(format!(
            "metadata {} is {} bytes, maximum is {}",
            field,
            value.len(),
            max_len
        )));
    }
    Ok(())
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            url: "devnet".to_string(),
            commitment: "confirmed".to_string(),
            keypair: "~/.config/solana/id.json".to_string(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            decimals: 2,
            initial_supply: 1_000_000_000, // 10,000,000.00 at 2 decimals
            freeze_authority: false,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            name: "ArtScienceTest".to_string(),
            symbol: "ASRTEST".to_string(),
            uri: "https://raw.githubusercontent.com/DangerousPotential/solana-token-metadata/refs/heads/main/metadata.json".to_string(),
            additional: vec![(
                "description".to_string(),
                "Only Possible On Solana".to_string(),
            )],
        }
    }
}

/// Create example configuration file
pub fn create_example_config(path: impl AsRef<Path>) -> IssuerResult<()> {
    IssuerConfig::default().save(path)
}
