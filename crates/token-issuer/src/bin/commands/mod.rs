// Command modules for token-issuer CLI

pub mod config;
pub mod issue;
pub mod metadata;
pub mod mint;
pub mod show;
pub mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use token_issuer::{keypair::load_keypair, Cluster, IssuerConfig, Issuer, RpcLedger};
use tracing::info;

/// Resolved configuration, cluster and issuer shared by every command
pub struct Session {
    pub config: IssuerConfig,
    pub cluster: Cluster,
    pub issuer: Issuer<RpcLedger>,
}

impl Session {
    /// Load the configuration, apply command-line overrides and connect
    pub fn open(
        config_path: Option<&str>,
        rpc_url: Option<&str>,
        commitment: Option<&str>,
        keypair: Option<&str>,
    ) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => IssuerConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path))?,
            None => IssuerConfig::default(),
        };

        if let Some(url) = rpc_url {
            config.cluster.url = url.to_string();
        }
        if let Some(level) = commitment {
            config.cluster.commitment = level.to_string();
        }
        if let Some(path) = keypair {
            config.cluster.keypair = path.to_string();
        }
        config.validate().context("Invalid configuration")?;

        let cluster = config.cluster.cluster()?;
        let payer = load_keypair(&config.cluster.keypair)
            .context("Failed to load payer keypair")?;

        let ledger = RpcLedger::new(cluster.url(), config.cluster.commitment()?);
        info!(cluster = %cluster, rpc_url = %ledger.rpc_url(), "connected");

        Ok(Self {
            issuer: Issuer::new(ledger, Arc::new(payer)),
            config,
            cluster,
        })
    }
}
