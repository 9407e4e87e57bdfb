// Complete issuance: create mint with metadata, mint the initial supply

use anyhow::{Context, Result};
use clap::Args;
use solana_sdk::signature::{Keypair, Signer};
use std::fs;
use token_issuer::{
    keypair::{load_keypair, save_keypair},
    state::ui_amount,
};

use super::{
    utils::{info, print_json, success, warn},
    Session,
};

#[derive(Args)]
pub struct IssueCmd {
    /// Use a pre-generated mint keypair instead of a fresh one
    #[arg(long)]
    mint_keypair: Option<String>,

    /// Write the mint keypair to this path
    #[arg(long)]
    save_mint_keypair: Option<String>,

    /// Decimals (overrides configuration)
    #[arg(long)]
    decimals: Option<u8>,

    /// Initial supply in raw units (overrides configuration)
    #[arg(long)]
    supply: Option<u64>,

    /// Build and print the creation transaction without sending anything
    #[arg(long)]
    dry_run: bool,

    /// Write the issuance report as JSON to this path
    #[arg(long)]
    report: Option<String>,
}

pub async fn execute(cmd: IssueCmd, mut session: Session) -> Result<()> {
    if let Some(decimals) = cmd.decimals {
        session.config.token.decimals = decimals;
    }
    if let Some(supply) = cmd.supply {
        session.config.token.initial_supply = supply;
    }
    session.config.validate().context("Invalid configuration")?;

    let Session {
        config,
        cluster,
        issuer,
    } = session;

    let mint = match cmd.mint_keypair {
        Some(ref path) => load_keypair(path).context("Failed to load mint keypair")?,
        None => Keypair::new(),
    };
    if let Some(ref path) = cmd.save_mint_keypair {
        let written = save_keypair(&mint, path)?;
        info(&format!("Mint keypair saved to: {}", written.display()));
    }

    info(&format!("Payer: {}", issuer.payer()));
    info(&format!("Mint: {}", mint.pubkey()));

    if cmd.dry_run {
        let plan = issuer
            .plan_creation(mint.pubkey(), &config.token, &config.metadata)
            .await?;

        warn("Dry run - nothing will be sent");
        info(&format!(
            "Account space: {} bytes, rent covers {} bytes: {} lamports",
            plan.layout.account_len,
            plan.layout.rent_len(),
            plan.lamports
        ));
        info(&format!(
            "Payer needs at least {} lamports for the full run",
            issuer.issuance_cost(&plan, &config.token).await?
        ));
        for (i, ix) in plan.instructions.iter().enumerate() {
            info(&format!(
                "  [{}] program {} ({} accounts, {} bytes of data)",
                i + 1,
                ix.program_id,
                ix.accounts.len(),
                ix.data.len()
            ));
        }
        return Ok(());
    }

    let report = issuer
        .issue(&mint, &config.token, &config.metadata)
        .await?;

    success(&format!(
        "Create Mint Account: {}",
        cluster.transaction_link(&report.create_signature)
    ));

    print_json("Metadata Pointer", &report.mint.metadata_pointer)?;
    print_json("Metadata", &report.mint.metadata)?;

    match report.mint_signature {
        Some(ref signature) => {
            success(&format!(
                "Minted {} tokens to: {}",
                ui_amount(config.token.initial_supply, report.mint.decimals),
                report.token_account
            ));
            success(&format!(
                "Mint Tokens: {}",
                cluster.transaction_link(signature)
            ));
        }
        None => warn("Initial supply is zero, no tokens minted"),
    }

    info(&format!("Final token balance: {}", report.ui_balance));

    if let Some(path) = cmd.report {
        fs::write(&path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write report to {}", path))?;
        success(&format!("Report saved to: {}", path));
    }

    Ok(())
}
