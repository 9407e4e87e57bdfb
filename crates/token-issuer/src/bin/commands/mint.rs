// Mint to and query associated token accounts

use anyhow::{bail, Result};
use clap::Args;
use token_issuer::state::{parse_ui_amount, ui_amount};

use super::{
    utils::{info, parse_pubkey, success},
    Session,
};

#[derive(Args)]
pub struct MintCmd {
    /// Mint address
    mint: String,

    /// Amount in tokens, e.g. 12.5
    #[arg(long, conflicts_with = "raw_amount")]
    amount: Option<String>,

    /// Amount in raw units
    #[arg(long)]
    raw_amount: Option<u64>,

    /// Token account owner (defaults to wallet)
    #[arg(long)]
    owner: Option<String>,
}

#[derive(Args)]
pub struct BalanceCmd {
    /// Mint address
    mint: String,

    /// Token account owner (defaults to wallet)
    #[arg(long)]
    owner: Option<String>,
}

pub async fn execute(cmd: MintCmd, session: Session) -> Result<()> {
    let mint = parse_pubkey(&cmd.mint)?;
    let owner = match cmd.owner {
        Some(ref addr) => parse_pubkey(addr)?,
        None => session.issuer.payer(),
    };

    let decimals = session.issuer.fetch_mint(&mint).await?.decimals;
    let amount = match (cmd.amount, cmd.raw_amount) {
        (Some(ui), _) => parse_ui_amount(&ui, decimals)?,
        (None, Some(raw)) => raw,
        (None, None) => bail!("Either --amount or --raw-amount is required"),
    };

    let outcome = session
        .issuer
        .mint_to(&mint, &owner, amount, decimals)
        .await?;
    if outcome.created_account {
        info(&format!("Created token account: {}", outcome.token_account));
    }
    success(&format!(
        "Minted {} tokens to: {}",
        ui_amount(amount, decimals),
        outcome.token_account
    ));
    success(&format!(
        "Mint Tokens: {}",
        session.cluster.transaction_link(&outcome.signature)
    ));

    Ok(())
}

pub async fn balance(cmd: BalanceCmd, session: Session) -> Result<()> {
    let mint = parse_pubkey(&cmd.mint)?;
    let owner = match cmd.owner {
        Some(ref addr) => parse_pubkey(addr)?,
        None => session.issuer.payer(),
    };

    let decimals = session.issuer.fetch_mint(&mint).await?.decimals;
    let account = session.issuer.balance(&mint, &owner).await?;

    info(&format!("Token account: {}", account.address));
    info(&format!(
        "Balance: {} ({} raw)",
        ui_amount(account.amount, decimals),
        account.amount
    ));

    Ok(())
}
