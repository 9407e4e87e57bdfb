// Inspect an existing mint

use anyhow::Result;
use clap::Args;
use token_issuer::state::ui_amount;

use super::{
    utils::{info, parse_pubkey, print_json},
    Session,
};

#[derive(Args)]
pub struct ShowCmd {
    /// Mint address
    mint: String,
}

pub async fn execute(cmd: ShowCmd, session: Session) -> Result<()> {
    let mint = parse_pubkey(&cmd.mint)?;
    let snapshot = session.issuer.fetch_mint(&mint).await?;

    info(&format!("Mint: {}", session.cluster.address_link(&mint)));
    info(&format!(
        "Supply: {} ({} decimals)",
        ui_amount(snapshot.supply, snapshot.decimals),
        snapshot.decimals
    ));

    print_json("Metadata Pointer", &snapshot.metadata_pointer)?;
    print_json("Metadata", &snapshot.metadata)?;

    Ok(())
}
