// Amend the metadata stored in a mint

use anyhow::Result;
use clap::Args;

use super::{
    utils::{parse_pubkey, success},
    Session,
};

#[derive(Args)]
pub struct SetFieldCmd {
    /// Mint address
    mint: String,

    /// name, symbol, uri, or any custom key
    field: String,

    /// New value
    value: String,
}

#[derive(Args)]
pub struct RemoveFieldCmd {
    /// Mint address
    mint: String,

    /// Custom key to remove
    key: String,

    /// Succeed even if the key is absent
    #[arg(long)]
    idempotent: bool,
}

pub async fn set_field(cmd: SetFieldCmd, session: Session) -> Result<()> {
    let mint = parse_pubkey(&cmd.mint)?;
    let signature = session
        .issuer
        .update_field(&mint, &cmd.field, &cmd.value)
        .await?;

    success(&format!(
        "Set {} = {}: {}",
        cmd.field,
        cmd.value,
        session.cluster.transaction_link(&signature)
    ));
    Ok(())
}

pub async fn remove_field(cmd: RemoveFieldCmd, session: Session) -> Result<()> {
    let mint = parse_pubkey(&cmd.mint)?;
    let signature = session
        .issuer
        .remove_field(&mint, &cmd.key, cmd.idempotent)
        .await?;

    success(&format!(
        "Removed {}: {}",
        cmd.key,
        session.cluster.transaction_link(&signature)
    ));
    Ok(())
}
