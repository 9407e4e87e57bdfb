use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use tracing::debug;

use super::{LedgerAccount, LedgerClient};
use crate::error::{IssuerError, IssuerResult};

/// JSON-RPC backed ledger client
pub struct RpcLedger {
    rpc: Arc<RpcClient>,
}

impl RpcLedger {
    pub fn new(rpc_url: &str, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: Arc::new(RpcClient::new_with_commitment(
                rpc_url.to_string(),
                commitment,
            )),
        }
    }

    pub fn with_client(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Get the RPC client
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Get the RPC endpoint URL
    pub fn rpc_url(&self) -> String {
        self.rpc.url()
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> IssuerResult<u64> {
        Ok(self
            .rpc
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }

    async fn get_balance(&self, address: &Pubkey) -> IssuerResult<u64> {
        Ok(self.rpc.get_balance(address).await?)
    }

    async fn get_account(&self, address: &Pubkey) -> IssuerResult<Option<LedgerAccount>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await?;

        Ok(response.value.map(|account| LedgerAccount {
            owner: account.owner,
            data: account.data,
        }))
    }

    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        signers: &[&Keypair],
    ) -> IssuerResult<Signature> {
        let payer = signers
            .first()
            .ok_or_else(|| IssuerError::Rpc("transaction needs at least one signer".to_string()))?;

        let recent_blockhash = self.rpc.get_latest_blockhash().await?;

        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            signers,
            recent_blockhash,
        );

        debug!(
            instructions = instructions.len(),
            signers = signers.len(),
            "submitting transaction"
        );

        Ok(self.rpc.send_and_confirm_transaction(&tx).await?)
    }
}
