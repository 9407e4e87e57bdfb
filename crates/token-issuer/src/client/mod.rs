//! Cluster access used by the issuer
//!
//! The issuer only needs four round-trips: rent lookup, balance lookup,
//! account reads and atomic transaction submission. `LedgerClient` is the
//! seam between the pipeline and the network so the pipeline can run
//! against [`crate::testing::MockLedger`] in tests.

pub mod rpc;

use async_trait::async_trait;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
};

use crate::error::IssuerResult;

pub use rpc::RpcLedger;

/// Account contents as stored on the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAccount {
    /// Program that owns the account
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Lamports an account of `data_len` bytes must hold to be rent exempt
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> IssuerResult<u64>;

    /// Native balance of an account in lamports
    async fn get_balance(&self, address: &Pubkey) -> IssuerResult<u64>;

    /// Owner and raw data, `None` if the account does not exist
    async fn get_account(&self, address: &Pubkey) -> IssuerResult<Option<LedgerAccount>>;

    /// Sign with `signers` (the first one pays), submit and wait for confirmation
    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        signers: &[&Keypair],
    ) -> IssuerResult<Signature>;
}
