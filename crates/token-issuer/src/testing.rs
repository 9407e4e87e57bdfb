//! Testing utilities for the issuer
//!
//! `MockLedger` is an in-memory [`LedgerClient`]: it records every submitted
//! transaction, serves account data that tests seed up front or schedule to
//! appear after the n-th submission, and can be told to reject a submission.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use solana_program::{program_option::COption, program_pack::Pack};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    rent::Rent,
    signature::{Keypair, Signature},
    signer::Signer,
};
use spl_token_2022::{
    extension::{
        metadata_pointer::MetadataPointer, BaseStateWithExtensionsMut, ExtensionType,
        StateWithExtensionsMut,
    },
    state::{Account, AccountState, Mint},
};
use spl_token_metadata_interface::state::TokenMetadata;

use crate::{
    client::{LedgerAccount, LedgerClient},
    error::{IssuerError, IssuerResult},
    instructions::token_program_id,
};

/// A transaction as submitted to the mock
#[derive(Debug, Clone)]
pub struct SentTransaction {
    pub instructions: Vec<Instruction>,
    /// Signer pubkeys, fee payer first
    pub signers: Vec<Pubkey>,
    pub signature: Signature,
}

#[derive(Default)]
struct MockState {
    accounts: HashMap<Pubkey, LedgerAccount>,
    balances: HashMap<Pubkey, u64>,
    /// Account writes applied once the transaction at the given index lands
    scheduled: Vec<(usize, Pubkey, LedgerAccount)>,
    sent: Vec<SentTransaction>,
    fail_at: Option<(usize, String)>,
}

/// In-memory ledger for pipeline tests
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<MockState>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Set the native balance of an account
    pub fn set_balance(&self, address: Pubkey, lamports: u64) {
        self.state().balances.insert(address, lamports);
    }

    /// Store Token-2022 owned account data now
    pub fn set_account(&self, address: Pubkey, data: Vec<u8>) {
        self.set_account_with_owner(address, token_program_id(), data);
    }

    /// Store account data owned by `owner` now
    pub fn set_account_with_owner(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.state()
            .accounts
            .insert(address, LedgerAccount { owner, data });
    }

    /// Store Token-2022 owned account data once the transaction with index
    /// `tx_index` is confirmed
    pub fn set_account_after(&self, tx_index: usize, address: Pubkey, data: Vec<u8>) {
        let account = LedgerAccount {
            owner: token_program_id(),
            data,
        };
        self.state().scheduled.push((tx_index, address, account));
    }

    /// Reject the transaction with index `tx_index`
    pub fn fail_at(&self, tx_index: usize, message: impl Into<String>) {
        self.state().fail_at = Some((tx_index, message.into()));
    }

    /// Transactions accepted so far
    pub fn sent(&self) -> Vec<SentTransaction> {
        self.state().sent.clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> IssuerResult<u64> {
        Ok(Rent::default().minimum_balance(data_len))
    }

    async fn get_balance(&self, address: &Pubkey) -> IssuerResult<u64> {
        Ok(self.state().balances.get(address).copied().unwrap_or(0))
    }

    async fn get_account(&self, address: &Pubkey) -> IssuerResult<Option<LedgerAccount>> {
        Ok(self.state().accounts.get(address).cloned())
    }

    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        signers: &[&Keypair],
    ) -> IssuerResult<Signature> {
        let mut state = self.state();
        let index = state.sent.len();

        if let Some((fail_index, message)) = &state.fail_at {
            if *fail_index == index {
                return Err(IssuerError::Rpc(message.clone()));
            }
        }

        let signature = Keypair::new().sign_message(&(index as u64).to_le_bytes());
        state.sent.push(SentTransaction {
            instructions: instructions.to_vec(),
            signers: signers.iter().map(|signer| signer.pubkey()).collect(),
            signature,
        });

        let (ready, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut state.scheduled)
            .into_iter()
            .partition(|(tx_index, _, _)| *tx_index == index);
        state.scheduled = pending;
        for (_, address, account) in ready {
            state.accounts.insert(address, account);
        }

        Ok(signature)
    }
}

/// Pack a Token-2022 mint whose metadata pointer and metadata live in the mint itself
///
/// `metadata.mint` is used as the pointer target.
pub fn pack_mint_with_metadata(
    mint_authority: &Pubkey,
    decimals: u8,
    supply: u64,
    metadata: &TokenMetadata,
) -> IssuerResult<Vec<u8>> {
    let account_len =
        ExtensionType::try_calculate_account_len::<Mint>(&[ExtensionType::MetadataPointer])?;
    let mut data = vec![0u8; account_len + metadata.tlv_size_of()?];

    let mut state = StateWithExtensionsMut::<Mint>::unpack_uninitialized(&mut data)?;
    let pointer = state.init_extension::<MetadataPointer>(true)?;
    pointer.authority = Some(*mint_authority).try_into()?;
    pointer.metadata_address = Some(metadata.mint).try_into()?;

    state.base = Mint {
        mint_authority: COption::Some(*mint_authority),
        supply,
        decimals,
        is_initialized: true,
        freeze_authority: COption::None,
    };
    state.pack_base();
    state.init_account_type()?;
    state.init_variable_len_extension(metadata, false)?;

    Ok(data)
}

/// Pack a plain token account
pub fn pack_token_account(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Vec<u8> {
    let account = Account {
        mint: *mint,
        owner: *owner,
        amount,
        delegate: COption::None,
        state: AccountState::Initialized,
        is_native: COption::None,
        delegated_amount: 0,
        close_authority: COption::None,
    };

    let mut data = vec![0u8; Account::LEN];
    account.pack_into_slice(&mut data);
    data
}
