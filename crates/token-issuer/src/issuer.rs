//! Token issuance pipeline
//!
//! Every stage awaits its network round-trip before the next one starts. A
//! failed stage returns its error; nothing already confirmed is rolled back.

use std::sync::Arc;

use serde::Serialize;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_instruction,
};
use spl_token_2022::extension::{BaseStateWithExtensions, StateWithExtensions};
use spl_token_2022::state::Mint;
use spl_token_metadata_interface::state::TokenMetadata;
use tracing::{debug, info};

use crate::{
    client::LedgerClient,
    config::{MetadataConfig, TokenConfig},
    error::{IssuerError, IssuerResult},
    instructions::{self, CreateMintParams, MintLayout, LAMPORTS_PER_SIGNATURE},
    state::{self, display_serde, MintSnapshot, TokenAccountSnapshot},
};

/// Everything needed to submit the creation transaction
#[derive(Debug, Clone)]
pub struct CreationPlan {
    pub mint: Pubkey,
    pub layout: MintLayout,
    /// Rent-exempt deposit for `layout.rent_len()` bytes
    pub lamports: u64,
    pub instructions: Vec<Instruction>,
}

/// Result of minting to an associated token account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintToOutcome {
    pub signature: Signature,
    pub token_account: Pubkey,
    /// Whether the transaction also created the token account
    pub created_account: bool,
}

/// Summary of a complete issuance run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceReport {
    #[serde(with = "display_serde")]
    pub create_signature: Signature,
    #[serde(with = "display_serde::option")]
    pub mint_signature: Option<Signature>,
    #[serde(with = "display_serde")]
    pub token_account: Pubkey,
    pub mint: MintSnapshot,
    pub balance: u64,
    pub ui_balance: String,
}

/// Issues Token-2022 mints paid for and controlled by one payer
pub struct Issuer<C: LedgerClient> {
    client: C,
    payer: Arc<Keypair>,
}

impl<C: LedgerClient> Issuer<C> {
    pub fn new(client: C, payer: Arc<Keypair>) -> Self {
        Self { client, payer }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }

    /// Size the mint account, price its rent and build the creation bundle
    pub async fn plan_creation(
        &self,
        mint: Pubkey,
        token: &TokenConfig,
        metadata: &MetadataConfig,
    ) -> IssuerResult<CreationPlan> {
        let payer = self.payer();
        let params = CreateMintParams {
            mint,
            payer,
            mint_authority: payer,
            update_authority: payer,
            freeze_authority: token.freeze_authority.then_some(payer),
            decimals: token.decimals,
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            uri: metadata.uri.clone(),
            additional: metadata.additional.clone(),
        };

        let layout = MintLayout::for_metadata(&params.token_metadata()?)?;
        let lamports = self
            .client
            .minimum_balance_for_rent_exemption(layout.rent_len())
            .await?;

        debug!(
            account_len = layout.account_len,
            metadata_len = layout.metadata_len,
            lamports,
            "sized mint account"
        );

        let instructions = instructions::create_mint_with_metadata(&params, &layout, lamports)?;

        Ok(CreationPlan {
            mint,
            layout,
            lamports,
            instructions,
        })
    }

    /// Lamports the payer spends on a full [`Issuer::issue`] run
    ///
    /// Covers the mint's rent deposit and both signature fees of the creation
    /// transaction. With a non-zero supply it adds the mint transaction's fee
    /// and the rent of the payer's new associated token account.
    pub async fn issuance_cost(&self, plan: &CreationPlan, token: &TokenConfig) -> IssuerResult<u64> {
        let mut required = plan.lamports.saturating_add(2 * LAMPORTS_PER_SIGNATURE);

        if token.initial_supply > 0 {
            let token_account_rent = self
                .client
                .minimum_balance_for_rent_exemption(instructions::token_account_len()?)
                .await?;
            required = required
                .saturating_add(LAMPORTS_PER_SIGNATURE)
                .saturating_add(token_account_rent);
        }

        Ok(required)
    }

    /// Create the mint, its metadata pointer and metadata in one transaction
    pub async fn create_mint(
        &self,
        mint: &Keypair,
        token: &TokenConfig,
        metadata: &MetadataConfig,
    ) -> IssuerResult<(Signature, CreationPlan)> {
        let plan = self.plan_creation(mint.pubkey(), token, metadata).await?;
        self.ensure_balance(plan.lamports.saturating_add(2 * LAMPORTS_PER_SIGNATURE))
            .await?;

        let signature = self.submit_creation(mint, &plan).await?;
        Ok((signature, plan))
    }

    async fn submit_creation(&self, mint: &Keypair, plan: &CreationPlan) -> IssuerResult<Signature> {
        info!(
            mint = %plan.mint,
            instructions = plan.instructions.len(),
            "creating mint account"
        );

        let signature = self
            .client
            .send_and_confirm(&plan.instructions, &[self.payer.as_ref(), mint])
            .await?;

        info!(%signature, mint = %plan.mint, "mint account created");
        Ok(signature)
    }

    /// Read back a mint with its pointer and metadata
    pub async fn fetch_mint(&self, mint: &Pubkey) -> IssuerResult<MintSnapshot> {
        let data = self.owned_data(mint).await?;
        state::decode_mint(mint, &data)
    }

    /// Read back a token account
    pub async fn fetch_token_account(&self, address: &Pubkey) -> IssuerResult<TokenAccountSnapshot> {
        let data = self.owned_data(address).await?;
        state::decode_token_account(address, &data)
    }

    /// Balance of `owner`'s associated token account for `mint`
    pub async fn balance(&self, mint: &Pubkey, owner: &Pubkey) -> IssuerResult<TokenAccountSnapshot> {
        let address = instructions::associated_token_address(owner, mint);
        self.fetch_token_account(&address).await
    }

    /// Mint `amount` raw units into `owner`'s associated token account
    ///
    /// `decimals` must match the mint; the program rejects the instruction
    /// otherwise. The account is created in the same transaction when it does
    /// not exist yet.
    pub async fn mint_to(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        amount: u64,
        decimals: u8,
    ) -> IssuerResult<MintToOutcome> {
        let payer = self.payer();
        let token_account = instructions::associated_token_address(owner, mint);

        let created_account = self.client.get_account(&token_account).await?.is_none();

        let mut ixs = Vec::with_capacity(2);
        if created_account {
            debug!(%token_account, %owner, "associated token account missing, creating it");
            ixs.push(instructions::create_associated_token_account(&payer, owner, mint));
        }
        ixs.push(instructions::mint_to(mint, &token_account, &payer, amount, decimals)?);

        let signature = self
            .client
            .send_and_confirm(&ixs, &[self.payer.as_ref()])
            .await?;

        info!(
            %signature,
            %token_account,
            amount = %state::ui_amount(amount, decimals),
            "minted tokens"
        );

        Ok(MintToOutcome {
            signature,
            token_account,
            created_account,
        })
    }

    /// Set a base field (`name`, `symbol`, `uri`) or custom key
    ///
    /// Tops up the mint's lamports first when the new value grows the account
    /// past its rent-exempt balance.
    pub async fn update_field(
        &self,
        mint: &Pubkey,
        field: &str,
        value: &str,
    ) -> IssuerResult<Signature> {
        let data = self.owned_data(mint).await?;
        let field = instructions::parse_field(field);

        let new_len = {
            let state = StateWithExtensions::<Mint>::unpack(&data)?;
            let mut metadata = state.get_variable_len_extension::<TokenMetadata>()?;
            metadata.update(field.clone(), value.to_string());
            state.try_get_new_account_len_for_variable_len_extension(&metadata)?
        };

        let mut ixs = Vec::with_capacity(2);
        if let Some(top_up) = self.rent_shortfall(mint, new_len).await? {
            debug!(%mint, top_up, "funding metadata growth");
            ixs.push(system_instruction::transfer(&self.payer(), mint, top_up));
        }
        ixs.push(instructions::update_metadata_field(
            mint,
            &self.payer(),
            field,
            value.to_string(),
        ));

        let signature = self
            .client
            .send_and_confirm(&ixs, &[self.payer.as_ref()])
            .await?;

        info!(%signature, %mint, "metadata field updated");
        Ok(signature)
    }

    /// Remove a custom key from the mint's metadata
    pub async fn remove_field(
        &self,
        mint: &Pubkey,
        key: &str,
        idempotent: bool,
    ) -> IssuerResult<Signature> {
        let ix = instructions::remove_metadata_key(mint, &self.payer(), key.to_string(), idempotent);

        let signature = self
            .client
            .send_and_confirm(&[ix], &[self.payer.as_ref()])
            .await?;

        info!(%signature, %mint, key, "metadata key removed");
        Ok(signature)
    }

    /// Full run: create the mint, read it back, mint the initial supply to the
    /// payer and read back the balance
    ///
    /// The payer must hold [`Issuer::issuance_cost`] up front, so a run never
    /// stops between creating the mint and funding it for lack of lamports.
    pub async fn issue(
        &self,
        mint: &Keypair,
        token: &TokenConfig,
        metadata: &MetadataConfig,
    ) -> IssuerResult<IssuanceReport> {
        let plan = self.plan_creation(mint.pubkey(), token, metadata).await?;
        self.ensure_balance(self.issuance_cost(&plan, token).await?)
            .await?;

        let create_signature = self.submit_creation(mint, &plan).await?;

        let snapshot = self.fetch_mint(&plan.mint).await?;
        info!(
            mint = %snapshot.address,
            decimals = snapshot.decimals,
            self_hosted_metadata = snapshot.metadata_is_self_hosted(),
            "mint state confirmed"
        );

        let payer = self.payer();
        let (mint_signature, token_account) = if token.initial_supply > 0 {
            let outcome = self
                .mint_to(&plan.mint, &payer, token.initial_supply, snapshot.decimals)
                .await?;
            (Some(outcome.signature), outcome.token_account)
        } else {
            info!("initial supply is zero, skipping mint");
            (None, instructions::associated_token_address(&payer, &plan.mint))
        };

        let balance = if mint_signature.is_some() {
            self.fetch_token_account(&token_account).await?.amount
        } else {
            0
        };

        Ok(IssuanceReport {
            create_signature,
            mint_signature,
            token_account,
            ui_balance: state::ui_amount(balance, snapshot.decimals),
            mint: snapshot,
            balance,
        })
    }

    /// Data of an account that must belong to Token-2022
    async fn owned_data(&self, address: &Pubkey) -> IssuerResult<Vec<u8>> {
        let account = self
            .client
            .get_account(address)
            .await?
            .ok_or(IssuerError::AccountNotFound(*address))?;

        if account.owner != instructions::token_program_id() {
            return Err(IssuerError::invalid_account(
                *address,
                format!("owned by {}, not Token-2022", account.owner),
            ));
        }
        Ok(account.data)
    }

    async fn ensure_balance(&self, required: u64) -> IssuerResult<()> {
        let available = self.client.get_balance(&self.payer()).await?;
        if available < required {
            return Err(IssuerError::InsufficientBalance {
                required,
                available,
            });
        }
        debug!(required, available, "payer balance covers the run");
        Ok(())
    }

    async fn rent_shortfall(&self, address: &Pubkey, new_len: usize) -> IssuerResult<Option<u64>> {
        let required = self.client.minimum_balance_for_rent_exemption(new_len).await?;
        let current = self.client.get_balance(address).await?;
        Ok(required.checked_sub(current).filter(|shortfall| *shortfall > 0))
    }
}
