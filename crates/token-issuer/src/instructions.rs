//! Instruction builders for Token-2022 mints carrying their own metadata
//!
//! The creation bundle must keep this order, enforced by the token program:
//! 1. system `create_account` (owner = Token-2022)
//! 2. metadata pointer `initialize` (before the mint is initialized)
//! 3. `initialize_mint`
//! 4. token metadata `initialize` (needs an initialized mint)
//! 5. one `update_field` per custom key

use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use spl_token_2022::{
    extension::{metadata_pointer, ExtensionType},
    state::{Account, Mint},
};
use spl_token_metadata_interface::{
    instruction as metadata_instruction,
    state::{Field, TokenMetadata},
};

use crate::error::IssuerResult;

/// Base fee charged per transaction signature
pub const LAMPORTS_PER_SIGNATURE: u64 = 5_000;

/// Token program every mint created here belongs to
pub fn token_program_id() -> Pubkey {
    spl_token_2022::id()
}

/// Space of an associated token account for a mint whose only extension is
/// the metadata pointer
///
/// The associated token program always adds `ImmutableOwner`; the pointer
/// requires no account-side extension.
pub fn token_account_len() -> IssuerResult<usize> {
    Ok(ExtensionType::try_calculate_account_len::<Account>(&[
        ExtensionType::ImmutableOwner,
    ])?)
}

/// Parameters of a new mint and its metadata
#[derive(Debug, Clone)]
pub struct CreateMintParams {
    pub mint: Pubkey,
    /// Funds the new account
    pub payer: Pubkey,
    pub mint_authority: Pubkey,
    /// Authority over both the metadata pointer and the metadata record
    pub update_authority: Pubkey,
    pub freeze_authority: Option<Pubkey>,
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub additional: Vec<(String, String)>,
}

impl CreateMintParams {
    /// Metadata record as it will be stored once every instruction has run
    pub fn token_metadata(&self) -> IssuerResult<TokenMetadata> {
        Ok(TokenMetadata {
            update_authority: Some(self.update_authority).try_into()?,
            mint: self.mint,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            uri: self.uri.clone(),
            additional_metadata: self.additional.clone(),
        })
    }
}

/// Byte sizes of a mint account with an embedded metadata record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintLayout {
    /// Space allocated by `create_account`: base mint plus the metadata pointer
    pub account_len: usize,
    /// TLV entry (type + length + packed record) appended by metadata initialization
    pub metadata_len: usize,
}

impl MintLayout {
    pub fn for_metadata(metadata: &TokenMetadata) -> IssuerResult<Self> {
        let account_len =
            ExtensionType::try_calculate_account_len::<Mint>(&[ExtensionType::MetadataPointer])?;
        let metadata_len = metadata.tlv_size_of()?;

        Ok(Self {
            account_len,
            metadata_len,
        })
    }

    /// Length the rent-exempt deposit is computed for
    ///
    /// The account is created at `account_len`; the token program reallocates
    /// it when the metadata is written, so the deposit covers the final size.
    pub fn rent_len(&self) -> usize {
        self.account_len + self.metadata_len
    }
}

/// Build the full creation bundle for a mint with embedded metadata
pub fn create_mint_with_metadata(
    params: &CreateMintParams,
    layout: &MintLayout,
    lamports: u64,
) -> IssuerResult<Vec<Instruction>> {
    let program_id = token_program_id();

    let mut instructions = vec![
        system_instruction::create_account(
            &params.payer,
            &params.mint,
            lamports,
            layout.account_len as u64,
            &program_id,
        ),
        metadata_pointer::instruction::initialize(
            &program_id,
            &params.mint,
            Some(params.update_authority),
            Some(params.mint),
        )?,
        spl_token_2022::instruction::initialize_mint(
            &program_id,
            &params.mint,
            &params.mint_authority,
            params.freeze_authority.as_ref(),
            params.decimals,
        )?,
        metadata_instruction::initialize(
            &program_id,
            &params.mint,
            &params.update_authority,
            &params.mint,
            &params.mint_authority,
            params.name.clone(),
            params.symbol.clone(),
            params.uri.clone(),
        ),
    ];

    for (key, value) in &params.additional {
        instructions.push(update_metadata_field(
            &params.mint,
            &params.update_authority,
            Field::Key(key.clone()),
            value.clone(),
        ));
    }

    Ok(instructions)
}

/// Set a base field or custom key of the metadata stored in `mint`
pub fn update_metadata_field(
    mint: &Pubkey,
    update_authority: &Pubkey,
    field: Field,
    value: String,
) -> Instruction {
    metadata_instruction::update_field(&token_program_id(), mint, update_authority, field, value)
}

/// Remove a custom key from the metadata stored in `mint`
pub fn remove_metadata_key(
    mint: &Pubkey,
    update_authority: &Pubkey,
    key: String,
    idempotent: bool,
) -> Instruction {
    metadata_instruction::remove_key(
        &token_program_id(),
        mint,
        update_authority,
        key,
        idempotent,
    )
}

/// Map a field name to a metadata field; anything but the base fields is a custom key
pub fn parse_field(name: &str) -> Field {
    match name {
        "name" => Field::Name,
        "symbol" => Field::Symbol,
        "uri" => Field::Uri,
        key => Field::Key(key.to_string()),
    }
}

/// Associated token account of `owner` for a Token-2022 `mint`
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(owner, mint, &token_program_id())
}

/// Create `owner`'s associated token account, succeeding if it already exists
pub fn create_associated_token_account(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    create_associated_token_account_idempotent(payer, owner, mint, &token_program_id())
}

/// Mint `amount` raw units, letting the program confirm the decimals
pub fn mint_to(
    mint: &Pubkey,
    destination: &Pubkey,
    mint_authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> IssuerResult<Instruction> {
    Ok(spl_token_2022::instruction::mint_to_checked(
        &token_program_id(),
        mint,
        destination,
        mint_authority,
        &[],
        amount,
        decimals,
    )?)
}
