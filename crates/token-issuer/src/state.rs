//! Decoded views of on-chain mint and token account state

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use spl_token_2022::{
    extension::{metadata_pointer::MetadataPointer, BaseStateWithExtensions, StateWithExtensions},
    state::{Account, Mint},
};
use spl_token_metadata_interface::state::TokenMetadata;

use crate::error::{IssuerError, IssuerResult};

/// Mint account with its metadata extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintSnapshot {
    #[serde(with = "display_serde")]
    pub address: Pubkey,
    pub decimals: u8,
    pub supply: u64,
    #[serde(with = "display_serde::option")]
    pub mint_authority: Option<Pubkey>,
    #[serde(with = "display_serde::option")]
    pub freeze_authority: Option<Pubkey>,
    pub metadata_pointer: Option<MetadataPointerSnapshot>,
    pub metadata: Option<MetadataSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPointerSnapshot {
    #[serde(with = "display_serde::option")]
    pub authority: Option<Pubkey>,
    #[serde(with = "display_serde::option")]
    pub metadata_address: Option<Pubkey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSnapshot {
    #[serde(with = "display_serde::option")]
    pub update_authority: Option<Pubkey>,
    #[serde(with = "display_serde")]
    pub mint: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub additional_metadata: Vec<(String, String)>,
}

/// Token account holding a balance of some mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAccountSnapshot {
    #[serde(with = "display_serde")]
    pub address: Pubkey,
    #[serde(with = "display_serde")]
    pub mint: Pubkey,
    #[serde(with = "display_serde")]
    pub owner: Pubkey,
    pub amount: u64,
}

impl MintSnapshot {
    /// Whether the metadata pointer designates the mint itself
    pub fn metadata_is_self_hosted(&self) -> bool {
        self.metadata_pointer
            .as_ref()
            .and_then(|pointer| pointer.metadata_address)
            == Some(self.address)
    }
}

impl MetadataSnapshot {
    /// Value of a custom key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.additional_metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl From<&TokenMetadata> for MetadataSnapshot {
    fn from(metadata: &TokenMetadata) -> Self {
        Self {
            update_authority: metadata.update_authority.into(),
            mint: metadata.mint,
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            uri: metadata.uri.clone(),
            additional_metadata: metadata.additional_metadata.clone(),
        }
    }
}

/// Decode a Token-2022 mint account
///
/// Missing pointer or metadata extensions decode as `None`.
pub fn decode_mint(address: &Pubkey, data: &[u8]) -> IssuerResult<MintSnapshot> {
    let state = StateWithExtensions::<Mint>::unpack(data)
        .map_err(|e| IssuerError::invalid_account(*address, format!("not a mint: {}", e)))?;

    let metadata_pointer = state
        .get_extension::<MetadataPointer>()
        .ok()
        .map(|pointer| MetadataPointerSnapshot {
            authority: pointer.authority.into(),
            metadata_address: pointer.metadata_address.into(),
        });

    let metadata = state
        .get_variable_len_extension::<TokenMetadata>()
        .ok()
        .map(|metadata| MetadataSnapshot::from(&metadata));

    Ok(MintSnapshot {
        address: *address,
        decimals: state.base.decimals,
        supply: state.base.supply,
        mint_authority: state.base.mint_authority.into(),
        freeze_authority: state.base.freeze_authority.into(),
        metadata_pointer,
        metadata,
    })
}

/// Decode a Token-2022 token account
pub fn decode_token_account(address: &Pubkey, data: &[u8]) -> IssuerResult<TokenAccountSnapshot> {
    let state = StateWithExtensions::<Account>::unpack(data).map_err(|e| {
        IssuerError::invalid_account(*address, format!("not a token account: {}", e))
    })?;

    Ok(TokenAccountSnapshot {
        address: *address,
        mint: state.base.mint,
        owner: state.base.owner,
        amount: state.base.amount,
    })
}

/// Raw amount as a decimal string, e.g. `1000000000` at 2 decimals is `10000000.00`
pub fn ui_amount(amount: u64, decimals: u8) -> String {
    spl_token_2022::amount_to_ui_amount_string(amount, decimals)
}

/// Parse a decimal string into raw units
pub fn parse_ui_amount(ui_amount: &str, decimals: u8) -> IssuerResult<u64> {
    Ok(spl_token_2022::try_ui_amount_into_amount(
        ui_amount.to_string(),
        decimals,
    )?)
}

// Pubkeys and signatures serialize as base58 strings in reports
pub(crate) mod display_serde {
    use std::fmt::Display;

    use serde::Serializer;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub mod option {
        use super::*;

        pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
        where
            T: Display,
            S: Serializer,
        {
            match value {
                Some(value) => serializer.serialize_some(&value.to_string()),
                None => serializer.serialize_none(),
            }
        }
    }
}
