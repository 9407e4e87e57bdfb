//! Issuance pipeline tests against the in-memory ledger

use std::sync::Arc;

use solana_sdk::{
    pubkey::Pubkey,
    rent::Rent,
    signature::{Keypair, Signer},
    system_program,
};
use spl_token_2022::instruction::TokenInstruction;
use spl_token_metadata_interface::{
    instruction::TokenMetadataInstruction,
    state::{Field, TokenMetadata},
};
use token_issuer::{
    instructions::{
        associated_token_address, token_account_len, MintLayout, LAMPORTS_PER_SIGNATURE,
    },
    testing::{pack_mint_with_metadata, pack_token_account, MockLedger},
    IssuerError, Issuer, MetadataConfig, TokenConfig,
};

const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

const LEGACY_TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

fn rent(len: usize) -> u64 {
    Rent::default().minimum_balance(len)
}

/// System transfer data: u32 discriminant 2, then lamports
fn transfer_lamports(data: &[u8]) -> u64 {
    assert_eq!(&data[..4], &2u32.to_le_bytes());
    u64::from_le_bytes(data[4..12].try_into().unwrap())
}

struct Harness {
    issuer: Issuer<MockLedger>,
    payer: Pubkey,
    mint: Keypair,
}

impl Harness {
    fn new() -> Self {
        let payer = Arc::new(Keypair::new());
        let payer_pubkey = payer.pubkey();
        let ledger = MockLedger::new();
        ledger.set_balance(payer_pubkey, 10 * LAMPORTS_PER_SOL);

        Self {
            issuer: Issuer::new(ledger, payer),
            payer: payer_pubkey,
            mint: Keypair::new(),
        }
    }

    fn ledger(&self) -> &MockLedger {
        self.issuer.client()
    }

    fn metadata(&self, config: &MetadataConfig) -> TokenMetadata {
        TokenMetadata {
            update_authority: Some(self.payer).try_into().unwrap(),
            mint: self.mint.pubkey(),
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            uri: config.uri.clone(),
            additional_metadata: config.additional.clone(),
        }
    }

    fn mint_data(&self, decimals: u8, supply: u64) -> Vec<u8> {
        self.mint_data_with(&MetadataConfig::default(), decimals, supply)
    }

    fn mint_data_with(&self, config: &MetadataConfig, decimals: u8, supply: u64) -> Vec<u8> {
        let metadata = self.metadata(config);
        pack_mint_with_metadata(&self.payer, decimals, supply, &metadata).unwrap()
    }

    /// Make the mint appear after the creation transaction and the funded
    /// token account after the mint transaction
    fn land_issuance(&self, token: &TokenConfig) {
        let mint = self.mint.pubkey();
        self.ledger()
            .set_account_after(0, mint, self.mint_data(token.decimals, 0));
        self.ledger().set_account_after(
            1,
            associated_token_address(&self.payer, &mint),
            pack_token_account(&mint, &self.payer, token.initial_supply),
        );
    }
}

#[tokio::test]
async fn test_issue_creates_mint_and_funds_payer() {
    let harness = Harness::new();
    let token = TokenConfig::default();
    let metadata = MetadataConfig::default();
    harness.land_issuance(&token);

    let report = harness
        .issuer
        .issue(&harness.mint, &token, &metadata)
        .await
        .unwrap();

    let mint = harness.mint.pubkey();
    assert_eq!(report.mint.address, mint);
    assert_eq!(report.mint.decimals, 2);
    assert_eq!(report.mint.mint_authority, Some(harness.payer));
    assert!(report.mint.metadata_is_self_hosted());

    let onchain = report.mint.metadata.as_ref().unwrap();
    assert_eq!(onchain.name, "ArtScienceTest");
    assert_eq!(onchain.symbol, "ASRTEST");
    assert_eq!(onchain.uri, metadata.uri);
    assert_eq!(onchain.get("description"), Some("Only Possible On Solana"));

    assert_eq!(report.balance, 1_000_000_000);
    assert_eq!(report.ui_balance, "10000000.00");
    assert_eq!(
        report.token_account,
        associated_token_address(&harness.payer, &mint)
    );
    assert!(report.mint_signature.is_some());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["createSignature"], report.create_signature.to_string());
    assert_eq!(json["tokenAccount"], report.token_account.to_string());
}

#[tokio::test]
async fn test_creation_transaction_shape() {
    let harness = Harness::new();
    let token = TokenConfig::default();
    harness.land_issuance(&token);

    harness
        .issuer
        .issue(&harness.mint, &token, &MetadataConfig::default())
        .await
        .unwrap();

    let sent = harness.ledger().sent();
    assert_eq!(sent.len(), 2);

    let create = &sent[0];
    assert_eq!(create.signers, vec![harness.payer, harness.mint.pubkey()]);
    assert_eq!(create.instructions.len(), 5);
    assert_eq!(create.instructions[0].program_id, system_program::id());
    assert!(create.instructions[1..]
        .iter()
        .all(|ix| ix.program_id == spl_token_2022::id()));

    match TokenMetadataInstruction::unpack(&create.instructions[4].data).unwrap() {
        TokenMetadataInstruction::UpdateField(update) => {
            assert_eq!(update.field, Field::Key("description".to_string()));
        }
        _ => panic!("last instruction should set the custom field"),
    }

    let mint_tx = &sent[1];
    assert_eq!(mint_tx.signers, vec![harness.payer]);
    assert_eq!(mint_tx.instructions.len(), 2);
    assert_eq!(
        mint_tx.instructions[0].program_id,
        spl_associated_token_account::id()
    );
    assert_eq!(mint_tx.instructions[1].program_id, spl_token_2022::id());
}

#[tokio::test]
async fn test_rent_covers_account_and_metadata() {
    let harness = Harness::new();
    let metadata = MetadataConfig::default();

    let plan = harness
        .issuer
        .plan_creation(harness.mint.pubkey(), &TokenConfig::default(), &metadata)
        .await
        .unwrap();

    let expected_layout = MintLayout::for_metadata(&harness.metadata(&metadata)).unwrap();
    assert_eq!(plan.layout, expected_layout);
    assert_eq!(
        plan.lamports,
        Rent::default().minimum_balance(expected_layout.rent_len())
    );
    assert!(harness.ledger().sent().is_empty());
}

#[test]
fn test_plan_with_blocking_runtime() {
    let harness = Harness::new();
    let mut metadata = MetadataConfig::default();
    metadata.additional.clear();

    let plan = tokio_test::block_on(harness.issuer.plan_creation(
        harness.mint.pubkey(),
        &TokenConfig::default(),
        &metadata,
    ))
    .unwrap();

    assert_eq!(plan.instructions.len(), 4);
}

#[tokio::test]
async fn test_existing_token_account_is_reused() {
    let harness = Harness::new();
    let token = TokenConfig::default();
    let mint = harness.mint.pubkey();
    let token_account = associated_token_address(&harness.payer, &mint);

    harness
        .ledger()
        .set_account(mint, harness.mint_data(token.decimals, 0));
    harness
        .ledger()
        .set_account(token_account, pack_token_account(&mint, &harness.payer, 0));

    let outcome = harness
        .issuer
        .mint_to(&mint, &harness.payer, 500, token.decimals)
        .await
        .unwrap();

    assert!(!outcome.created_account);
    assert_eq!(outcome.token_account, token_account);

    let sent = harness.ledger().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].instructions.len(), 1);
    assert_eq!(sent[0].instructions[0].program_id, spl_token_2022::id());
}

#[tokio::test]
async fn test_insufficient_balance_sends_nothing() {
    let harness = Harness::new();
    harness.ledger().set_balance(harness.payer, 1_000);

    let err = harness
        .issuer
        .issue(
            &harness.mint,
            &TokenConfig::default(),
            &MetadataConfig::default(),
        )
        .await
        .unwrap_err();

    match err {
        IssuerError::InsufficientBalance {
            required,
            available,
        } => {
            assert_eq!(available, 1_000);
            assert!(required > available);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(harness.ledger().sent().is_empty());
}

#[tokio::test]
async fn test_rejected_creation_halts_pipeline() {
    let harness = Harness::new();
    harness.land_issuance(&TokenConfig::default());
    harness
        .ledger()
        .fail_at(0, "Transaction simulation failed: custom program error: 0x0");

    let err = harness
        .issuer
        .issue(
            &harness.mint,
            &TokenConfig::default(),
            &MetadataConfig::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IssuerError::Rpc(ref msg) if msg.contains("custom program error")));
    assert!(harness.ledger().sent().is_empty());
}

#[tokio::test]
async fn test_rejected_mint_surfaces_error_after_creation() {
    let harness = Harness::new();
    harness.land_issuance(&TokenConfig::default());
    harness.ledger().fail_at(1, "insufficient funds for fee");

    let err = harness
        .issuer
        .issue(
            &harness.mint,
            &TokenConfig::default(),
            &MetadataConfig::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IssuerError::Rpc(_)));
    assert_eq!(harness.ledger().sent().len(), 1);
}

#[tokio::test]
async fn test_zero_supply_skips_minting() {
    let harness = Harness::new();
    let token = TokenConfig {
        initial_supply: 0,
        ..TokenConfig::default()
    };
    harness.land_issuance(&token);

    let report = harness
        .issuer
        .issue(&harness.mint, &token, &MetadataConfig::default())
        .await
        .unwrap();

    assert!(report.mint_signature.is_none());
    assert_eq!(report.balance, 0);
    assert_eq!(report.ui_balance, "0.00");
    assert_eq!(harness.ledger().sent().len(), 1);
}

#[tokio::test]
async fn test_fresh_mint_keypairs_are_independent() {
    let first = Harness::new();
    let second = Harness::new();
    let token = TokenConfig::default();
    first.land_issuance(&token);
    second.land_issuance(&token);

    let a = first
        .issuer
        .issue(&first.mint, &token, &MetadataConfig::default())
        .await
        .unwrap();
    let b = second
        .issuer
        .issue(&second.mint, &token, &MetadataConfig::default())
        .await
        .unwrap();

    assert_ne!(a.mint.address, b.mint.address);
    assert_ne!(a.token_account, b.token_account);
    assert_ne!(a.create_signature, b.create_signature);
}

#[tokio::test]
async fn test_missing_mint_is_reported() {
    let harness = Harness::new();
    let mint = harness.mint.pubkey();

    let err = harness.issuer.fetch_mint(&mint).await.unwrap_err();
    assert!(matches!(err, IssuerError::AccountNotFound(address) if address == mint));
}

#[tokio::test]
async fn test_growing_field_tops_up_rent() {
    let harness = Harness::new();
    let mint = harness.mint.pubkey();
    let data = harness.mint_data(2, 0);
    let data_len = data.len();
    harness
        .ledger()
        .set_balance(mint, Rent::default().minimum_balance(data.len()));
    harness.ledger().set_account(mint, data);

    harness
        .issuer
        .update_field(&mint, "website", "https://example.com")
        .await
        .unwrap();

    let mut grown = MetadataConfig::default();
    grown
        .additional
        .push(("website".to_string(), "https://example.com".to_string()));
    let new_len = harness.mint_data_with(&grown, 2, 0).len();
    assert!(new_len > data_len);

    let sent = harness.ledger().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].instructions.len(), 2);

    let transfer = &sent[0].instructions[0];
    assert_eq!(transfer.program_id, system_program::id());
    assert_eq!(transfer.accounts[0].pubkey, harness.payer);
    assert_eq!(transfer.accounts[1].pubkey, mint);
    assert_eq!(
        transfer_lamports(&transfer.data),
        rent(new_len) - rent(data_len)
    );

    match TokenMetadataInstruction::unpack(&sent[0].instructions[1].data).unwrap() {
        TokenMetadataInstruction::UpdateField(update) => {
            assert_eq!(update.field, Field::Key("website".to_string()));
            assert_eq!(update.value, "https://example.com");
        }
        _ => panic!("expected UpdateField"),
    }
}

#[tokio::test]
async fn test_same_length_update_needs_no_top_up() {
    let harness = Harness::new();
    let mint = harness.mint.pubkey();
    let data = harness.mint_data(2, 0);
    harness
        .ledger()
        .set_balance(mint, Rent::default().minimum_balance(data.len()));
    harness.ledger().set_account(mint, data);

    harness
        .issuer
        .update_field(&mint, "description", "Also Possible On Solana")
        .await
        .unwrap();

    let sent = harness.ledger().sent();
    assert_eq!(sent[0].instructions.len(), 1);
}

#[tokio::test]
async fn test_remove_field() {
    let harness = Harness::new();
    let mint = harness.mint.pubkey();

    harness
        .issuer
        .remove_field(&mint, "description", true)
        .await
        .unwrap();

    let sent = harness.ledger().sent();
    match TokenMetadataInstruction::unpack(&sent[0].instructions[0].data).unwrap() {
        TokenMetadataInstruction::RemoveKey(remove) => {
            assert_eq!(remove.key, "description");
            assert!(remove.idempotent);
        }
        _ => panic!("expected RemoveKey"),
    }
}

#[tokio::test]
async fn test_rent_only_balance_cannot_start_issuance() {
    let harness = Harness::new();
    let token = TokenConfig::default();
    let metadata = MetadataConfig::default();
    harness.land_issuance(&token);

    let plan = harness
        .issuer
        .plan_creation(harness.mint.pubkey(), &token, &metadata)
        .await
        .unwrap();
    harness.ledger().set_balance(harness.payer, plan.lamports);

    let err = harness
        .issuer
        .issue(&harness.mint, &token, &metadata)
        .await
        .unwrap_err();

    match err {
        IssuerError::InsufficientBalance {
            required,
            available,
        } => {
            assert_eq!(available, plan.lamports);
            assert_eq!(
                required,
                plan.lamports + 3 * LAMPORTS_PER_SIGNATURE + rent(token_account_len().unwrap())
            );
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(harness.ledger().sent().is_empty());
}

#[tokio::test]
async fn test_exact_issuance_cost_is_enough() {
    let harness = Harness::new();
    let token = TokenConfig::default();
    let metadata = MetadataConfig::default();
    harness.land_issuance(&token);

    let plan = harness
        .issuer
        .plan_creation(harness.mint.pubkey(), &token, &metadata)
        .await
        .unwrap();
    let cost = harness.issuer.issuance_cost(&plan, &token).await.unwrap();
    harness.ledger().set_balance(harness.payer, cost);

    let report = harness
        .issuer
        .issue(&harness.mint, &token, &metadata)
        .await
        .unwrap();

    assert_eq!(report.balance, token.initial_supply);
    assert_eq!(harness.ledger().sent().len(), 2);
}

#[tokio::test]
async fn test_zero_supply_budget_skips_token_account() {
    let harness = Harness::new();
    let token = TokenConfig {
        initial_supply: 0,
        ..TokenConfig::default()
    };

    let plan = harness
        .issuer
        .plan_creation(harness.mint.pubkey(), &token, &MetadataConfig::default())
        .await
        .unwrap();
    let cost = harness.issuer.issuance_cost(&plan, &token).await.unwrap();

    assert_eq!(cost, plan.lamports + 2 * LAMPORTS_PER_SIGNATURE);
}

#[tokio::test]
async fn test_create_mint_alone_needs_rent_and_creation_fees() {
    let harness = Harness::new();
    let token = TokenConfig::default();
    let metadata = MetadataConfig::default();

    let plan = harness
        .issuer
        .plan_creation(harness.mint.pubkey(), &token, &metadata)
        .await
        .unwrap();

    harness
        .ledger()
        .set_balance(harness.payer, plan.lamports + LAMPORTS_PER_SIGNATURE);
    let err = harness
        .issuer
        .create_mint(&harness.mint, &token, &metadata)
        .await
        .unwrap_err();
    assert!(matches!(err, IssuerError::InsufficientBalance { .. }));
    assert!(harness.ledger().sent().is_empty());

    harness
        .ledger()
        .set_balance(harness.payer, plan.lamports + 2 * LAMPORTS_PER_SIGNATURE);
    let (_, created) = harness
        .issuer
        .create_mint(&harness.mint, &token, &metadata)
        .await
        .unwrap();
    assert_eq!(created.mint, harness.mint.pubkey());
    assert_eq!(harness.ledger().sent().len(), 1);
}

#[tokio::test]
async fn test_overfunded_mint_needs_no_top_up() {
    let harness = Harness::new();
    let mint = harness.mint.pubkey();
    let data = harness.mint_data(2, 0);
    harness
        .ledger()
        .set_balance(mint, rent(data.len()) + LAMPORTS_PER_SOL);
    harness.ledger().set_account(mint, data);

    harness
        .issuer
        .update_field(&mint, "website", "https://example.com")
        .await
        .unwrap();

    let sent = harness.ledger().sent();
    assert_eq!(sent[0].instructions.len(), 1);
    assert_eq!(sent[0].instructions[0].program_id, spl_token_2022::id());
}

#[tokio::test]
async fn test_mint_owned_by_legacy_program_is_rejected() {
    let harness = Harness::new();
    let mint = harness.mint.pubkey();
    let legacy: Pubkey = LEGACY_TOKEN_PROGRAM.parse().unwrap();
    harness
        .ledger()
        .set_account_with_owner(mint, legacy, harness.mint_data(2, 0));

    let err = harness.issuer.fetch_mint(&mint).await.unwrap_err();
    assert!(matches!(err, IssuerError::InvalidAccountData { account, .. } if account == mint));

    let err = harness
        .issuer
        .update_field(&mint, "website", "https://example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, IssuerError::InvalidAccountData { .. }));
    assert!(harness.ledger().sent().is_empty());
}

#[tokio::test]
async fn test_mint_to_uses_given_decimals_without_reading_mint() {
    let harness = Harness::new();
    let mint = harness.mint.pubkey();

    let outcome = harness
        .issuer
        .mint_to(&mint, &harness.payer, 250, 6)
        .await
        .unwrap();
    assert!(outcome.created_account);

    let sent = harness.ledger().sent();
    assert_eq!(sent[0].instructions.len(), 2);
    match TokenInstruction::unpack(&sent[0].instructions[1].data).unwrap() {
        TokenInstruction::MintToChecked { amount, decimals } => {
            assert_eq!(amount, 250);
            assert_eq!(decimals, 6);
        }
        _ => panic!("expected MintToChecked"),
    }
}
