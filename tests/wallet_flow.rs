// tests/wallet_flow.rs
//
// End-to-end flow across module boundaries: generate/handoff, create,
// unlock, scoped signing, delete.

use std::time::Duration;

use alloy::primitives::U256;
use evault_core::chains::evm::{EvmSigner, EvmTransaction};
use evault_core::vault::{MemoryStore, MnemonicHandoff, SecureVault, VaultConfig};
use evault_core::{VaultError, WalletError, WalletMnemonic};

const PIN: &str = "4071";

fn transfer(chain_id: u64) -> EvmTransaction {
    EvmTransaction {
        to: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
        value: U256::from(1_000_000_000_000_000_000u128),
        gas_price: 1_000_000_000,
        gas_limit: 21_000,
        nonce: 0,
        chain_id,
        data: Vec::new(),
    }
}

#[test]
fn generate_handoff_create_unlock_sign_delete() {
    // Generate screen draws the phrase and hands it off
    let generated = WalletMnemonic::generate().unwrap();
    let phrase_copy = generated.phrase().to_string();
    let handoff = MnemonicHandoff::new(generated, Duration::from_secs(60));

    // Confirm screen consumes the token exactly once and creates the wallet
    let vault = SecureVault::new(MemoryStore::new(), VaultConfig::default());
    let mnemonic = handoff.consume().unwrap();
    assert_eq!(mnemonic.phrase(), phrase_copy);
    let address = vault.create_wallet(&mnemonic, PIN).unwrap();
    assert!(address.starts_with("0x"));
    assert_eq!(vault.address().unwrap().as_deref(), Some(address.as_str()));

    // Fresh wallets start locked; PIN verification unlocks the session
    assert!(!vault.is_unlocked().unwrap());
    assert!(!vault.unlock("0000").unwrap());
    assert!(vault.unlock(PIN).unwrap());

    // Scoped signing: the key exists only inside the closure
    let mainnet = vault
        .with_private_key(PIN, 0, |key| EvmSigner::sign(&transfer(1), key))
        .unwrap();
    let testnet = vault
        .with_private_key(PIN, 0, |key| EvmSigner::sign(&transfer(11155111), key))
        .unwrap();
    assert_ne!(mainnet.v, testnet.v);
    assert_ne!(mainnet.raw_transaction, testnet.raw_transaction);

    // One wallet per device
    let second = WalletMnemonic::generate().unwrap();
    assert_eq!(
        vault.create_wallet(&second, PIN).unwrap_err(),
        WalletError::Vault(VaultError::WalletAlreadyExists)
    );

    // Delete leaves nothing behind
    vault.delete_wallet().unwrap();
    assert!(!vault.has_wallet().unwrap());
    assert_eq!(vault.address().unwrap(), None);
}

#[test]
fn import_recovers_same_address_as_creation() {
    let vault_a = SecureVault::new(MemoryStore::new(), VaultConfig::default());
    let mnemonic = WalletMnemonic::generate().unwrap();
    let created = vault_a.create_wallet(&mnemonic, PIN).unwrap();

    // Import the same phrase on a "new device", messy formatting included
    let vault_b = SecureVault::new(MemoryStore::new(), VaultConfig::default());
    let messy = format!("  {}  ", mnemonic.phrase().to_uppercase());
    let imported = vault_b.import_wallet(&messy, "7777").unwrap();

    assert_eq!(created, imported);
}
