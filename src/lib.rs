// src/lib.rs

//! # evault-core
//!
//! Key-management core of a non-custodial EVM wallet. It turns secret
//! entropy into a recoverable mnemonic, deterministically derives keys
//! and addresses from it, encrypts the mnemonic at rest under a user
//! PIN, and signs transactions - without ever letting the private key or
//! mnemonic outlive the operation that needs it.
//!
//! ## Layers
//!
//! - [`crypto`] - the deterministic standards: BIP-39 mnemonics, BIP-32
//!   HD derivation, BIP-44 EVM keys and EIP-55 addresses.
//! - [`vault`] - at-rest protection: PIN key derivation, AES-256-GCM,
//!   the key-value store boundary, lock-state orchestration and scoped
//!   use-then-forget secret access.
//! - [`chains`] - offline EIP-155 transaction signing.
//!
//! ## Secret lifecycle
//!
//! Every secret-bearing value (mnemonic, seed, extended key, private
//! key) is created on demand inside a bounded operation, moved by value
//! into the next step, and zeroed before its owning scope exits - on
//! success and on failure. The sanctioned way to touch a secret from the
//! outside is a scoped closure, after the session has been unlocked:
//!
//! ```no_run
//! use evault_core::vault::{MemoryStore, SecureVault, VaultConfig};
//! use evault_core::chains::evm::{EvmSigner, EvmTransaction};
//! use evault_core::{VaultError, WalletResult};
//! use alloy::primitives::U256;
//!
//! fn send(vault: &SecureVault<MemoryStore>, tx: &EvmTransaction, pin: &str) -> WalletResult<String> {
//!     if !vault.unlock(pin)? {
//!         return Err(VaultError::AuthenticationFailed.into());
//!     }
//!     vault.with_private_key(pin, 0, |key| {
//!         let signed = EvmSigner::sign(tx, key)?;
//!         Ok(signed.raw_transaction)
//!     })
//! }
//! ```

pub mod chains;
pub mod crypto;
pub mod error;
pub mod vault;

// Re-exports for cleaner API access
pub use chains::evm::{EvmSigner, EvmTransaction, SignedTransaction};
pub use crypto::{
    DerivationPaths, EvmKeyDeriver, ExtendedKey, HdDeriver, WalletKeys, WalletMnemonic, WordCount,
};
pub use error::{
    CryptoError, MnemonicError, StorageError, TransactionError, VaultError, WalletError,
    WalletResult,
};
pub use vault::{
    KeyValueStore, LockState, MemoryStore, MnemonicHandoff, SecureVault, VaultConfig, VaultCrypto,
};
