// src/vault/mod.rs

//! Vault Module - at-rest protection of the mnemonic
//!
//! Everything persisted goes through here, and everything persisted is
//! encrypted: the mnemonic never touches the key-value store in plaintext.
//!
//! - **Crypto**: PIN key derivation and AES-256-GCM via [`VaultCrypto`].
//! - **Store boundary**: the [`KeyValueStore`] trait the platform keychain implements.
//! - **Orchestration**: single-wallet lifecycle and scoped secret access via [`SecureVault`].
//! - **Lock state**: session locking with inactivity auto-lock via [`LockStateMachine`].
//! - **Handoff**: one-shot mnemonic transfer between creation steps via [`MnemonicHandoff`].

pub mod crypto;
pub mod handoff;
pub mod lock_state;
pub mod secure_vault;
pub mod store;

// Re-exports for cleaner API access
pub use crypto::{EncryptedBlob, VaultCrypto};
pub use handoff::MnemonicHandoff;
pub use lock_state::{LockState, LockStateMachine};
pub use secure_vault::{SecureVault, VaultConfig};
pub use store::{KeyValueStore, MemoryStore};
