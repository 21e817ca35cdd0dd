// src/crypto/mod.rs

//! Core Cryptography Module
//!
//! The deterministic half of the wallet: everything in here is a pure
//! function of its inputs.
//!
//! - **Mnemonic**: BIP-39 generation, validation and seed derivation via [`WalletMnemonic`].
//! - **HD Derivation**: BIP-32 master/child key tree via [`HdDeriver`] and [`ExtendedKey`].
//! - **EVM Keys**: BIP-44 private key, public key and EIP-55 address via [`EvmKeyDeriver`].
//! - **Paths**: pre-built and custom BIP-44 path builders via [`DerivationPaths`].

pub mod hd;
pub mod keys;
pub mod mnemonic;
pub mod paths;

// Re-exports for cleaner API access
pub use hd::{ExtendedKey, HdDeriver, HARDENED_OFFSET};
pub use keys::{EvmKeyDeriver, WalletKeys};
pub use mnemonic::{WalletMnemonic, WordCount};
pub use paths::DerivationPaths;
