// src/chains/evm/mod.rs

//! Ethereum Virtual Machine (EVM) Chain Support
//!
//! Offline signing for Ethereum and EVM-compatible chains (BSC, Polygon,
//! Base, ...). Replay protection between chains comes from the EIP-155
//! chain id folded into the signature; nothing here touches the network.

pub mod signer;

// Re-exports for cleaner API access
pub use signer::{EvmSigner, EvmTransaction, SignedTransaction};
