// src/chains/evm/signer.rs
//
// EVM Transaction Signer - Offline EIP-155 Legacy Signing
// Builds the pre-image [nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0],
// signs it, and re-encodes with v = chainId*2 + 35 + recoveryId.

use crate::error::{CryptoError, TransactionError, WalletError, WalletResult};
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::signers::local::LocalSigner;
use alloy::signers::SignerSync;
use k256::ecdsa::SigningKey;
use zeroize::Zeroizing;

/// Unsigned transaction fields as the host hands them over.
///
/// `value` is in wei, `gas_price` in wei per gas. `data` is the optional
/// call payload (empty for plain transfers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmTransaction {
    pub to: String,
    pub value: U256,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub nonce: u64,
    pub chain_id: u64,
    pub data: Vec<u8>,
}

/// Signed output. Never carries the private key.
///
/// `raw_transaction` is the 0x-prefixed RLP hex ready for
/// `eth_sendRawTransaction`; `transaction_hash` is the Keccak-256 of that
/// encoding. Broadcasting is an external collaborator's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw_transaction: String,
    pub transaction_hash: String,
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

/// EVM Signer - offline, replay-protected signing.
///
/// # Security
/// - Field validation runs before the key is even parsed; a malformed
///   transaction never reaches cryptographic work
/// - Chain id is mandatory and folded into `v` per EIP-155
/// - [`EvmSigner::sign_secure`] takes ownership of the key buffer and
///   zeroes it on completion, success or failure
pub struct EvmSigner;

impl EvmSigner {
    // =========================================================================
    // SIGNING
    // =========================================================================

    /// Sign a legacy EIP-155 transaction.
    pub fn sign(tx: &EvmTransaction, private_key: &[u8]) -> WalletResult<SignedTransaction> {
        let to = Self::validate(tx)?;

        // SigningKey::from_slice left-pads shorter inputs; require the
        // exact width so a truncated key never parses
        if private_key.len() != 32 {
            return Err(WalletError::Crypto(CryptoError::InvalidKeyFormat(
                "Private key must be exactly 32 bytes".to_string(),
            )));
        }
        let signing_key = SigningKey::from_slice(private_key).map_err(|e| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(format!(
                "Invalid private key (must be 32 bytes): {}",
                e
            )))
        })?;

        let legacy = TxLegacy {
            chain_id: Some(tx.chain_id),
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            to: TxKind::Call(to),
            value: tx.value,
            input: Bytes::from(tx.data.clone()),
        };

        // EIP-155 pre-image hash: RLP([nonce, gasPrice, gasLimit, to,
        // value, data, chainId, 0, 0]) under Keccak-256
        let sighash = legacy.signature_hash();

        let signer = LocalSigner::from(signing_key);
        let signature = signer.sign_hash_sync(&sighash).map_err(|e| {
            WalletError::Transaction(TransactionError::SigningFailed(e.to_string()))
        })?;

        let v = tx.chain_id * 2 + 35 + u64::from(signature.v());
        let r = signature.r();
        let s = signature.s();

        let envelope = TxEnvelope::Legacy(legacy.into_signed(signature));
        let raw = envelope.encoded_2718();
        let transaction_hash = format!("{}", envelope.tx_hash());

        Ok(SignedTransaction {
            raw_transaction: format!("0x{}", hex::encode(raw)),
            transaction_hash,
            v,
            r,
            s,
        })
    }

    /// Sign and unconditionally zero the caller's key buffer.
    ///
    /// Intended to be invoked from inside
    /// [`SecureVault::with_private_key`](crate::vault::SecureVault::with_private_key).
    pub fn sign_secure(
        tx: &EvmTransaction,
        private_key: Zeroizing<Vec<u8>>,
    ) -> WalletResult<SignedTransaction> {
        Self::sign(tx, &private_key)
        // `private_key` dropped & zeroed here, on success and on failure
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Field checks, in declaration order, before any cryptographic work.
    fn validate(tx: &EvmTransaction) -> WalletResult<Address> {
        if tx.to.trim().is_empty() {
            return Err(WalletError::Transaction(TransactionError::invalid_field(
                "to",
                "recipient must not be empty",
            )));
        }
        let to: Address = tx.to.parse().map_err(|_| {
            WalletError::Transaction(TransactionError::invalid_field(
                "to",
                "not a well-formed 20-byte hex address",
            ))
        })?;
        if tx.gas_price == 0 {
            return Err(WalletError::Transaction(TransactionError::invalid_field(
                "gas_price",
                "must be greater than zero",
            )));
        }
        if tx.gas_limit == 0 {
            return Err(WalletError::Transaction(TransactionError::invalid_field(
                "gas_limit",
                "must be greater than zero",
            )));
        }
        if tx.chain_id == 0 {
            return Err(WalletError::Transaction(TransactionError::invalid_field(
                "chain_id",
                "must be greater than zero",
            )));
        }
        Ok(to)
    }
}

// =============================================================================
// TESTS
// =============================================================================
