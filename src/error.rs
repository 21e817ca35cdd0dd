use thiserror::Error;

pub type WalletResult<T> = std::result::Result<T, WalletError>;

/// Umbrella error for the wallet core.
///
/// Expected validation outcomes (bad phrase, bad PIN format, wrong PIN)
/// surface as their own kinds so callers never have to catch a broad
/// fault channel just to detect normal invalid input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Mnemonic Error: {0}")]
    Mnemonic(#[from] MnemonicError),

    #[error("Cryptography Error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Vault Error: {0}")]
    Vault(#[from] VaultError),

    #[error("Storage Error: {0}")]
    Storage(#[from] StorageError),

    #[error("Transaction Error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Validation Error: {0}")]
    Validation(String),
}

/// BIP-39 validation failures. No variant carries phrase text;
/// error payloads must stay free of secret material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("Invalid word count: {0}. Expected 12, 15, 18, 21 or 24 words.")]
    InvalidWordCount(usize),

    #[error("A word is not in the BIP-39 wordlist.")]
    UnknownWord,

    #[error("Checksum validation failed.")]
    ChecksumFailed,

    #[error("BIP-39 internal error: {0}")]
    Bip39Error(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Secure random source unavailable.")]
    InsufficientEntropy,
}

/// Vault-level failures around the persisted encrypted record.
///
/// Wrong PIN and corrupted ciphertext are deliberately the same kind:
/// both are "the authentication tag did not verify" and the caller must
/// not be able to tell them apart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("A wallet already exists on this device.")]
    WalletAlreadyExists,

    #[error("No wallet is stored on this device.")]
    WalletNotFound,

    #[error("PIN must be 4 to 8 ASCII digits.")]
    InvalidPinFormat,

    #[error("Decryption did not verify.")]
    AuthenticationFailed,

    #[error("Vault session is locked.")]
    SessionLocked,

    #[error("Stored wallet record is malformed.")]
    DataCorrupted,

    #[error("Encryption failed.")]
    EncryptionFailed,

    #[error("Mnemonic handoff token has expired.")]
    HandoffExpired,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage read failed: {0}")]
    ReadFailed(String),

    #[error("Storage write failed: {0}")]
    WriteFailed(String),

    #[error("Storage delete failed: {0}")]
    DeleteFailed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Invalid transaction field '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

impl TransactionError {
    #[inline]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        TransactionError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
