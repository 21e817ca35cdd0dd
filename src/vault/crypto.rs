// src/vault/crypto.rs
//
// Vault Cryptography - PIN Key Derivation and Authenticated Encryption
// PBKDF2-HMAC-SHA256 (PIN -> key), AES-256-GCM (mnemonic at rest)

use crate::error::{CryptoError, VaultError, WalletError, WalletResult};
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// AES-256 key length.
pub const KEY_LEN: usize = 32;
/// GCM nonce length.
pub const IV_LEN: usize = 12;
/// GCM authentication tag length (appended to the ciphertext by the AEAD).
pub const TAG_LEN: usize = 16;
/// Minimum salt length for the PIN KDF.
pub const MIN_SALT_LEN: usize = 16;
/// Floor for the PIN KDF iteration count. The count actually used is a
/// stored parameter per record, so it can be raised later without breaking
/// decryption of older records.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Ciphertext plus the IV it was produced under. The GCM tag is the
/// trailing [`TAG_LEN`] bytes of `ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_LEN],
}

/// Vault Crypto - the symmetric-cryptography primitives behind the vault.
///
/// # Security
/// - Fresh random IV for every encryption call; IV reuse under one key is
///   a correctness violation, not a performance concern
/// - Decryption is all-or-nothing: a tag mismatch never yields partial
///   plaintext, and wrong-PIN vs corrupted-ciphertext are indistinguishable
/// - The random wrappers exist so call sites never reach for a
///   non-cryptographic generator by mistake
pub struct VaultCrypto;

impl VaultCrypto {
    // =========================================================================
    // PIN KEY DERIVATION
    // =========================================================================

    /// PBKDF2-HMAC-SHA256(pin, salt, iterations) → 32-byte key.
    ///
    /// Deliberately slow (~100-200 ms at the minimum count); run it off any
    /// interactive thread.
    pub fn derive_key_from_pin(
        pin: &str,
        salt: &[u8],
        iterations: u32,
    ) -> WalletResult<Zeroizing<[u8; KEY_LEN]>> {
        if iterations < MIN_KDF_ITERATIONS {
            return Err(WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "KDF iteration count {} below minimum {}",
                iterations, MIN_KDF_ITERATIONS
            ))));
        }
        if salt.len() < MIN_SALT_LEN {
            return Err(WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "Salt too short: {} bytes, need at least {}",
                salt.len(),
                MIN_SALT_LEN
            ))));
        }

        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        pbkdf2_hmac::<Sha256>(pin.as_bytes(), salt, iterations, key.as_mut());
        Ok(key)
    }

    // =========================================================================
    // AUTHENTICATED ENCRYPTION
    // =========================================================================

    /// AES-256-GCM encrypt under a fresh random IV.
    pub fn encrypt(plaintext: &[u8], key: &[u8; KEY_LEN]) -> WalletResult<EncryptedBlob> {
        let iv = Self::random_iv()?;
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| WalletError::Vault(VaultError::EncryptionFailed))?;

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext)
            .map_err(|_| WalletError::Vault(VaultError::EncryptionFailed))?;

        Ok(EncryptedBlob { ciphertext, iv })
    }

    /// AES-256-GCM decrypt.
    ///
    /// Fails with `AuthenticationFailed` when the tag does not verify -
    /// the single point where "wrong PIN" and "corrupted ciphertext" meet.
    pub fn decrypt(
        ciphertext: &[u8],
        iv: &[u8],
        key: &[u8; KEY_LEN],
    ) -> WalletResult<Zeroizing<Vec<u8>>> {
        if iv.len() != IV_LEN {
            return Err(WalletError::Vault(VaultError::DataCorrupted));
        }
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| WalletError::Vault(VaultError::AuthenticationFailed))?;

        let plaintext = cipher
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| WalletError::Vault(VaultError::AuthenticationFailed))?;

        Ok(Zeroizing::new(plaintext))
    }

    // =========================================================================
    // SECURE RANDOM WRAPPERS
    // =========================================================================

    /// Cryptographically secure random salt, at least [`MIN_SALT_LEN`] bytes.
    pub fn random_salt(len: usize) -> WalletResult<Vec<u8>> {
        if len < MIN_SALT_LEN {
            return Err(WalletError::Validation(format!(
                "Salt length {} below minimum {}",
                len, MIN_SALT_LEN
            )));
        }
        let mut salt = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|_| WalletError::Crypto(CryptoError::InsufficientEntropy))?;
        Ok(salt)
    }

    /// Cryptographically secure random 12-byte GCM IV.
    pub fn random_iv() -> WalletResult<[u8; IV_LEN]> {
        let mut iv = [0u8; IV_LEN];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|_| WalletError::Crypto(CryptoError::InsufficientEntropy))?;
        Ok(iv)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VaultError;

    fn test_key(pin: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
        VaultCrypto::derive_key_from_pin(pin, salt, MIN_KDF_ITERATIONS).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let salt = VaultCrypto::random_salt(16).unwrap();
        let key = test_key("123456", &salt);

        let plaintext = b"legal winner thank year wave sausage worth useful legal winner thank yellow";
        let blob = VaultCrypto::encrypt(plaintext, &key).unwrap();
        let decrypted = VaultCrypto::decrypt(&blob.ciphertext, &blob.iv, &key).unwrap();
        assert_eq!(&*decrypted, plaintext);
    }

    #[test]
    fn test_wrong_pin_fails_authentication() {
        let salt = VaultCrypto::random_salt(16).unwrap();
        let key = test_key("123456", &salt);
        let other = test_key("654321", &salt);

        let blob = VaultCrypto::encrypt(b"secret phrase", &key).unwrap();
        let result = VaultCrypto::decrypt(&blob.ciphertext, &blob.iv, &other);
        assert_eq!(
            result.unwrap_err(),
            WalletError::Vault(VaultError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_corrupted_ciphertext_fails_authentication() {
        let salt = VaultCrypto::random_salt(16).unwrap();
        let key = test_key("123456", &salt);

        let mut blob = VaultCrypto::encrypt(b"secret phrase", &key).unwrap();
        blob.ciphertext[0] ^= 0x01;
        let result = VaultCrypto::decrypt(&blob.ciphertext, &blob.iv, &key);
        assert_eq!(
            result.unwrap_err(),
            WalletError::Vault(VaultError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_iv_unique_per_call() {
        let salt = VaultCrypto::random_salt(16).unwrap();
        let key = test_key("123456", &salt);

        let a = VaultCrypto::encrypt(b"same plaintext", &key).unwrap();
        let b = VaultCrypto::encrypt(b"same plaintext", &key).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_ciphertext_overhead_is_tag_len() {
        let salt = VaultCrypto::random_salt(16).unwrap();
        let key = test_key("123456", &salt);

        let plaintext = b"twelve words of recovery phrase text";
        let blob = VaultCrypto::encrypt(plaintext, &key).unwrap();
        assert_eq!(blob.ciphertext.len(), plaintext.len() + TAG_LEN);
    }

    #[test]
    fn test_kdf_deterministic_and_pin_sensitive() {
        let salt = [0x5au8; 16];
        let a = VaultCrypto::derive_key_from_pin("123456", &salt, MIN_KDF_ITERATIONS).unwrap();
        let b = VaultCrypto::derive_key_from_pin("123456", &salt, MIN_KDF_ITERATIONS).unwrap();
        let c = VaultCrypto::derive_key_from_pin("123457", &salt, MIN_KDF_ITERATIONS).unwrap();
        assert_eq!(&*a, &*b);
        assert_ne!(&*a, &*c);
    }

    #[test]
    fn test_kdf_iteration_count_changes_key() {
        let salt = [0x5au8; 16];
        let a = VaultCrypto::derive_key_from_pin("123456", &salt, 100_000).unwrap();
        let b = VaultCrypto::derive_key_from_pin("123456", &salt, 150_000).unwrap();
        assert_ne!(&*a, &*b);
    }

    #[test]
    fn test_kdf_rejects_weak_parameters() {
        let salt = [0u8; 16];
        assert!(VaultCrypto::derive_key_from_pin("123456", &salt, 1_000).is_err());
        assert!(VaultCrypto::derive_key_from_pin("123456", &salt[..8], MIN_KDF_ITERATIONS).is_err());
    }

    #[test]
    fn test_random_salt_length_enforced() {
        assert!(VaultCrypto::random_salt(8).is_err());
        let salt = VaultCrypto::random_salt(16).unwrap();
        assert_eq!(salt.len(), 16);
        assert_ne!(salt, VaultCrypto::random_salt(16).unwrap());
    }

    #[test]
    fn test_decrypt_rejects_bad_iv_length() {
        let key = test_key("123456", &[1u8; 16]);
        let result = VaultCrypto::decrypt(b"whatever", &[0u8; 7], &key);
        assert_eq!(
            result.unwrap_err(),
            WalletError::Vault(VaultError::DataCorrupted)
        );
    }
}
