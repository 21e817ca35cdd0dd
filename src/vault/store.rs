// src/vault/store.rs
//
// Key-Value Store Boundary - the only persistence seam of the core
//
// The platform keychain/keystore lives behind this trait. The core never
// assumes transactional multi-key writes; SecureVault sequences its writes
// so a crash leaves the record either fully absent or fully present.

use crate::error::StorageError;
use std::collections::HashMap;

/// Byte-oriented key-value store consumed by [`crate::vault::SecureVault`].
///
/// Implementations wrap the platform secure-storage backend (iOS keychain,
/// Android keystore, a file-based store in tests). Each call may fail with
/// a [`StorageError`]; the vault maps those into its own failure handling.
pub trait KeyValueStore: Send {
    /// Read a value. `Ok(None)` means the key is absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Write a value, overwriting any existing one.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;

    /// Existence check.
    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}

/// Store keys used by the vault. Exactly these four keys are ever written.
pub mod keys {
    pub const CIPHERTEXT: &str = "vault.ciphertext";
    pub const SALT: &str = "vault.salt";
    pub const IV: &str = "vault.iv";
    pub const ADDRESS: &str = "vault.address";

    pub const ALL: [&str; 4] = [CIPHERTEXT, SALT, IV, ADDRESS];
}

/// In-memory store - default backend for tests and for hosts that inject
/// their own persistence above the core.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.contains_key(key))
    }
}

// =============================================================================
// TESTS
// =============================================================================
