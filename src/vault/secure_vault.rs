// src/vault/secure_vault.rs
//
// Secure Vault - PIN-gated storage of the encrypted mnemonic record
//
// Single-wallet orchestration over the key-value store boundary: the
// existence check and the subsequent writes happen under one mutex, so
// two concurrent creations can never both pass the check. Secret
// material exists only inside the scoped operations, which refuse to
// run unless the session is unlocked, and is zeroed on success and on
// failure alike.

use crate::crypto::{EvmKeyDeriver, WalletMnemonic};
use crate::error::{VaultError, WalletError, WalletResult};
use crate::vault::crypto::{VaultCrypto, IV_LEN, MIN_KDF_ITERATIONS, MIN_SALT_LEN, TAG_LEN};
use crate::vault::lock_state::{LockState, LockStateMachine};
use crate::vault::store::{keys, KeyValueStore};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Vault configuration.
///
/// The KDF iteration count configured here applies to *new* encryptions
/// (create, import, PIN change); decryption always uses the count stored
/// inside the record it is decrypting.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub kdf_iterations: u32,
    pub auto_lock_timeout: Duration,
}

impl VaultConfig {
    /// Suggested polling interval for [`SecureVault::check_auto_lock`].
    pub const AUTO_LOCK_CHECK_INTERVAL: Duration = Duration::from_secs(10);
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: MIN_KDF_ITERATIONS,
            auto_lock_timeout: Duration::from_secs(300),
        }
    }
}

/// Record value layout: `iterations(u32 BE) || created_at(u64 BE) || ciphertext+tag`.
const RECORD_HEADER_LEN: usize = 4 + 8;

/// Parsed persisted record. `ciphertext` still carries the GCM tag.
struct StoredRecord {
    iterations: u32,
    created_at: u64,
    ciphertext: Vec<u8>,
    iv: [u8; IV_LEN],
    salt: Vec<u8>,
}

struct VaultInner<S> {
    store: S,
    lock: LockStateMachine,
    kdf_iterations: u32,
}

/// Secure Vault - the only component allowed to persist mnemonic-derived
/// artifacts, and only ever in encrypted form.
///
/// # Locking
/// All operations serialize on one internal mutex. Scoped secret
/// operations hold it for their whole duration, so the auto-lock timer
/// and `delete_wallet` can never observe a half-finished secret use.
pub struct SecureVault<S: KeyValueStore> {
    inner: Mutex<VaultInner<S>>,
}

impl<S: KeyValueStore> SecureVault<S> {
    pub fn new(store: S, config: VaultConfig) -> Self {
        Self {
            inner: Mutex::new(VaultInner {
                store,
                lock: LockStateMachine::new(config.auto_lock_timeout),
                kdf_iterations: config.kdf_iterations,
            }),
        }
    }

    // =========================================================================
    // WALLET LIFECYCLE
    // =========================================================================

    /// Encrypt and persist a mnemonic under a PIN. Returns the account-0
    /// address, which is also cached for PIN-less display.
    ///
    /// Fails with `WalletAlreadyExists` if a record is present; the check
    /// and the writes are one atomic unit under the vault mutex. A freshly
    /// stored wallet begins locked.
    pub fn create_wallet(&self, mnemonic: &WalletMnemonic, pin: &str) -> WalletResult<String> {
        Self::validate_pin(pin)?;
        let mut inner = self.lock_inner()?;

        if inner.store.contains(keys::CIPHERTEXT)? {
            return Err(WalletError::Vault(VaultError::WalletAlreadyExists));
        }

        let salt = VaultCrypto::random_salt(MIN_SALT_LEN)?;
        let key = VaultCrypto::derive_key_from_pin(pin, &salt, inner.kdf_iterations)?;
        let blob = VaultCrypto::encrypt(mnemonic.phrase().as_bytes(), &key)?;
        let address = EvmKeyDeriver::address_for_mnemonic(mnemonic, 0)?;

        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mut record = Vec::with_capacity(RECORD_HEADER_LEN + blob.ciphertext.len());
        record.extend_from_slice(&inner.kdf_iterations.to_be_bytes());
        record.extend_from_slice(&created_at.to_be_bytes());
        record.extend_from_slice(&blob.ciphertext);

        // Ciphertext/salt/iv first, cached address last: a crash mid-way
        // leaves "ciphertext without address", which reads as corrupted
        // rather than as a half-trusted wallet.
        let write = (|| -> WalletResult<()> {
            inner.store.set(keys::SALT, &salt)?;
            inner.store.set(keys::IV, &blob.iv)?;
            inner.store.set(keys::CIPHERTEXT, &record)?;
            inner.store.set(keys::ADDRESS, address.as_bytes())?;
            Ok(())
        })();

        if let Err(e) = write {
            warn!("wallet creation failed mid-write, rolling back");
            Self::wipe_record(&mut inner.store);
            return Err(e);
        }

        info!("wallet record created");
        Ok(address)
    }

    /// Validate a user-entered phrase, then store it like `create_wallet`.
    pub fn import_wallet(&self, phrase: &str, pin: &str) -> WalletResult<String> {
        let mnemonic = WalletMnemonic::from_phrase(phrase)?;
        self.create_wallet(&mnemonic, pin)
    }

    /// Remove the encrypted record, salt, IV and cached address.
    /// Post-condition: `has_wallet()` is false and the vault is locked.
    pub fn delete_wallet(&self) -> WalletResult<()> {
        let mut inner = self.lock_inner()?;
        if !inner.store.contains(keys::CIPHERTEXT)? {
            return Err(WalletError::Vault(VaultError::WalletNotFound));
        }
        // Ciphertext goes first so a crash mid-delete leaves no record,
        // only benign leftovers the next create overwrites.
        inner.store.delete(keys::CIPHERTEXT)?;
        inner.store.delete(keys::SALT)?;
        inner.store.delete(keys::IV)?;
        inner.store.delete(keys::ADDRESS)?;
        inner.lock.lock();
        info!("wallet record deleted");
        Ok(())
    }

    /// Is a wallet stored on this device?
    pub fn has_wallet(&self) -> WalletResult<bool> {
        let inner = self.lock_inner()?;
        Ok(inner.store.contains(keys::CIPHERTEXT)?)
    }

    /// Cached account-0 address. Non-secret; readable without a PIN.
    ///
    /// `Ok(None)` when no wallet exists. Ciphertext without an address
    /// is an interrupted create and reads as corrupted; an address
    /// without ciphertext is leftover from an interrupted delete and
    /// reads as absent.
    pub fn address(&self) -> WalletResult<Option<String>> {
        let inner = self.lock_inner()?;
        if !inner.store.contains(keys::CIPHERTEXT)? {
            return Ok(None);
        }
        match inner.store.get(keys::ADDRESS)? {
            Some(bytes) => {
                let addr = String::from_utf8(bytes)
                    .map_err(|_| WalletError::Vault(VaultError::DataCorrupted))?;
                Ok(Some(addr))
            }
            None => Err(WalletError::Vault(VaultError::DataCorrupted)),
        }
    }

    /// Creation timestamp of the stored record (unix seconds).
    pub fn created_at(&self) -> WalletResult<Option<u64>> {
        let inner = self.lock_inner()?;
        if !inner.store.contains(keys::CIPHERTEXT)? {
            return Ok(None);
        }
        let record = Self::read_record(&inner.store)?;
        Ok(Some(record.created_at))
    }

    // =========================================================================
    // PIN VERIFICATION & LOCK STATE
    // =========================================================================

    /// Verify a PIN by trial decryption, without retaining the plaintext.
    ///
    /// `Ok(true)` marks the session unlocked and resets the idle clock;
    /// `Ok(false)` means the tag did not verify (wrong PIN or corrupted
    /// record, indistinguishable by design). Storage and format failures
    /// surface as errors, so the host can implement lockout policy on the
    /// boolean alone.
    pub fn unlock(&self, pin: &str) -> WalletResult<bool> {
        Self::validate_pin(pin)?;
        let mut inner = self.lock_inner()?;
        debug!("unlock attempt");

        match Self::decrypt_mnemonic(&inner.store, pin) {
            Ok(_plaintext) => {
                // Plaintext dropped (and zeroed) immediately
                inner.lock.mark_unlocked();
                Ok(true)
            }
            Err(WalletError::Vault(VaultError::AuthenticationFailed)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Explicitly lock the session.
    pub fn lock(&self) -> WalletResult<()> {
        let mut inner = self.lock_inner()?;
        inner.lock.lock();
        Ok(())
    }

    /// Host application moved to the background: lock immediately.
    pub fn on_background(&self) -> WalletResult<()> {
        let mut inner = self.lock_inner()?;
        inner.lock.on_background();
        Ok(())
    }

    /// Periodic auto-lock poll; returns `true` when this call locked the
    /// session. Call roughly every [`VaultConfig::AUTO_LOCK_CHECK_INTERVAL`].
    pub fn check_auto_lock(&self) -> WalletResult<bool> {
        let mut inner = self.lock_inner()?;
        let locked = inner.lock.check_timeout();
        if locked {
            debug!("auto-lock timeout reached");
        }
        Ok(locked)
    }

    pub fn lock_state(&self) -> WalletResult<LockState> {
        Ok(self.lock_inner()?.lock.state())
    }

    pub fn is_unlocked(&self) -> WalletResult<bool> {
        Ok(self.lock_inner()?.lock.is_unlocked())
    }

    // =========================================================================
    // SCOPED SECRET ACCESS
    // =========================================================================

    /// Decrypt the mnemonic and return it as an owned, self-zeroing value.
    ///
    /// Requires an unlocked session. Callers MUST consume the result
    /// inside a bounded scope; prefer
    /// [`with_mnemonic`](Self::with_mnemonic), which enforces that shape.
    pub fn retrieve_mnemonic(&self, pin: &str) -> WalletResult<WalletMnemonic> {
        Self::validate_pin(pin)?;
        let mut inner = self.lock_inner()?;
        Self::require_unlocked(&mut inner)?;
        Self::decrypt_mnemonic(&inner.store, pin)
    }

    /// Scoped use-then-forget access to the mnemonic.
    ///
    /// Requires an unlocked session; a locked or timed-out session
    /// fails with `SessionLocked` before any decryption. The decrypted
    /// phrase lives exactly as long as `op` runs and is zeroed
    /// afterwards, whether `op` succeeds or fails. A successful run
    /// resets the auto-lock idle clock.
    pub fn with_mnemonic<T>(
        &self,
        pin: &str,
        op: impl FnOnce(&WalletMnemonic) -> WalletResult<T>,
    ) -> WalletResult<T> {
        Self::validate_pin(pin)?;
        let mut inner = self.lock_inner()?;
        Self::require_unlocked(&mut inner)?;
        let mnemonic = Self::decrypt_mnemonic(&inner.store, pin)?;
        let result = op(&mnemonic);
        if result.is_ok() {
            inner.lock.record_activity();
        }
        result
        // `mnemonic` dropped & zeroed here, on success and on failure
    }

    /// Scoped use-then-forget access to an account private key.
    ///
    /// This is the sanctioned path for signing: decrypt, derive, hand the
    /// key to `op`, zero everything.
    pub fn with_private_key<T>(
        &self,
        pin: &str,
        account_index: u32,
        op: impl FnOnce(&[u8; 32]) -> WalletResult<T>,
    ) -> WalletResult<T> {
        self.with_mnemonic(pin, |mnemonic| {
            let private_key = EvmKeyDeriver::private_key_for(mnemonic, account_index)?;
            op(&private_key)
            // `private_key` dropped & zeroed here
        })
    }

    // =========================================================================
    // PIN CHANGE
    // =========================================================================

    /// Re-encrypt the record under a new PIN (fresh salt, fresh IV, the
    /// currently configured iteration count). Requires an unlocked
    /// session on top of the old PIN itself.
    ///
    /// A write failure mid-way restores the previous salt/IV/ciphertext,
    /// so the record never ends up undecryptable under either PIN.
    pub fn change_pin(&self, old_pin: &str, new_pin: &str) -> WalletResult<()> {
        Self::validate_pin(old_pin)?;
        Self::validate_pin(new_pin)?;
        let mut inner = self.lock_inner()?;
        Self::require_unlocked(&mut inner)?;

        let mnemonic = Self::decrypt_mnemonic(&inner.store, old_pin)?;
        let record = Self::read_record(&inner.store)?;
        let prev_value = inner
            .store
            .get(keys::CIPHERTEXT)?
            .ok_or(WalletError::Vault(VaultError::WalletNotFound))?;

        let salt = VaultCrypto::random_salt(MIN_SALT_LEN)?;
        let key = VaultCrypto::derive_key_from_pin(new_pin, &salt, inner.kdf_iterations)?;
        let blob = VaultCrypto::encrypt(mnemonic.phrase().as_bytes(), &key)?;

        let mut value = Vec::with_capacity(RECORD_HEADER_LEN + blob.ciphertext.len());
        value.extend_from_slice(&inner.kdf_iterations.to_be_bytes());
        value.extend_from_slice(&record.created_at.to_be_bytes());
        value.extend_from_slice(&blob.ciphertext);

        let write = (|| -> WalletResult<()> {
            inner.store.set(keys::SALT, &salt)?;
            inner.store.set(keys::IV, &blob.iv)?;
            inner.store.set(keys::CIPHERTEXT, &value)?;
            Ok(())
        })();

        if let Err(e) = write {
            warn!("PIN change failed mid-write, restoring previous record");
            let _ = inner.store.set(keys::SALT, &record.salt);
            let _ = inner.store.set(keys::IV, &record.iv);
            let _ = inner.store.set(keys::CIPHERTEXT, &prev_value);
            return Err(e);
        }

        info!("vault record re-encrypted under new PIN");
        Ok(())
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn lock_inner(&self) -> WalletResult<std::sync::MutexGuard<'_, VaultInner<S>>> {
        self.inner
            .lock()
            .map_err(|_| WalletError::Validation("Vault mutex poisoned".to_string()))
    }

    /// Gate for secret materialization: the session must be unlocked and
    /// not timed out. Applying the timeout here means an expired session
    /// is refused even if the host never polls `check_auto_lock`.
    fn require_unlocked(inner: &mut VaultInner<S>) -> WalletResult<()> {
        inner.lock.check_timeout();
        if !inner.lock.is_unlocked() {
            return Err(WalletError::Vault(VaultError::SessionLocked));
        }
        Ok(())
    }

    /// PIN format gate: 4-8 ASCII digits, rejected before any KDF work.
    fn validate_pin(pin: &str) -> WalletResult<()> {
        let ok = (4..=8).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit());
        if ok {
            Ok(())
        } else {
            Err(WalletError::Vault(VaultError::InvalidPinFormat))
        }
    }

    fn read_record(store: &S) -> WalletResult<StoredRecord> {
        let raw = store
            .get(keys::CIPHERTEXT)?
            .ok_or(WalletError::Vault(VaultError::WalletNotFound))?;
        if raw.len() <= RECORD_HEADER_LEN + TAG_LEN {
            return Err(WalletError::Vault(VaultError::DataCorrupted));
        }

        let mut iter_bytes = [0u8; 4];
        iter_bytes.copy_from_slice(&raw[..4]);
        let mut ts_bytes = [0u8; 8];
        ts_bytes.copy_from_slice(&raw[4..RECORD_HEADER_LEN]);

        let salt = store
            .get(keys::SALT)?
            .ok_or(WalletError::Vault(VaultError::DataCorrupted))?;
        if salt.len() < MIN_SALT_LEN {
            return Err(WalletError::Vault(VaultError::DataCorrupted));
        }
        let iv_raw = store
            .get(keys::IV)?
            .ok_or(WalletError::Vault(VaultError::DataCorrupted))?;
        if iv_raw.len() != IV_LEN {
            return Err(WalletError::Vault(VaultError::DataCorrupted));
        }
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&iv_raw);

        Ok(StoredRecord {
            iterations: u32::from_be_bytes(iter_bytes),
            created_at: u64::from_be_bytes(ts_bytes),
            ciphertext: raw[RECORD_HEADER_LEN..].to_vec(),
            iv,
            salt,
        })
    }

    fn decrypt_mnemonic(store: &S, pin: &str) -> WalletResult<WalletMnemonic> {
        let record = Self::read_record(store)?;
        let key = VaultCrypto::derive_key_from_pin(pin, &record.salt, record.iterations)?;
        let plaintext: Zeroizing<Vec<u8>> =
            VaultCrypto::decrypt(&record.ciphertext, &record.iv, &key)?;
        let phrase = std::str::from_utf8(&plaintext)
            .map_err(|_| WalletError::Vault(VaultError::DataCorrupted))?;
        WalletMnemonic::from_phrase(phrase)
        // `plaintext` and `key` dropped & zeroed here
    }

    /// Best-effort removal of all four record keys after a failed write.
    fn wipe_record(store: &mut S) {
        for key in keys::ALL {
            let _ = store.delete(key);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
