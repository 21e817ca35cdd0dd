// src/vault/handoff.rs
//
// One-Shot Mnemonic Handoff - pass an owned secret to exactly one
// future consumer, with a hard expiry
//
// The generate screen hands the freshly drawn phrase to the confirm
// screen through this token instead of through any ambient registry.
// Consumption moves the token, so "exactly once" is enforced by the
// type system rather than by bookkeeping.

use crate::crypto::WalletMnemonic;
use crate::error::{VaultError, WalletError, WalletResult};
use std::time::{Duration, Instant};

/// Single-use capability carrying a mnemonic between wallet-creation steps.
///
/// The caller owns the token's lifetime. The phrase zeroizes itself when
/// the token is consumed, expires unconsumed, or is simply dropped.
pub struct MnemonicHandoff {
    mnemonic: WalletMnemonic,
    expires_at: Instant,
}

// Custom Debug - NEVER prints the phrase
impl std::fmt::Debug for MnemonicHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MnemonicHandoff")
            .field("expired", &self.is_expired())
            .field("mnemonic", &"[REDACTED]")
            .finish()
    }
}

impl MnemonicHandoff {
    /// Wrap a mnemonic with a time-to-live.
    pub fn new(mnemonic: WalletMnemonic, ttl: Duration) -> Self {
        Self {
            mnemonic,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Has the token's expiry passed?
    #[inline]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Consume the token, yielding the mnemonic exactly once.
    ///
    /// An expired token yields `HandoffExpired`; its phrase is zeroed as
    /// the moved-in token drops either way.
    pub fn consume(self) -> WalletResult<WalletMnemonic> {
        if self.is_expired() {
            return Err(WalletError::Vault(VaultError::HandoffExpired));
        }
        Ok(self.mnemonic)
    }
}

// =============================================================================
// TESTS
// =============================================================================
