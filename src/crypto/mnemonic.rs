// src/crypto/mnemonic.rs
//
// Mnemonic Module - BIP-39 Generation, Validation and Seed Derivation
// Standards: BIP-39 (Mnemonic), PBKDF2-HMAC-SHA512 (Seed Derivation)

use crate::error::{CryptoError, MnemonicError, WalletError, WalletResult};
use bip39::Mnemonic;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Supported word counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCount {
    /// 12 words (128-bit entropy)
    Twelve = 12,
    /// 15 words (160-bit entropy)
    Fifteen = 15,
    /// 18 words (192-bit entropy)
    Eighteen = 18,
    /// 21 words (224-bit entropy)
    TwentyOne = 21,
    /// 24 words (256-bit entropy)
    TwentyFour = 24,
}

impl WordCount {
    /// Entropy bytes encoded by this word count.
    #[inline]
    pub const fn entropy_bytes(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::Fifteen => 20,
            WordCount::Eighteen => 24,
            WordCount::TwentyOne => 28,
            WordCount::TwentyFour => 32,
        }
    }
}

/// Wallet Mnemonic - BIP-39 phrase in canonical form.
///
/// # Security Architecture
/// - **ZeroizeOnDrop**: the phrase is overwritten with zeroes when dropped
/// - **CSPRNG**: entropy comes from `OsRng`, drawn fallibly so an
///   unavailable random source surfaces as `InsufficientEntropy`
/// - **No Debug Leak**: custom Debug impl never prints the phrase
///
/// # Canonical form
/// Lowercase, single-space separated. `from_phrase` normalizes any
/// whitespace/case variant before validating, so two differently typed
/// copies of the same phrase compare equal here.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WalletMnemonic {
    phrase: String,
    word_count: usize,
}

// Custom Debug - NEVER prints the mnemonic phrase
impl std::fmt::Debug for WalletMnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletMnemonic")
            .field("word_count", &self.word_count)
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

impl WalletMnemonic {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Generate a new mnemonic with 256 bits of entropy (24 words).
    ///
    /// Wallet creation is fixed at 24 words; shorter phrases are accepted
    /// only on import for compatibility with other standard wallets.
    pub fn generate() -> WalletResult<Self> {
        Self::generate_with_word_count(WordCount::TwentyFour)
    }

    /// Generate a mnemonic with an explicit word count.
    pub fn generate_with_word_count(word_count: WordCount) -> WalletResult<Self> {
        let entropy_size = word_count.entropy_bytes();

        // Stack-allocated entropy buffer (max 32 bytes)
        let mut entropy = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut entropy[..entropy_size])
            .map_err(|_| WalletError::Crypto(CryptoError::InsufficientEntropy))?;

        let mnemonic =
            Mnemonic::from_entropy(&entropy[..entropy_size]).expect("Valid entropy size");

        // Zeroize entropy as soon as it has been consumed
        entropy.zeroize();

        Ok(Self {
            phrase: mnemonic.to_string(),
            word_count: word_count as usize,
        })
    }

    /// Restore a mnemonic from an existing phrase.
    ///
    /// # Validation
    /// - Word count must be 12, 15, 18, 21 or 24
    /// - Every word must be in the BIP-39 English wordlist
    /// - Checksum must match the reconstructed entropy
    pub fn from_phrase(phrase: &str) -> WalletResult<Self> {
        let normalized = Self::normalize(phrase);
        let count = normalized.split(' ').filter(|w| !w.is_empty()).count();

        if !matches!(count, 12 | 15 | 18 | 21 | 24) {
            return Err(WalletError::Mnemonic(MnemonicError::InvalidWordCount(
                count,
            )));
        }

        // Fold the library error into variants that carry no phrase
        // material (not even the offending word's index).
        Mnemonic::parse(&normalized).map_err(|e| match e {
            bip39::Error::UnknownWord(_) => WalletError::Mnemonic(MnemonicError::UnknownWord),
            bip39::Error::InvalidChecksum => WalletError::Mnemonic(MnemonicError::ChecksumFailed),
            other => WalletError::Mnemonic(MnemonicError::Bip39Error(other.to_string())),
        })?;

        Ok(Self {
            phrase: normalized,
            word_count: count,
        })
    }

    // =========================================================================
    // NORMALIZATION
    // =========================================================================

    /// Map any whitespace/case variant of a phrase to its canonical form:
    /// trimmed, lowercase, single-space separated.
    ///
    /// Idempotent: `normalize(normalize(x)) == normalize(x)`.
    pub fn normalize(phrase: &str) -> String {
        phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    // =========================================================================
    // GETTERS
    // =========================================================================

    /// The canonical phrase.
    ///
    /// # Warning
    /// Never log or display this value outside the recovery-phrase UI flow.
    #[inline]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Number of words in the phrase.
    #[inline]
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// The individual words.
    pub fn words(&self) -> Vec<&str> {
        self.phrase.split(' ').collect()
    }

    /// Entropy strength of this phrase, in bits.
    pub fn strength_bits(&self) -> usize {
        match self.word_count {
            12 => 128,
            15 => 160,
            18 => 192,
            21 => 224,
            24 => 256,
            _ => 0,
        }
    }

    // =========================================================================
    // SEED DERIVATION
    // =========================================================================

    /// Derive the 64-byte BIP-39 seed (PBKDF2-HMAC-SHA512, 2048 iterations,
    /// salt = "mnemonic" + passphrase).
    ///
    /// Deterministic: the same phrase + passphrase always yields the same
    /// seed, which is what makes recovery in other standard wallets work.
    ///
    /// # Security Note
    /// The passphrase is not a password in the vault sense. Losing it makes
    /// the wallet unrecoverable even with the phrase in hand.
    pub fn to_seed(&self, passphrase: Option<&str>) -> Zeroizing<[u8; 64]> {
        let password = passphrase.unwrap_or("");
        let mnemonic = Mnemonic::parse(&self.phrase).expect("Internal phrase is valid");
        Zeroizing::new(mnemonic.to_seed(password))
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Predicate form of phrase validation: word count, wordlist, checksum.
    ///
    /// Returns `false` on any mismatch instead of raising; callers that need
    /// the failure kind use [`WalletMnemonic::from_phrase`].
    #[inline]
    pub fn validate(phrase: &str) -> bool {
        Self::from_phrase(phrase).is_ok()
    }

    /// Check whether a single word is in the BIP-39 English wordlist.
    pub fn is_valid_word(word: &str) -> bool {
        bip39::Language::English
            .find_word(&word.to_lowercase())
            .is_some()
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
