// src/crypto/hd.rs
//
// Hierarchical Deterministic Derivation - BIP-32 over secp256k1
// Algorithm: HMAC-SHA512 master/child derivation, scalar addition mod n
// Reference: https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki

use crate::error::{CryptoError, WalletError, WalletResult};
use bip32::DerivationPath;
use hmac::{Hmac, Mac};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, Scalar, SecretKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use std::str::FromStr;
use zeroize::{Zeroize, Zeroizing};

type HmacSha512 = Hmac<Sha512>;

/// Hardened index offset per BIP-32.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// HMAC key for master key generation per BIP-32.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// One node of the BIP-32 key tree.
///
/// Owned by the derivation call stack only; both the private key and the
/// chain code auto-zeroize on drop. Depth, child index and parent
/// fingerprint are kept so a node is self-describing, the way xprv
/// serializations describe themselves.
pub struct ExtendedKey {
    key: Zeroizing<[u8; 32]>,
    chain_code: Zeroizing<[u8; 32]>,
    pub depth: u8,
    pub index: u32,
    pub parent_fingerprint: [u8; 4],
}

// Custom Debug - NEVER prints key or chain code
impl std::fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("depth", &self.depth)
            .field("index", &self.index)
            .field("parent_fingerprint", &self.parent_fingerprint)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl ExtendedKey {
    /// The 32-byte private key of this node.
    #[inline]
    pub fn private_key(&self) -> &[u8; 32] {
        &self.key
    }

    /// The 32-byte chain code of this node.
    #[inline]
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }
}

/// BIP-32 Key Deriver - pure function of (seed, path).
///
/// # Security
/// - Intermediate HMAC output is zeroized as soon as each step consumes
///   it
/// - No randomness anywhere: identical inputs always produce identical
///   `ExtendedKey` nodes
pub struct HdDeriver;

impl HdDeriver {
    // =========================================================================
    // MASTER KEY
    // =========================================================================

    /// Master node: `HMAC-SHA512(key = "Bitcoin seed", data = seed)`.
    ///
    /// Left 32 bytes become the private key, right 32 bytes the chain code.
    /// Depth 0, index 0, zero parent fingerprint.
    pub fn master_key(seed: &[u8]) -> WalletResult<ExtendedKey> {
        if seed.len() != 64 {
            return Err(WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "Invalid seed length: expected 64 bytes, got {}",
                seed.len()
            ))));
        }

        let mut mac = HmacSha512::new_from_slice(MASTER_HMAC_KEY)
            .map_err(|e| WalletError::Crypto(CryptoError::DerivationFailed(e.to_string())))?;
        mac.update(seed);
        let mut output = [0u8; 64];
        output.copy_from_slice(&mac.finalize().into_bytes());

        let mut key = Zeroizing::new([0u8; 32]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&output[..32]);
        chain_code.copy_from_slice(&output[32..]);
        output.zeroize();

        // BIP-32 requires the master key to be a usable scalar
        Self::check_key_in_range(&key)?;

        Ok(ExtendedKey {
            key,
            chain_code,
            depth: 0,
            index: 0,
            parent_fingerprint: [0u8; 4],
        })
    }

    // =========================================================================
    // CHILD DERIVATION
    // =========================================================================

    /// One CKD step.
    ///
    /// Hardened (`index >= 2^31`): hash input is `0x00 || parent_key || ser32(index)`.
    /// Normal: hash input is `compressed_pubkey(parent_key) || ser32(index)`.
    /// Child key = (left 32 bytes + parent key) mod n; right 32 bytes become
    /// the chain code.
    pub fn derive_child(parent: &ExtendedKey, index: u32) -> WalletResult<ExtendedKey> {
        let mut mac = HmacSha512::new_from_slice(parent.chain_code())
            .map_err(|e| WalletError::Crypto(CryptoError::DerivationFailed(e.to_string())))?;

        if index >= HARDENED_OFFSET {
            mac.update(&[0x00]);
            mac.update(parent.private_key());
        } else {
            let compressed = Self::compressed_public_key(parent.private_key())?;
            mac.update(&compressed);
        }
        mac.update(&index.to_be_bytes());

        let mut output = [0u8; 64];
        output.copy_from_slice(&mac.finalize().into_bytes());

        // child = IL + parent (mod n); IL >= n or child == 0 would mean an
        // unusable key, which BIP-32 puts at odds below 1 in 2^127
        let il_scalar = match Self::scalar_from_bytes(&output[..32]) {
            Ok(s) => s,
            Err(e) => {
                output.zeroize();
                return Err(e);
            }
        };
        let parent_scalar = match Self::scalar_from_bytes(parent.private_key().as_slice()) {
            Ok(s) => s,
            Err(e) => {
                output.zeroize();
                return Err(e);
            }
        };
        let child_scalar = il_scalar + parent_scalar;
        if child_scalar == Scalar::ZERO {
            output.zeroize();
            return Err(WalletError::Crypto(CryptoError::DerivationFailed(
                "Derived child key is zero".to_string(),
            )));
        }

        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(child_scalar.to_bytes().as_slice());
        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&output[32..]);
        output.zeroize();

        Ok(ExtendedKey {
            key,
            chain_code,
            depth: parent.depth.wrapping_add(1),
            index,
            parent_fingerprint: Self::fingerprint(parent.private_key())?,
        })
    }

    /// Walk a full path from a seed: `m/44'/60'/0'/0/0` style.
    ///
    /// The entire path is parsed before any derivation happens; a malformed
    /// segment fails up front rather than after partial derivation.
    pub fn derive_path(seed: &[u8], path: &str) -> WalletResult<ExtendedKey> {
        let derivation_path = DerivationPath::from_str(path).map_err(|e| {
            WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "Invalid path '{}': {}",
                path, e
            )))
        })?;

        let mut node = Self::master_key(seed)?;
        for child_num in derivation_path {
            node = Self::derive_child(&node, u32::from(child_num))?;
        }
        Ok(node)
    }

    /// Validate a path without deriving anything.
    #[inline]
    pub fn is_valid_path(path: &str) -> bool {
        DerivationPath::from_str(path).is_ok()
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// 33-byte SEC1 compressed public key for a private key.
    fn compressed_public_key(private_key: &[u8]) -> WalletResult<[u8; 33]> {
        let secret = SecretKey::from_slice(private_key).map_err(|e| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(format!(
                "Invalid secp256k1 private key: {}",
                e
            )))
        })?;
        let point = secret.public_key().to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        Ok(out)
    }

    /// BIP-32 key fingerprint: first 4 bytes of RIPEMD160(SHA256(pubkey)).
    fn fingerprint(private_key: &[u8]) -> WalletResult<[u8; 4]> {
        let compressed = Self::compressed_public_key(private_key)?;
        let sha = Sha256::digest(compressed);
        let ripe = Ripemd160::digest(sha);
        let mut out = [0u8; 4];
        out.copy_from_slice(&ripe[..4]);
        Ok(out)
    }

    /// Interpret 32 big-endian bytes as a scalar, rejecting values >= n.
    fn scalar_from_bytes(bytes: &[u8]) -> WalletResult<Scalar> {
        let repr = FieldBytes::clone_from_slice(bytes);
        Option::<Scalar>::from(Scalar::from_repr(repr)).ok_or_else(|| {
            WalletError::Crypto(CryptoError::DerivationFailed(
                "Derived value exceeds curve order".to_string(),
            ))
        })
    }

    /// Reject keys that cannot be secp256k1 scalars (zero or >= n).
    fn check_key_in_range(key: &[u8; 32]) -> WalletResult<()> {
        SecretKey::from_slice(key).map_err(|_| {
            WalletError::Crypto(CryptoError::DerivationFailed(
                "Master key outside valid scalar range".to_string(),
            ))
        })?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-32 test vector 1 seed
    const VECTOR1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn vector1_seed() -> Vec<u8> {
        // Vector 1 uses a 16-byte seed; pad path through master_key is not
        // allowed there, so tests on it go through the internals.
        hex::decode(VECTOR1_SEED).unwrap()
    }

    fn master_from_short_seed(seed: &[u8]) -> ExtendedKey {
        // master_key enforces the 64-byte BIP-39 seed used by the wallet;
        // BIP-32 vectors use shorter seeds, so recompute the HMAC directly.
        let mut mac = HmacSha512::new_from_slice(MASTER_HMAC_KEY).unwrap();
        mac.update(seed);
        let output = mac.finalize().into_bytes();
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&output[..32]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&output[32..]);
        ExtendedKey {
            key,
            chain_code,
            depth: 0,
            index: 0,
            parent_fingerprint: [0u8; 4],
        }
    }

    #[test]
    fn test_vector1_master_key() {
        let master = master_from_short_seed(&vector1_seed());
        assert_eq!(
            hex::encode(master.private_key()),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(master.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert_eq!(master.depth, 0);
        assert_eq!(master.parent_fingerprint, [0u8; 4]);
    }

    #[test]
    fn test_vector1_hardened_child() {
        // m/0' from BIP-32 test vector 1
        let master = master_from_short_seed(&vector1_seed());
        let child = HdDeriver::derive_child(&master, HARDENED_OFFSET).unwrap();
        assert_eq!(
            hex::encode(child.private_key()),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(
            hex::encode(child.chain_code()),
            "47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141"
        );
        assert_eq!(child.depth, 1);
        assert_eq!(child.index, HARDENED_OFFSET);
    }

    #[test]
    fn test_vector1_child_chain() {
        // m/0'/1 from BIP-32 test vector 1
        let master = master_from_short_seed(&vector1_seed());
        let h0 = HdDeriver::derive_child(&master, HARDENED_OFFSET).unwrap();
        let n1 = HdDeriver::derive_child(&h0, 1).unwrap();
        assert_eq!(
            hex::encode(n1.private_key()),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
        assert_eq!(n1.depth, 2);
        assert_eq!(n1.index, 1);
    }

    #[test]
    fn test_derive_path_deterministic() {
        let seed = [7u8; 64];
        let a = HdDeriver::derive_path(&seed, "m/44'/60'/0'/0/0").unwrap();
        let b = HdDeriver::derive_path(&seed, "m/44'/60'/0'/0/0").unwrap();
        assert_eq!(a.private_key(), b.private_key());
        assert_eq!(a.chain_code(), b.chain_code());
        assert_eq!(a.depth, 5);
    }

    #[test]
    fn test_derive_path_different_paths_differ() {
        let seed = [7u8; 64];
        let a = HdDeriver::derive_path(&seed, "m/44'/60'/0'/0/0").unwrap();
        let b = HdDeriver::derive_path(&seed, "m/44'/60'/0'/0/1").unwrap();
        assert_ne!(a.private_key(), b.private_key());
    }

    #[test]
    fn test_hardened_vs_normal_differ() {
        let seed = [9u8; 64];
        let master = HdDeriver::master_key(&seed).unwrap();
        let hardened = HdDeriver::derive_child(&master, HARDENED_OFFSET).unwrap();
        let normal = HdDeriver::derive_child(&master, 0).unwrap();
        assert_ne!(hardened.private_key(), normal.private_key());
    }

    #[test]
    fn test_malformed_path_fails_before_derivation() {
        let seed = [1u8; 64];
        assert!(HdDeriver::derive_path(&seed, "m/44'/abc'/0'/0/0").is_err());
        assert!(HdDeriver::derive_path(&seed, "44'/60'/0'").is_err());
        assert!(HdDeriver::derive_path(&seed, "m/44''/60'").is_err());
    }

    #[test]
    fn test_is_valid_path() {
        assert!(HdDeriver::is_valid_path("m/44'/60'/0'/0/0"));
        assert!(HdDeriver::is_valid_path("m/0"));
        assert!(!HdDeriver::is_valid_path("invalid"));
        assert!(!HdDeriver::is_valid_path("m/2147483648"));
    }

    #[test]
    fn test_invalid_seed_length() {
        assert!(HdDeriver::master_key(&[0u8; 32]).is_err());
        assert!(HdDeriver::derive_path(&[0u8; 16], "m/0").is_err());
    }

    #[test]
    fn test_out_of_range_parent_key_rejected() {
        // 0xff..ff is above the curve order, so the parent key can never
        // be interpreted as a scalar
        let parent = ExtendedKey {
            key: Zeroizing::new([0xff; 32]),
            chain_code: Zeroizing::new([0x01; 32]),
            depth: 0,
            index: 0,
            parent_fingerprint: [0u8; 4],
        };
        assert!(HdDeriver::derive_child(&parent, HARDENED_OFFSET).is_err());
    }

    #[test]
    fn test_parent_fingerprint_set() {
        let seed = [3u8; 64];
        let master = HdDeriver::master_key(&seed).unwrap();
        let child = HdDeriver::derive_child(&master, 0).unwrap();
        assert_ne!(child.parent_fingerprint, [0u8; 4]);
        // Same parent, same fingerprint regardless of child index
        let sibling = HdDeriver::derive_child(&master, 1).unwrap();
        assert_eq!(child.parent_fingerprint, sibling.parent_fingerprint);
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let seed = [5u8; 64];
        let master = HdDeriver::master_key(&seed).unwrap();
        let debug_output = format!("{:?}", master);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains(&hex::encode(master.private_key())));
    }
}
