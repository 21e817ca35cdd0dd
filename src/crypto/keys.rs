// src/crypto/keys.rs
//
// EVM Key Derivation - Mnemonic to Private Key, Public Key and Address
// EIP-55 (Checksum), Keccak-256, secp256k1, BIP-44 path m/44'/60'/0'/0/{i}

use crate::crypto::hd::HdDeriver;
use crate::crypto::mnemonic::WalletMnemonic;
use crate::crypto::paths::DerivationPaths;
use crate::error::{CryptoError, WalletError, WalletResult};
use alloy::primitives::Address;
use k256::{elliptic_curve::sec1::ToEncodedPoint, SecretKey};
use tiny_keccak::{Hasher, Keccak};
use zeroize::{Zeroize, Zeroizing};

/// Full key material for one EVM account.
///
/// `address` is a pure function of `public_key`, which is a pure function
/// of `private_key`; the three always belong together.
pub struct WalletKeys {
    /// 32-byte secp256k1 private key, auto-zeroize on drop.
    pub private_key: Zeroizing<[u8; 32]>,
    /// 64-byte uncompressed public key (x || y, no 0x04 prefix).
    pub public_key: [u8; 64],
    /// EIP-55 checksummed address string.
    pub address: String,
}

// Custom Debug - NEVER prints the private key
impl std::fmt::Debug for WalletKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletKeys")
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// EVM Key Deriver
///
/// # Flow: Mnemonic → Seed → BIP-44 node → Private Key → Public Key → Address
///
/// # Security
/// - Seed and intermediate key material are zeroized once consumed
/// - This module never stores keys; everything is transient
/// - [`EvmKeyDeriver::derive_wallet_keys`] is the one entry point external
///   callers should use, so raw key bytes never escape a composed call
///   without an explicit caller decision
pub struct EvmKeyDeriver;

impl EvmKeyDeriver {
    // =========================================================================
    // PRIVATE KEY
    // =========================================================================

    /// Private key for `m/44'/60'/0'/0/{account_index}`.
    pub fn private_key_for(
        mnemonic: &WalletMnemonic,
        account_index: u32,
    ) -> WalletResult<Zeroizing<[u8; 32]>> {
        let seed = mnemonic.to_seed(None);
        let node = HdDeriver::derive_path(seed.as_ref(), &DerivationPaths::evm(account_index))?;
        Ok(Zeroizing::new(*node.private_key()))
        // `seed` and `node` dropped & zeroed here
    }

    // =========================================================================
    // PUBLIC KEY
    // =========================================================================

    /// 64-byte uncompressed public key (x || y) for a private key.
    ///
    /// Rejects scalars the curve rejects (zero, >= curve order) with
    /// `InvalidKeyFormat`; those must never reach point multiplication.
    pub fn public_key_for(private_key: &[u8]) -> WalletResult<[u8; 64]> {
        // SecretKey::from_slice left-pads shorter inputs; require the
        // exact width so a truncated key never parses
        if private_key.len() != 32 {
            return Err(WalletError::Crypto(CryptoError::InvalidKeyFormat(
                "Private key must be exactly 32 bytes".to_string(),
            )));
        }
        let secret = SecretKey::from_slice(private_key).map_err(|e| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(format!(
                "Invalid secp256k1 private key: {}",
                e
            )))
        })?;

        let encoded = secret.public_key().to_encoded_point(false);
        let bytes = encoded.as_bytes();
        if bytes.len() != 65 {
            return Err(WalletError::Crypto(CryptoError::DerivationFailed(
                "Unexpected public key encoding".to_string(),
            )));
        }

        let mut out = [0u8; 64];
        out.copy_from_slice(&bytes[1..]); // strip the 0x04 prefix
        Ok(out)
    }

    // =========================================================================
    // ADDRESS
    // =========================================================================

    /// 20-byte address for a 64-byte uncompressed public key:
    /// last 20 bytes of Keccak-256(pubkey).
    pub fn address_bytes_for(public_key: &[u8; 64]) -> [u8; 20] {
        let mut hasher = Keccak::v256();
        let mut hash = [0u8; 32];
        hasher.update(public_key);
        hasher.finalize(&mut hash);

        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        hash.zeroize();
        address
    }

    /// EIP-55 checksummed address string for a public key.
    ///
    /// # Returns
    /// `"0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B"` (mixed-case checksum)
    #[inline]
    pub fn address_for(public_key: &[u8; 64]) -> String {
        Address::from_slice(&Self::address_bytes_for(public_key)).to_checksum(None)
    }

    // =========================================================================
    // COMPOSED ENTRY POINT
    // =========================================================================

    /// Mnemonic → full [`WalletKeys`] in one call.
    pub fn derive_wallet_keys(
        mnemonic: &WalletMnemonic,
        account_index: u32,
    ) -> WalletResult<WalletKeys> {
        let private_key = Self::private_key_for(mnemonic, account_index)?;
        let public_key = Self::public_key_for(private_key.as_ref())?;
        let address = Self::address_for(&public_key);
        Ok(WalletKeys {
            private_key,
            public_key,
            address,
        })
    }

    /// Address only - for flows that never need the key bytes.
    pub fn address_for_mnemonic(
        mnemonic: &WalletMnemonic,
        account_index: u32,
    ) -> WalletResult<String> {
        let private_key = Self::private_key_for(mnemonic, account_index)?;
        let public_key = Self::public_key_for(private_key.as_ref())?;
        Ok(Self::address_for(&public_key))
        // `private_key` dropped & zeroed here
    }

    // =========================================================================
    // ADDRESS UTILITIES
    // =========================================================================

    /// Is the string a well-formed Ethereum address (`0x` + 40 hex chars)?
    #[inline]
    pub fn is_valid_address(address: &str) -> bool {
        address.parse::<Address>().is_ok()
    }

    /// Normalize an address string to EIP-55 checksum form.
    pub fn to_checksum(address: &str) -> WalletResult<String> {
        let addr: Address = address.parse().map_err(|_| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(
                "Invalid Ethereum address format".to_string(),
            ))
        })?;
        Ok(addr.to_checksum(None))
    }

    /// Case-insensitive address equality via byte comparison.
    #[inline]
    pub fn address_equals(addr1: &str, addr2: &str) -> bool {
        match (addr1.parse::<Address>(), addr2.parse::<Address>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // "abandon ... about" at m/44'/60'/0'/0/0, a widely published
    // BIP-44/EVM reference pair
    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const TEST_PRIVATE_KEY: &str =
        "1837c1be8e2995ec11cda2b066151be2cfb48adf9e47b151d46adab3a21cdf67";
    const TEST_ADDRESS: &str = "0x9858EfFD232B4033E47d90003D41EC34EcaEda94";

    // Anvil/Hardhat account #0
    const ANVIL_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ANVIL_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_private_key_reference_vector() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC).unwrap();
        let key = EvmKeyDeriver::private_key_for(&mnemonic, 0).unwrap();
        assert_eq!(hex::encode(&*key), TEST_PRIVATE_KEY);
    }

    #[test]
    fn test_address_reference_vector() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC).unwrap();
        let keys = EvmKeyDeriver::derive_wallet_keys(&mnemonic, 0).unwrap();
        assert_eq!(keys.address, TEST_ADDRESS);
    }

    #[test]
    fn test_address_from_known_private_key() {
        let raw = hex::decode(ANVIL_PRIVATE_KEY).unwrap();
        let public_key = EvmKeyDeriver::public_key_for(&raw).unwrap();
        assert_eq!(EvmKeyDeriver::address_for(&public_key), ANVIL_ADDRESS);
    }

    #[test]
    fn test_account_indices_differ() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC).unwrap();
        let k0 = EvmKeyDeriver::derive_wallet_keys(&mnemonic, 0).unwrap();
        let k1 = EvmKeyDeriver::derive_wallet_keys(&mnemonic, 1).unwrap();
        assert_ne!(&*k0.private_key, &*k1.private_key);
        assert_ne!(k0.address, k1.address);
    }

    #[test]
    fn test_derivation_deterministic() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC).unwrap();
        let a = EvmKeyDeriver::derive_wallet_keys(&mnemonic, 0).unwrap();
        let b = EvmKeyDeriver::derive_wallet_keys(&mnemonic, 0).unwrap();
        assert_eq!(&*a.private_key, &*b.private_key);
        assert_eq!(a.public_key, b.public_key);
        assert_eq!(a.address, b.address);
    }

    #[test]
    fn test_address_for_mnemonic_matches_full_derivation() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC).unwrap();
        let addr = EvmKeyDeriver::address_for_mnemonic(&mnemonic, 0).unwrap();
        assert_eq!(addr, TEST_ADDRESS);
    }

    #[test]
    fn test_public_key_rejects_zero_key() {
        assert!(EvmKeyDeriver::public_key_for(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_public_key_rejects_bad_length() {
        assert!(EvmKeyDeriver::public_key_for(&[1u8; 31]).is_err());
        assert!(EvmKeyDeriver::public_key_for(&[1u8; 33]).is_err());
        assert!(EvmKeyDeriver::public_key_for(&[]).is_err());
    }

    #[test]
    fn test_is_valid_address() {
        assert!(EvmKeyDeriver::is_valid_address(TEST_ADDRESS));
        assert!(EvmKeyDeriver::is_valid_address(ANVIL_ADDRESS));
        assert!(EvmKeyDeriver::is_valid_address(
            "0xdead000000000000000000000000000000000000"
        ));
        assert!(!EvmKeyDeriver::is_valid_address("0xinvalid"));
        assert!(!EvmKeyDeriver::is_valid_address("not an address"));
        assert!(!EvmKeyDeriver::is_valid_address("0x123"));
        assert!(!EvmKeyDeriver::is_valid_address(""));
    }

    #[test]
    fn test_to_checksum() {
        let lowercase = "0x9858effd232b4033e47d90003d41ec34ecaeda94";
        assert_eq!(
            EvmKeyDeriver::to_checksum(lowercase).unwrap(),
            TEST_ADDRESS
        );
    }

    #[test]
    fn test_address_equals() {
        let upper = "0xABCD1234ABCD1234ABCD1234ABCD1234ABCD1234";
        let lower = "0xabcd1234abcd1234abcd1234abcd1234abcd1234";
        assert!(EvmKeyDeriver::address_equals(upper, lower));
        assert!(!EvmKeyDeriver::address_equals(upper, TEST_ADDRESS));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC).unwrap();
        let keys = EvmKeyDeriver::derive_wallet_keys(&mnemonic, 0).unwrap();
        let debug_output = format!("{:?}", keys);
        assert!(!debug_output.contains(TEST_PRIVATE_KEY));
        assert!(debug_output.contains("REDACTED"));
    }
}
