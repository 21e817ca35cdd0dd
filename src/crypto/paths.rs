// src/crypto/paths.rs
//
// Derivation Paths Module - BIP-44 EVM Path Builders
// BIP-44 (Purpose), SLIP-44 coin_type 60 (Ethereum and all EVM chains)

/// SLIP-44 registered coin type for Ethereum.
///
/// Every EVM-compatible chain (BSC, Polygon, Arbitrum, Base, ...) shares
/// coin_type 60; replay protection between them lives in the transaction
/// chain id, not in the derivation path.
pub const ETHEREUM_COIN_TYPE: u32 = 60;

/// Pre-built derivation paths for the wallet.
///
/// # Convention
/// BIP-44: `m/44'/60'/account'/change/index`. The first three segments
/// are always hardened, the last two never are.
pub struct DerivationPaths;

impl DerivationPaths {
    /// Default EVM account: `m/44'/60'/0'/0/0`.
    pub const EVM_0: &'static str = "m/44'/60'/0'/0/0";

    /// EVM path with a custom address index.
    #[inline]
    pub fn evm(index: u32) -> String {
        format!("m/44'/60'/0'/0/{}", index)
    }

    /// EVM path with custom account and address index (multi-account).
    #[inline]
    pub fn evm_account(account: u32, index: u32) -> String {
        format!("m/44'/60'/{}'/0/{}", account, index)
    }

    /// Generic BIP-44 path builder.
    ///
    /// # Arguments
    /// * `purpose` - 44 for BIP-44
    /// * `coin_type` - SLIP-44 coin type
    /// * `account` - account index (usually 0)
    /// * `change` - 0 = external, 1 = internal
    /// * `index` - address index
    #[inline]
    pub fn bip44(purpose: u32, coin_type: u32, account: u32, change: u32, index: u32) -> String {
        format!(
            "m/{}'/{}'/{}'/{}/{}",
            purpose, coin_type, account, change, index
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evm_paths() {
        assert_eq!(DerivationPaths::EVM_0, "m/44'/60'/0'/0/0");
        assert_eq!(DerivationPaths::evm(0), "m/44'/60'/0'/0/0");
        assert_eq!(DerivationPaths::evm(5), "m/44'/60'/0'/0/5");
        assert_eq!(DerivationPaths::evm_account(1, 3), "m/44'/60'/1'/0/3");
    }

    #[test]
    fn test_bip44_builder() {
        assert_eq!(DerivationPaths::bip44(44, 60, 0, 0, 0), "m/44'/60'/0'/0/0");
        assert_eq!(
            DerivationPaths::bip44(44, ETHEREUM_COIN_TYPE, 2, 0, 7),
            "m/44'/60'/2'/0/7"
        );
    }
}
