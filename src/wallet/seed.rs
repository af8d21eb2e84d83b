//! Seed phrase container
//!
//! The phrase is validated once, at construction, and then only ever leaves
//! this module as a derived [`SecureSigner`]. There is no accessor, no
//! `Serialize`, no `Clone`, and `Debug` prints no fields.
//!
//! The phrase lives in a [`SecretString`] and is zeroized on drop. alloy's
//! mnemonic builder takes an owned `String` copy during derivation; that copy
//! is dropped immediately but not wiped, so zeroing is best-effort.

use alloy::signers::local::coins_bip39::{English, Mnemonic};
use alloy::signers::local::MnemonicBuilder;
use secrecy::{ExposeSecret, SecretString};

use super::signer::SecureSigner;
use crate::{Error, Result};

pub struct SeedMaterial {
    phrase: SecretString,
}

impl SeedMaterial {
    /// Validate a BIP-39 (English) phrase against the wordlist and checksum
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ");

        if normalized.is_empty() {
            return Err(Error::InvalidSeed("seed phrase is empty".to_string()));
        }

        Mnemonic::<English>::new_from_phrase(&normalized)
            .map_err(|e| Error::InvalidSeed(e.to_string()))?;

        Ok(Self {
            phrase: SecretString::from(normalized),
        })
    }

    /// Derive the signer at a full BIP-32 path (e.g. `m/44'/60'/0'/0/0`)
    pub(crate) fn derive_signer(&self, path: &str) -> Result<SecureSigner> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(self.phrase.expose_secret())
            .derivation_path(path)
            .map_err(|e| Error::InvalidArgument(format!("Invalid derivation path {}: {}", path, e)))?
            .build()
            .map_err(|e| Error::Wallet(format!("Key derivation failed: {}", e)))?;

        Ok(SecureSigner::new(signer))
    }
}

impl std::fmt::Debug for SeedMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedMaterial").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const PHRASE: &str = "test test test test test test test test test test test junk";

    #[test]
    fn test_valid_phrase_is_accepted() {
        assert!(SeedMaterial::from_phrase(PHRASE).is_ok());
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let messy = format!("  {}  ", PHRASE.replace(' ', "   "));
        let seed = SeedMaterial::from_phrase(&messy).unwrap();
        let signer = seed.derive_signer("m/44'/60'/0'/0/0").unwrap();
        assert_eq!(
            signer.address(),
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
    }

    #[test]
    fn test_invalid_phrases_are_rejected() {
        for bad in [
            "",
            "   ",
            "not a real mnemonic phrase at all",
            // valid words, bad checksum
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon",
            // unknown word
            "test test test test test test test test test test test junkk",
        ] {
            let err = SeedMaterial::from_phrase(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidSeed(_)), "accepted {:?}", bad);
            assert!(err.to_string().to_lowercase().contains("invalid seed"));
        }
    }

    #[test]
    fn test_debug_prints_nothing_sensitive() {
        let seed = SeedMaterial::from_phrase(PHRASE).unwrap();
        let debug_str = format!("{:?}", seed);
        assert_eq!(debug_str, "SeedMaterial { .. }");
    }

    #[test]
    fn test_invalid_path_is_rejected() {
        let seed = SeedMaterial::from_phrase(PHRASE).unwrap();
        let err = seed.derive_signer("m/not/a/path").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
