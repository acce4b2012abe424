//! Signer-polymorphic signature verification.
//!
//! A plain-key signer is checked by ECDSA public-key recovery; a
//! smart-contract wallet is checked through its read-only ERC-1271
//! callback. Both collapse to one verdict consumed identically downstream.

use usdr_common::crypto::{recover, Address, Hash, Signature};

use crate::{config::ERC1271_MAGIC_VALUE, env::Env, error::TokenError};

/// A signature from either kind of signer.
#[derive(Clone, Debug)]
pub enum SignerSignature {
    /// Recoverable secp256k1 signature from an externally held key.
    Key(Signature),
    /// Opaque signature blob for the signer's ERC-1271 wallet callback.
    Wallet(Vec<u8>),
}

/// Verify that `signature` binds `signer` to `digest`.
///
/// Every failure mode (unknown wallet, wrong recovered address, malformed
/// or malleable encoding, wrong magic value) collapses to
/// `InvalidSignature`; callers never learn which check failed.
pub fn verify_signer(
    env: &Env,
    signer: &Address,
    digest: &Hash,
    signature: &SignerSignature,
) -> Result<(), TokenError> {
    match signature {
        SignerSignature::Key(signature) => match recover(digest, signature) {
            Ok(address) if address == *signer => Ok(()),
            _ => Err(TokenError::InvalidSignature),
        },
        SignerSignature::Wallet(bytes) => {
            let wallet = env
                .wallets
                .get(signer)
                .ok_or(TokenError::InvalidSignature)?;
            if wallet.is_valid_signature(digest, bytes) == ERC1271_MAGIC_VALUE {
                Ok(())
            } else {
                Err(TokenError::InvalidSignature)
            }
        }
    }
}
