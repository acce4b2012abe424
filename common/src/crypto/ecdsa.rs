use k256::{
    ecdsa::{RecoveryId, Signature as RecoverableSignature, SigningKey, VerifyingKey},
    elliptic_curve::scalar::IsHigh,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{Address, Hash};

/// Size of a recoverable signature in bytes (r || s || v).
pub const SIGNATURE_SIZE: usize = 65;

/// Error types for ECDSA signature handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcdsaError {
    /// The recovery byte is not one of the two accepted values.
    #[error("Invalid recovery value: expected 27 or 28, got {0}")]
    InvalidV(u8),

    /// r or s is not a valid non-zero curve scalar.
    #[error("Invalid signature scalar")]
    InvalidScalar,

    /// s is in the upper half of the curve order. Such signatures are
    /// malleable and always rejected.
    #[error("Signature s value is in the upper half of the curve order")]
    HighS,

    /// Public key recovery failed for the given digest.
    #[error("Public key recovery failed")]
    RecoveryFailed,

    /// Signing failed.
    #[error("Signing failed")]
    SigningFailed,

    /// Invalid signature length when parsing from bytes.
    #[error("Invalid signature length: expected {}, got {}", SIGNATURE_SIZE, _0)]
    InvalidLength(usize),
}

/// A recoverable secp256k1 signature over a 32-byte digest.
///
/// Only the non-malleable form is accepted: `v` must be 27 or 28 and `s`
/// must be in the lower half of the curve order.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub v: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl Signature {
    pub const fn new(v: u8, r: [u8; 32], s: [u8; 32]) -> Self {
        Self { v, r, s }
    }

    /// Parse a signature from its 65-byte r || s || v form.
    pub fn from_slice(slice: &[u8]) -> Result<Self, EcdsaError> {
        if slice.len() != SIGNATURE_SIZE {
            return Err(EcdsaError::InvalidLength(slice.len()));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&slice[0..32]);
        s.copy_from_slice(&slice[32..64]);
        Ok(Self::new(slice[64], r, s))
    }

    /// Serialize to the 65-byte r || s || v form.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE] {
        let mut bytes = [0u8; SIGNATURE_SIZE];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature(v={}, r={}, s={})",
            self.v,
            hex::encode(self.r),
            hex::encode(self.s)
        )
    }
}

/// Recover the signer address from a digest and a recoverable signature.
///
/// Rejects malformed `v`, zero or out-of-range scalars, and high-`s`
/// signatures before attempting recovery.
pub fn recover(digest: &Hash, signature: &Signature) -> Result<Address, EcdsaError> {
    if signature.v != 27 && signature.v != 28 {
        return Err(EcdsaError::InvalidV(signature.v));
    }

    let parsed = RecoverableSignature::from_scalars(signature.r, signature.s)
        .map_err(|_| EcdsaError::InvalidScalar)?;
    if bool::from(parsed.s().is_high()) {
        return Err(EcdsaError::HighS);
    }

    let recovery =
        RecoveryId::from_byte(signature.v - 27).ok_or(EcdsaError::InvalidV(signature.v))?;
    let key = VerifyingKey::recover_from_prehash(digest.as_bytes(), &parsed, recovery)
        .map_err(|_| EcdsaError::RecoveryFailed)?;
    Ok(Address::from_public_key(&key))
}

/// Sign a 32-byte digest, producing the canonical low-`s` signature with
/// `v` mapped to 27/28.
pub fn sign_digest(key: &SigningKey, digest: &Hash) -> Result<Signature, EcdsaError> {
    let (mut signature, mut recovery) = key
        .sign_prehash_recoverable(digest.as_bytes())
        .map_err(|_| EcdsaError::SigningFailed)?;

    // Normalizing s negates the point's y parity, so the recovery id flips
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery = RecoveryId::from_byte(recovery.to_byte() ^ 1).ok_or(EcdsaError::SigningFailed)?;
    }

    let (r_bytes, s_bytes) = signature.split_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&r_bytes);
    s.copy_from_slice(&s_bytes);
    Ok(Signature::new(27 + recovery.to_byte(), r, s))
}

/// Address of the given signing key.
pub fn signer_address(key: &SigningKey) -> Address {
    Address::from_public_key(key.verifying_key())
}
