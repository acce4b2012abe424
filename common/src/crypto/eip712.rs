//! EIP-712 typed-data hashing.
//!
//! A digest is bound to a domain (token name, version string, chain id and
//! verifying contract address) so a signature for one deployment can never
//! be replayed against another.

use lazy_static::lazy_static;

use crate::abi::{encode_words, word_from_address, word_from_u64, Word};

use super::{keccak256, keccak256_concat, Address, Hash};

lazy_static! {
    /// keccak256("EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)")
    pub static ref DOMAIN_TYPEHASH: Hash = keccak256(
        b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)"
    );
}

/// EIP-712 domain parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

/// Compute the domain separator for the given parameters.
pub fn domain_separator(domain: &Domain) -> Hash {
    let words: [Word; 5] = [
        *DOMAIN_TYPEHASH.as_bytes(),
        *keccak256(domain.name.as_bytes()).as_bytes(),
        *keccak256(domain.version.as_bytes()).as_bytes(),
        word_from_u64(domain.chain_id),
        word_from_address(&domain.verifying_contract),
    ];
    keccak256(&encode_words(&words))
}

/// Hash a struct as keccak256(typeHash || encoded fields).
///
/// The caller is responsible for passing fields in the exact order of the
/// published type string.
pub fn struct_hash(type_hash: &Hash, fields: &[Word]) -> Hash {
    keccak256_concat(&[type_hash.as_bytes(), &encode_words(fields)])
}

/// Final signable digest: keccak256("\x19\x01" || separator || structHash).
pub fn typed_data_digest(separator: &Hash, struct_hash: &Hash) -> Hash {
    keccak256_concat(&[b"\x19\x01", separator.as_bytes(), struct_hash.as_bytes()])
}
