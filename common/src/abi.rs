//! Fixed 32-byte word encoding.
//!
//! Both EIP-712 struct hashing and mapping-slot derivation operate on
//! sequences of 32-byte words with every scalar padded to a full word.
//! Field order is always pinned by the caller to the published schema
//! string, never inferred from a call site.

use primitive_types::U256;

use crate::crypto::{Address, Hash};

/// A single ABI word.
pub type Word = [u8; 32];

/// Zero word.
pub const ZERO_WORD: Word = [0u8; 32];

/// Left-pad a 20-byte address into a word.
pub fn word_from_address(address: &Address) -> Word {
    let mut word = ZERO_WORD;
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Big-endian encoding of a 256-bit unsigned integer.
pub fn word_from_u256(value: &U256) -> Word {
    value.to_big_endian()
}

/// Big-endian encoding of a 64-bit unsigned integer, left-padded.
pub fn word_from_u64(value: u64) -> Word {
    word_from_u256(&U256::from(value))
}

/// A boolean occupies the lowest byte of its word.
pub fn word_from_bool(value: bool) -> Word {
    let mut word = ZERO_WORD;
    word[31] = value as u8;
    word
}

/// A 32-byte value is already a word.
pub fn word_from_hash(value: &Hash) -> Word {
    *value.as_bytes()
}

/// Concatenate words into a single buffer.
pub fn encode_words(words: &[Word]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(words.len() * 32);
    for word in words {
        buffer.extend_from_slice(word);
    }
    buffer
}

/// Decode a word as a 256-bit unsigned integer.
pub fn u256_from_word(word: &Word) -> U256 {
    U256::from_big_endian(word)
}

/// Decode the trailing 20 bytes of a word as an address.
pub fn address_from_word(word: &Word) -> Address {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Address::new(bytes)
}

/// Decode the lowest byte of a word as a boolean.
pub fn bool_from_word(word: &Word) -> bool {
    word[31] != 0
}
