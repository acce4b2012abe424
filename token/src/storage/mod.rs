//! Slot-addressed word storage.
//!
//! All persistent state of the token lives here as 32-byte words keyed by
//! 32-byte slot identifiers, so raw slot-indexed reads stay possible for
//! layout-compatibility testing across upgrades. Scalar fields occupy
//! low-numbered slots; a mapping's own slot stores nothing and its entries
//! live at `keccak256(key ++ slot)`.

pub mod layout;

use indexmap::IndexMap;
use primitive_types::U256;

use usdr_common::{
    abi::{
        address_from_word, bool_from_word, u256_from_word, word_from_address, word_from_bool,
        word_from_u256, word_from_u64, Word, ZERO_WORD,
    },
    crypto::{keccak256_concat, Address, Hash},
};

use crate::error::TokenError;

/// A storage slot identifier.
pub type StorageKey = Hash;

/// Slot of a scalar field, from its index in the layout table.
pub fn scalar_slot(index: u64) -> StorageKey {
    Hash::new(word_from_u64(index))
}

/// Entry slot of a top-level mapping: keccak256(key ++ slotIndex).
pub fn mapping_slot(base_index: u64, key: Word) -> StorageKey {
    nested_slot(scalar_slot(base_index), key)
}

/// Entry slot of a nested mapping: keccak256(key ++ parentSlot).
pub fn nested_slot(parent: StorageKey, key: Word) -> StorageKey {
    keccak256_concat(&[&key, parent.as_bytes()])
}

/// Word-oriented storage with zero as the default value of every slot.
///
/// `Clone` is the staging primitive for all-or-nothing call semantics:
/// the proxy executes logic against a clone and commits it only on success.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Storage {
    words: IndexMap<StorageKey, Word>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw read; an absent slot reads as the zero word.
    pub fn word(&self, key: &StorageKey) -> Word {
        self.words.get(key).copied().unwrap_or(ZERO_WORD)
    }

    /// Raw write; writing the zero word clears the slot.
    pub fn set_word(&mut self, key: StorageKey, word: Word) {
        if word == ZERO_WORD {
            self.words.shift_remove(&key);
        } else {
            self.words.insert(key, word);
        }
    }

    pub fn u256_at(&self, key: &StorageKey) -> U256 {
        u256_from_word(&self.word(key))
    }

    pub fn set_u256(&mut self, key: StorageKey, value: U256) {
        self.set_word(key, word_from_u256(&value));
    }

    pub fn u64_at(&self, key: &StorageKey) -> u64 {
        self.u256_at(key).low_u64()
    }

    pub fn set_u64(&mut self, key: StorageKey, value: u64) {
        self.set_word(key, word_from_u64(value));
    }

    pub fn address_at(&self, key: &StorageKey) -> Address {
        address_from_word(&self.word(key))
    }

    pub fn set_address(&mut self, key: StorageKey, address: Address) {
        self.set_word(key, word_from_address(&address));
    }

    pub fn bool_at(&self, key: &StorageKey) -> bool {
        bool_from_word(&self.word(key))
    }

    pub fn set_bool(&mut self, key: StorageKey, value: bool) {
        self.set_word(key, word_from_bool(value));
    }

    pub fn hash_at(&self, key: &StorageKey) -> Hash {
        Hash::new(self.word(key))
    }

    pub fn set_hash(&mut self, key: StorageKey, value: Hash) {
        self.set_word(key, value.to_bytes());
    }

    /// Short strings pack into one word: data bytes left-aligned, byte
    /// length in the final byte. Longer strings do not fit the layout.
    pub fn short_string_at(&self, key: &StorageKey) -> String {
        let word = self.word(key);
        let len = (word[31] as usize).min(31);
        String::from_utf8_lossy(&word[..len]).into_owned()
    }

    pub fn set_short_string(&mut self, key: StorageKey, value: &str) -> Result<(), TokenError> {
        let bytes = value.as_bytes();
        if bytes.len() > 31 {
            return Err(TokenError::StringTooLong);
        }
        let mut word = ZERO_WORD;
        word[..bytes.len()].copy_from_slice(bytes);
        word[31] = bytes.len() as u8;
        self.set_word(key, word);
        Ok(())
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
