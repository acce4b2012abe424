//! The packed account word.
//!
//! One storage word carries both the blacklist flag (bit 255) and the
//! balance (the low 255 bits). The flag is orthogonal to the balance value
//! and every stored balance must stay below 2^255.

use lazy_static::lazy_static;
use primitive_types::U256;

use usdr_common::{
    abi::{u256_from_word, word_from_u256, Word},
    crypto::Address,
};

use crate::{
    error::TokenError,
    storage::{layout, Storage},
};

lazy_static! {
    /// Bit 255 of the packed account word.
    pub static ref BLACKLIST_FLAG: U256 = U256::one() << 255;
    /// Largest representable balance: 2^255 - 1.
    pub static ref MAX_BALANCE: U256 = (U256::one() << 255) - 1;
}

/// Decoded form of a balances-mapping entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountWord {
    pub balance: U256,
    pub blacklisted: bool,
}

impl AccountWord {
    pub fn decode(word: &Word) -> Self {
        let raw = u256_from_word(word);
        Self {
            balance: raw & *MAX_BALANCE,
            blacklisted: raw.bit(255),
        }
    }

    pub fn encode(&self) -> Result<Word, TokenError> {
        if self.balance > *MAX_BALANCE {
            return Err(TokenError::BalanceOverflow);
        }
        let mut raw = self.balance;
        if self.blacklisted {
            raw = raw | *BLACKLIST_FLAG;
        }
        Ok(word_from_u256(&raw))
    }
}

pub fn read_account(storage: &Storage, account: &Address) -> AccountWord {
    AccountWord::decode(&storage.word(&layout::balance_key(account)))
}

pub fn write_account(
    storage: &mut Storage,
    account: &Address,
    word: &AccountWord,
) -> Result<(), TokenError> {
    let encoded = word.encode()?;
    storage.set_word(layout::balance_key(account), encoded);
    Ok(())
}
