//! The storage layout table.
//!
//! The table is append-only: a logic upgrade may claim new trailing slots
//! but must never reorder, retype or repurpose one already listed here.
//! Violating that silently corrupts unrelated fields after an upgrade, so
//! the upgrade test suite reads raw slots across versions and requires
//! bit-identical values.

use usdr_common::{
    abi::word_from_address,
    crypto::{Address, Hash},
};

use super::{mapping_slot, nested_slot, scalar_slot, StorageKey};

// v1 layout
pub const OWNER: u64 = 0;
pub const PAUSER: u64 = 1;
pub const PAUSED: u64 = 2;
pub const BLACKLISTER: u64 = 3;
pub const NAME: u64 = 4;
pub const SYMBOL: u64 = 5;
pub const DECIMALS: u64 = 6;
pub const CURRENCY: u64 = 7;
pub const MASTER_MINTER: u64 = 8;
pub const TOTAL_SUPPLY: u64 = 9;
pub const INITIALIZED_VERSION: u64 = 10;
/// Mapping: account => packed (blacklist flag | balance) word.
pub const BALANCES: u64 = 11;
/// Nested mapping: owner => spender => allowance.
pub const ALLOWANCES: u64 = 12;
/// Mapping: account => is-minter flag.
pub const MINTERS: u64 = 13;
/// Mapping: minter => remaining mint allowance.
pub const MINTER_ALLOWANCE: u64 = 14;
/// Mapping: account => blacklist flag. Deprecated since v2: the flag moved
/// into bit 255 of the balances word. The slot is retained, never reused.
pub const LEGACY_BLACKLIST: u64 = 15;

// v2 appendments
/// Nested mapping: authorizer => nonce => authorization state word.
pub const AUTHORIZATION_STATE: u64 = 16;
/// Mapping: owner => sequential permit nonce.
pub const PERMIT_NONCES: u64 = 17;
pub const CACHED_CHAIN_ID: u64 = 18;
pub const CACHED_DOMAIN_SEPARATOR: u64 = 19;

pub fn owner() -> StorageKey {
    scalar_slot(OWNER)
}

pub fn pauser() -> StorageKey {
    scalar_slot(PAUSER)
}

pub fn paused() -> StorageKey {
    scalar_slot(PAUSED)
}

pub fn blacklister() -> StorageKey {
    scalar_slot(BLACKLISTER)
}

pub fn name() -> StorageKey {
    scalar_slot(NAME)
}

pub fn symbol() -> StorageKey {
    scalar_slot(SYMBOL)
}

pub fn decimals() -> StorageKey {
    scalar_slot(DECIMALS)
}

pub fn currency() -> StorageKey {
    scalar_slot(CURRENCY)
}

pub fn master_minter() -> StorageKey {
    scalar_slot(MASTER_MINTER)
}

pub fn total_supply() -> StorageKey {
    scalar_slot(TOTAL_SUPPLY)
}

pub fn initialized_version() -> StorageKey {
    scalar_slot(INITIALIZED_VERSION)
}

pub fn cached_chain_id() -> StorageKey {
    scalar_slot(CACHED_CHAIN_ID)
}

pub fn cached_domain_separator() -> StorageKey {
    scalar_slot(CACHED_DOMAIN_SEPARATOR)
}

pub fn balance_key(account: &Address) -> StorageKey {
    mapping_slot(BALANCES, word_from_address(account))
}

pub fn allowance_key(owner: &Address, spender: &Address) -> StorageKey {
    let parent = mapping_slot(ALLOWANCES, word_from_address(owner));
    nested_slot(parent, word_from_address(spender))
}

pub fn minter_key(account: &Address) -> StorageKey {
    mapping_slot(MINTERS, word_from_address(account))
}

pub fn minter_allowance_key(minter: &Address) -> StorageKey {
    mapping_slot(MINTER_ALLOWANCE, word_from_address(minter))
}

pub fn legacy_blacklist_key(account: &Address) -> StorageKey {
    mapping_slot(LEGACY_BLACKLIST, word_from_address(account))
}

pub fn authorization_key(authorizer: &Address, nonce: &Hash) -> StorageKey {
    let parent = mapping_slot(AUTHORIZATION_STATE, word_from_address(authorizer));
    nested_slot(parent, nonce.to_bytes())
}

pub fn permit_nonce_key(owner: &Address) -> StorageKey {
    mapping_slot(PERMIT_NONCES, word_from_address(owner))
}
