//! The guarded double-entry ledger.
//!
//! Every mutating operation evaluates its guards (pause flag, blacklist,
//! role) before touching a single slot, then applies checked arithmetic
//! only. `total_supply` equals the sum of all balances after every
//! operation; the proxy's staging commit makes each call all-or-nothing.

mod account;

pub use account::{read_account, write_account, AccountWord, BLACKLIST_FLAG, MAX_BALANCE};

use log::debug;
use primitive_types::U256;

use usdr_common::crypto::Address;

use crate::{
    config::INFINITE_ALLOWANCE,
    env::Env,
    error::TokenError,
    roles::{ensure_blacklister, ensure_master_minter, ensure_not_paused},
    storage::{layout, Storage},
};

// ===== Queries =====

pub fn balance_of(storage: &Storage, account: &Address) -> U256 {
    read_account(storage, account).balance
}

pub fn is_blacklisted(storage: &Storage, account: &Address) -> bool {
    read_account(storage, account).blacklisted
}

pub fn total_supply(storage: &Storage) -> U256 {
    storage.u256_at(&layout::total_supply())
}

pub fn allowance(storage: &Storage, owner: &Address, spender: &Address) -> U256 {
    storage.u256_at(&layout::allowance_key(owner, spender))
}

pub fn is_minter(storage: &Storage, account: &Address) -> bool {
    storage.bool_at(&layout::minter_key(account))
}

pub fn minter_allowance(storage: &Storage, minter: &Address) -> U256 {
    storage.u256_at(&layout::minter_allowance_key(minter))
}

/// Pre-v2 blacklist flag, read only during the v2 migration.
pub fn legacy_blacklisted(storage: &Storage, account: &Address) -> bool {
    storage.bool_at(&layout::legacy_blacklist_key(account))
}

// ===== Guards =====

pub fn ensure_not_blacklisted(storage: &Storage, account: &Address) -> Result<(), TokenError> {
    if is_blacklisted(storage, account) {
        return Err(TokenError::Blacklisted(*account));
    }
    Ok(())
}

pub fn ensure_minter(storage: &Storage, caller: &Address) -> Result<(), TokenError> {
    if !is_minter(storage, caller) {
        return Err(TokenError::NotMinter(*caller));
    }
    Ok(())
}

// ===== Transfers =====

/// Move a balance without evaluating caller guards. Both sides are
/// read-modify-written sequentially so a self-transfer nets to zero.
pub(crate) fn transfer_balance(
    storage: &mut Storage,
    from: &Address,
    to: &Address,
    value: U256,
) -> Result<(), TokenError> {
    if to.is_zero() {
        return Err(TokenError::ZeroAddress);
    }

    let mut sender = read_account(storage, from);
    sender.balance = sender
        .balance
        .checked_sub(value)
        .ok_or(TokenError::InsufficientBalance)?;
    write_account(storage, from, &sender)?;

    let mut receiver = read_account(storage, to);
    receiver.balance = receiver
        .balance
        .checked_add(value)
        .ok_or(TokenError::ArithmeticOverflow)?;
    write_account(storage, to, &receiver)?;

    debug!("transferred {} from {} to {}", value, from, to);
    Ok(())
}

pub fn transfer(
    storage: &mut Storage,
    env: &Env,
    to: &Address,
    value: U256,
) -> Result<(), TokenError> {
    ensure_not_paused(storage)?;
    ensure_not_blacklisted(storage, &env.caller)?;
    ensure_not_blacklisted(storage, to)?;
    transfer_balance(storage, &env.caller, to, value)
}

pub fn transfer_from(
    storage: &mut Storage,
    env: &Env,
    from: &Address,
    to: &Address,
    value: U256,
) -> Result<(), TokenError> {
    ensure_not_paused(storage)?;
    ensure_not_blacklisted(storage, &env.caller)?;
    ensure_not_blacklisted(storage, from)?;
    ensure_not_blacklisted(storage, to)?;

    let current = allowance(storage, from, &env.caller);
    if current != INFINITE_ALLOWANCE {
        let remaining = current
            .checked_sub(value)
            .ok_or(TokenError::InsufficientAllowance)?;
        storage.set_u256(layout::allowance_key(from, &env.caller), remaining);
    }

    transfer_balance(storage, from, to, value)
}

// ===== Allowances =====

pub(crate) fn set_allowance(
    storage: &mut Storage,
    owner: &Address,
    spender: &Address,
    value: U256,
) -> Result<(), TokenError> {
    if spender.is_zero() {
        return Err(TokenError::ZeroAddress);
    }
    storage.set_u256(layout::allowance_key(owner, spender), value);
    debug!("allowance of {} for spender {} set to {}", owner, spender, value);
    Ok(())
}

pub(crate) fn raise_allowance(
    storage: &mut Storage,
    owner: &Address,
    spender: &Address,
    increment: U256,
) -> Result<(), TokenError> {
    let current = allowance(storage, owner, spender);
    let raised = current
        .checked_add(increment)
        .ok_or(TokenError::ArithmeticOverflow)?;
    set_allowance(storage, owner, spender, raised)
}

pub(crate) fn lower_allowance(
    storage: &mut Storage,
    owner: &Address,
    spender: &Address,
    decrement: U256,
) -> Result<(), TokenError> {
    let current = allowance(storage, owner, spender);
    let lowered = current
        .checked_sub(decrement)
        .ok_or(TokenError::AllowanceUnderflow)?;
    set_allowance(storage, owner, spender, lowered)
}

fn allowance_guards(storage: &Storage, env: &Env, spender: &Address) -> Result<(), TokenError> {
    ensure_not_paused(storage)?;
    ensure_not_blacklisted(storage, &env.caller)?;
    ensure_not_blacklisted(storage, spender)?;
    Ok(())
}

pub fn approve(
    storage: &mut Storage,
    env: &Env,
    spender: &Address,
    value: U256,
) -> Result<(), TokenError> {
    allowance_guards(storage, env, spender)?;
    set_allowance(storage, &env.caller, spender, value)
}

pub fn increase_allowance(
    storage: &mut Storage,
    env: &Env,
    spender: &Address,
    increment: U256,
) -> Result<(), TokenError> {
    allowance_guards(storage, env, spender)?;
    raise_allowance(storage, &env.caller, spender, increment)
}

pub fn decrease_allowance(
    storage: &mut Storage,
    env: &Env,
    spender: &Address,
    decrement: U256,
) -> Result<(), TokenError> {
    allowance_guards(storage, env, spender)?;
    lower_allowance(storage, &env.caller, spender, decrement)
}

// ===== Minting =====

pub fn mint(
    storage: &mut Storage,
    env: &Env,
    to: &Address,
    value: U256,
) -> Result<(), TokenError> {
    ensure_not_paused(storage)?;
    ensure_minter(storage, &env.caller)?;
    ensure_not_blacklisted(storage, &env.caller)?;
    ensure_not_blacklisted(storage, to)?;
    if to.is_zero() {
        return Err(TokenError::ZeroAddress);
    }
    if value.is_zero() {
        return Err(TokenError::ZeroAmount);
    }

    let budget = minter_allowance(storage, &env.caller);
    let remaining = budget
        .checked_sub(value)
        .ok_or(TokenError::InsufficientMintAllowance)?;

    let mut receiver = read_account(storage, to);
    receiver.balance = receiver
        .balance
        .checked_add(value)
        .ok_or(TokenError::ArithmeticOverflow)?;
    write_account(storage, to, &receiver)?;

    let supply = total_supply(storage)
        .checked_add(value)
        .ok_or(TokenError::ArithmeticOverflow)?;
    storage.set_u256(layout::total_supply(), supply);
    storage.set_u256(layout::minter_allowance_key(&env.caller), remaining);

    debug!("minted {} to {}, total supply {}", value, to, supply);
    Ok(())
}

pub fn burn(storage: &mut Storage, env: &Env, value: U256) -> Result<(), TokenError> {
    ensure_not_paused(storage)?;
    ensure_minter(storage, &env.caller)?;
    ensure_not_blacklisted(storage, &env.caller)?;
    if value.is_zero() {
        return Err(TokenError::ZeroAmount);
    }

    let mut account = read_account(storage, &env.caller);
    account.balance = account
        .balance
        .checked_sub(value)
        .ok_or(TokenError::InsufficientBalance)?;
    write_account(storage, &env.caller, &account)?;

    let supply = total_supply(storage)
        .checked_sub(value)
        .ok_or(TokenError::ArithmeticUnderflow)?;
    storage.set_u256(layout::total_supply(), supply);

    // The minter's mint allowance is never restored by a burn
    debug!("burned {} from {}, total supply {}", value, env.caller, supply);
    Ok(())
}

// ===== Minter administration (exempt from the pause guard so minters
// can be revoked during an emergency halt) =====

pub fn configure_minter(
    storage: &mut Storage,
    env: &Env,
    minter: &Address,
    allowance: U256,
) -> Result<(), TokenError> {
    ensure_master_minter(storage, &env.caller)?;
    storage.set_bool(layout::minter_key(minter), true);
    storage.set_u256(layout::minter_allowance_key(minter), allowance);
    debug!("configured minter {} with allowance {}", minter, allowance);
    Ok(())
}

pub fn remove_minter(storage: &mut Storage, env: &Env, minter: &Address) -> Result<(), TokenError> {
    ensure_master_minter(storage, &env.caller)?;
    storage.set_bool(layout::minter_key(minter), false);
    storage.set_u256(layout::minter_allowance_key(minter), U256::zero());
    debug!("removed minter {}", minter);
    Ok(())
}

// ===== Blacklist administration (exempt from the pause guard) =====

/// Set the blacklist flag. The balance is untouched: blacklisting blocks
/// future balance-affecting operations, it never seizes funds.
pub fn blacklist(storage: &mut Storage, env: &Env, account: &Address) -> Result<(), TokenError> {
    ensure_blacklister(storage, &env.caller)?;
    set_blacklist_flag(storage, account, true)?;
    debug!("blacklisted {}", account);
    Ok(())
}

pub fn unblacklist(storage: &mut Storage, env: &Env, account: &Address) -> Result<(), TokenError> {
    ensure_blacklister(storage, &env.caller)?;
    set_blacklist_flag(storage, account, false)?;
    debug!("unblacklisted {}", account);
    Ok(())
}

pub(crate) fn set_blacklist_flag(
    storage: &mut Storage,
    account: &Address,
    flag: bool,
) -> Result<(), TokenError> {
    let mut word = read_account(storage, account);
    word.blacklisted = flag;
    write_account(storage, account, &word)
}
