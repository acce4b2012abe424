//! Role slots and the cross-cutting guards they back.
//!
//! Role address rotation is an external concern; these accessors are what
//! the initializers write and what every guard reads.

use log::debug;

use usdr_common::crypto::Address;

use crate::{
    env::Env,
    error::TokenError,
    storage::{layout, Storage},
};

pub fn owner(storage: &Storage) -> Address {
    storage.address_at(&layout::owner())
}

pub fn pauser(storage: &Storage) -> Address {
    storage.address_at(&layout::pauser())
}

pub fn blacklister(storage: &Storage) -> Address {
    storage.address_at(&layout::blacklister())
}

pub fn master_minter(storage: &Storage) -> Address {
    storage.address_at(&layout::master_minter())
}

pub fn is_paused(storage: &Storage) -> bool {
    storage.bool_at(&layout::paused())
}

/// Fails with `Paused` while the pause flag is set.
pub fn ensure_not_paused(storage: &Storage) -> Result<(), TokenError> {
    if is_paused(storage) {
        return Err(TokenError::Paused);
    }
    Ok(())
}

pub fn ensure_pauser(storage: &Storage, caller: &Address) -> Result<(), TokenError> {
    if *caller != pauser(storage) {
        return Err(TokenError::NotPauser);
    }
    Ok(())
}

pub fn ensure_blacklister(storage: &Storage, caller: &Address) -> Result<(), TokenError> {
    if *caller != blacklister(storage) {
        return Err(TokenError::NotBlacklister);
    }
    Ok(())
}

pub fn ensure_master_minter(storage: &Storage, caller: &Address) -> Result<(), TokenError> {
    if *caller != master_minter(storage) {
        return Err(TokenError::NotMasterMinter);
    }
    Ok(())
}

/// Halt every balance-affecting operation. Pauser only; idempotent.
pub fn pause(storage: &mut Storage, env: &Env) -> Result<(), TokenError> {
    ensure_pauser(storage, &env.caller)?;
    storage.set_bool(layout::paused(), true);
    debug!("contract paused by {}", env.caller);
    Ok(())
}

/// Resume operations. Pauser only; idempotent.
pub fn unpause(storage: &mut Storage, env: &Env) -> Result<(), TokenError> {
    ensure_pauser(storage, &env.caller)?;
    storage.set_bool(layout::paused(), false);
    debug!("contract unpaused by {}", env.caller);
    Ok(())
}
