//! Upgradeable indirection in front of the token logic.
//!
//! The proxy owns the only copy of storage and a pointer to the current
//! `TokenLogic`. Upgrading swaps the pointer; the storage layout is
//! append-only so every logic version reads its predecessors' slots
//! unchanged. The admin account administers the proxy and nothing else:
//! it can never reach the logic surface, so no call can be ambiguous
//! between the two roles.

use log::{debug, info};
use primitive_types::U256;
use std::sync::Arc;

use usdr_common::{abi::Word, crypto::{Address, Hash}};

use crate::{
    authorization::{self, AuthorizationState},
    env::Env,
    error::TokenError,
    ledger,
    logic::{Call, InitCall, TokenLogic},
    roles,
    storage::{layout, Storage, StorageKey},
};

/// A logic version: the code plus the address it is published under.
#[derive(Clone)]
pub struct Implementation {
    pub address: Address,
    pub logic: Arc<dyn TokenLogic>,
}

impl Implementation {
    pub fn new(address: Address, logic: Arc<dyn TokenLogic>) -> Self {
        Self { address, logic }
    }
}

impl std::fmt::Debug for Implementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Implementation")
            .field("address", &self.address)
            .finish()
    }
}

/// The deployed token: one storage, one admin, one current logic.
pub struct Proxy {
    admin: Address,
    implementation: Implementation,
    storage: Storage,
}

impl Proxy {
    pub fn new(
        admin: Address,
        implementation: Implementation,
        storage: Storage,
    ) -> Result<Self, TokenError> {
        if admin.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        if implementation.address.is_zero() {
            return Err(TokenError::ZeroImplementation);
        }
        Ok(Self {
            admin,
            implementation,
            storage,
        })
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    pub fn implementation_address(&self) -> &Address {
        &self.implementation.address
    }

    /// Raw storage word, for inspection and host-level snapshots.
    pub fn storage_word(&self, key: &StorageKey) -> Word {
        self.storage.word(key)
    }

    fn ensure_admin(&self, env: &Env) -> Result<(), TokenError> {
        if env.caller != self.admin {
            return Err(TokenError::NotProxyAdmin);
        }
        Ok(())
    }

    /// Dispatch one logic call with all-or-nothing semantics: the live
    /// storage is replaced only when the call succeeds.
    pub fn call(&mut self, env: &Env, call: Call) -> Result<(), TokenError> {
        if env.caller == self.admin {
            return Err(TokenError::AdminCannotCallLogic);
        }
        let mut staged = self.storage.clone();
        self.implementation.logic.execute(&mut staged, env, call)?;
        self.storage = staged;
        Ok(())
    }

    pub fn change_admin(&mut self, env: &Env, new_admin: Address) -> Result<(), TokenError> {
        self.ensure_admin(env)?;
        if new_admin.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        info!("proxy admin changed from {} to {}", self.admin, new_admin);
        self.admin = new_admin;
        Ok(())
    }

    /// Swap the logic pointer without running an initializer.
    pub fn upgrade_to(
        &mut self,
        env: &Env,
        implementation: Implementation,
    ) -> Result<(), TokenError> {
        self.ensure_admin(env)?;
        if implementation.address.is_zero() {
            return Err(TokenError::ZeroImplementation);
        }
        info!(
            "proxy upgraded from {} to {}",
            self.implementation.address, implementation.address
        );
        self.implementation = implementation;
        Ok(())
    }

    /// Swap the logic pointer and run the new version's initializer as one
    /// atomic step: if the initializer fails, both the pointer and the
    /// storage keep their previous state.
    pub fn upgrade_to_and_call(
        &mut self,
        env: &Env,
        implementation: Implementation,
        init: InitCall,
    ) -> Result<(), TokenError> {
        self.ensure_admin(env)?;
        if implementation.address.is_zero() {
            return Err(TokenError::ZeroImplementation);
        }

        let mut staged = self.storage.clone();
        implementation.logic.initialize(&mut staged, env, init)?;

        debug!(
            "proxy upgraded from {} to {} with initializer",
            self.implementation.address, implementation.address
        );
        self.implementation = implementation;
        self.storage = staged;
        Ok(())
    }

    // Read surface. Queries bypass the admin exclusion: reads have no
    // side effects, so there is nothing for the exclusion to protect.

    pub fn name(&self) -> String {
        self.storage.short_string_at(&layout::name())
    }

    pub fn symbol(&self) -> String {
        self.storage.short_string_at(&layout::symbol())
    }

    pub fn currency(&self) -> String {
        self.storage.short_string_at(&layout::currency())
    }

    pub fn decimals(&self) -> u8 {
        self.storage.u64_at(&layout::decimals()) as u8
    }

    pub fn version(&self) -> u64 {
        self.storage.u64_at(&layout::initialized_version())
    }

    pub fn paused(&self) -> bool {
        roles::is_paused(&self.storage)
    }

    pub fn owner(&self) -> Address {
        roles::owner(&self.storage)
    }

    pub fn total_supply(&self) -> U256 {
        ledger::total_supply(&self.storage)
    }

    pub fn balance_of(&self, account: &Address) -> U256 {
        ledger::balance_of(&self.storage, account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        ledger::allowance(&self.storage, owner, spender)
    }

    pub fn is_blacklisted(&self, account: &Address) -> bool {
        ledger::is_blacklisted(&self.storage, account)
    }

    pub fn is_minter(&self, account: &Address) -> bool {
        ledger::is_minter(&self.storage, account)
    }

    pub fn minter_allowance(&self, minter: &Address) -> U256 {
        ledger::minter_allowance(&self.storage, minter)
    }

    pub fn authorization_state(&self, authorizer: &Address, nonce: &Hash) -> AuthorizationState {
        authorization::authorization_state(&self.storage, authorizer, nonce)
    }

    pub fn permit_nonce(&self, owner: &Address) -> U256 {
        authorization::permit_nonce(&self.storage, owner)
    }

    pub fn domain_separator(&self, env: &Env) -> Hash {
        authorization::active_domain_separator(&self.storage, env)
    }
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("admin", &self.admin)
            .field("implementation", &self.implementation.address)
            .field("storage_words", &self.storage.len())
            .finish()
    }
}
