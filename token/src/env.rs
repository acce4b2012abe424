//! The per-call execution context.
//!
//! Every mutating operation receives an explicit `Env` instead of reading
//! ambient globals, which keeps the guard-evaluation order auditable and
//! testable in isolation. The host environment is trusted to populate the
//! caller, timestamp and chain identifier, and to invoke operations
//! atomically with revert-on-error semantics.

use indexmap::IndexMap;
use std::{fmt, sync::Arc};

use usdr_common::crypto::{Address, Hash};

/// Read-only signature oracle for smart-contract-wallet accounts.
///
/// The callback takes `&self` so a wallet queried during verification has
/// no channel to mutate ledger or engine state; a result is accepted only
/// when it equals the ERC-1271 magic value exactly.
pub trait SignatureValidator: Send + Sync {
    fn is_valid_signature(&self, digest: &Hash, signature: &[u8]) -> [u8; 4];
}

/// Registry of contract-wallet accounts known to the host environment.
#[derive(Clone, Default)]
pub struct WalletRegistry {
    wallets: IndexMap<Address, Arc<dyn SignatureValidator>>,
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, address: Address, wallet: Arc<dyn SignatureValidator>) {
        self.wallets.insert(address, wallet);
    }

    pub fn get(&self, address: &Address) -> Option<&Arc<dyn SignatureValidator>> {
        self.wallets.get(address)
    }
}

impl fmt::Debug for WalletRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.wallets.keys()).finish()
    }
}

/// Execution context threaded into every ledger and engine call.
#[derive(Clone, Debug)]
pub struct Env {
    /// The submitting account.
    pub caller: Address,
    /// The proxy's own address; also the EIP-712 verifying contract.
    pub contract: Address,
    /// Numeric identifier of the executing chain.
    pub chain_id: u64,
    /// Current timestamp of the executing environment, in seconds.
    pub timestamp: u64,
    /// Contract wallets available for ERC-1271 verification.
    pub wallets: WalletRegistry,
}

impl Env {
    pub fn new(caller: Address, contract: Address, chain_id: u64, timestamp: u64) -> Self {
        Self {
            caller,
            contract,
            chain_id,
            timestamp,
            wallets: WalletRegistry::new(),
        }
    }

    pub fn with_wallets(mut self, wallets: WalletRegistry) -> Self {
        self.wallets = wallets;
        self
    }

    /// Same context observed from another caller.
    pub fn as_caller(&self, caller: Address) -> Self {
        let mut env = self.clone();
        env.caller = caller;
        env
    }

    /// Same context at another timestamp.
    pub fn at_time(&self, timestamp: u64) -> Self {
        let mut env = self.clone();
        env.timestamp = timestamp;
        env
    }
}
