//! The swappable token logic dispatched behind the proxy.
//!
//! Every mutating operation is a `Call` variant executed against the
//! proxy's storage; version-specific setup runs through `InitCall`. The
//! proxy holds the current `TokenLogic` by reference and swapping that
//! reference is the whole upgrade.

use log::debug;
use primitive_types::U256;

use usdr_common::crypto::{Address, Hash};

use crate::{
    authorization::{self, AllowanceAuthorization, SignerSignature, TransferAuthorization},
    config::{TOKEN_CURRENCY, TOKEN_DECIMALS, TOKEN_NAME, TOKEN_SYMBOL},
    env::Env,
    error::TokenError,
    ledger, roles,
    storage::{layout, Storage},
};

/// A state-changing instruction.
#[derive(Clone, Debug)]
pub enum Call {
    Transfer {
        to: Address,
        value: U256,
    },
    TransferFrom {
        from: Address,
        to: Address,
        value: U256,
    },
    Approve {
        spender: Address,
        value: U256,
    },
    IncreaseAllowance {
        spender: Address,
        increment: U256,
    },
    DecreaseAllowance {
        spender: Address,
        decrement: U256,
    },
    Mint {
        to: Address,
        value: U256,
    },
    Burn {
        value: U256,
    },
    ConfigureMinter {
        minter: Address,
        allowance: U256,
    },
    RemoveMinter {
        minter: Address,
    },
    Blacklist {
        account: Address,
    },
    UnBlacklist {
        account: Address,
    },
    Pause,
    Unpause,
    TransferWithAuthorization {
        auth: TransferAuthorization,
        signature: SignerSignature,
    },
    ReceiveWithAuthorization {
        auth: TransferAuthorization,
        signature: SignerSignature,
    },
    CancelAuthorization {
        authorizer: Address,
        nonce: Hash,
        signature: SignerSignature,
    },
    IncreaseAllowanceWithAuthorization {
        auth: AllowanceAuthorization,
        signature: SignerSignature,
    },
    DecreaseAllowanceWithAuthorization {
        auth: AllowanceAuthorization,
        signature: SignerSignature,
    },
    Permit {
        owner: Address,
        spender: Address,
        value: U256,
        deadline: u64,
        signature: SignerSignature,
    },
}

/// Version-specific initialization, delegated through
/// `upgrade_to_and_call` and idempotent-once per proxy.
#[derive(Clone, Debug)]
pub enum InitCall {
    V1 {
        owner: Address,
        pauser: Address,
        blacklister: Address,
        master_minter: Address,
    },
    V2 {
        accounts_to_blacklist: Vec<Address>,
    },
}

/// Interface every logic version satisfies. The implementation runs with
/// the proxy's storage as its execution context and owns no state of its
/// own.
pub trait TokenLogic: Send + Sync {
    fn execute(&self, storage: &mut Storage, env: &Env, call: Call) -> Result<(), TokenError>;

    fn initialize(&self, storage: &mut Storage, env: &Env, call: InitCall)
        -> Result<(), TokenError>;
}

/// The current logic version: packed balances, blacklist guard on every
/// balance-affecting operation, and the full authorization engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct StableTokenLogic;

impl TokenLogic for StableTokenLogic {
    fn execute(&self, storage: &mut Storage, env: &Env, call: Call) -> Result<(), TokenError> {
        match call {
            Call::Transfer { to, value } => ledger::transfer(storage, env, &to, value),
            Call::TransferFrom { from, to, value } => {
                ledger::transfer_from(storage, env, &from, &to, value)
            }
            Call::Approve { spender, value } => ledger::approve(storage, env, &spender, value),
            Call::IncreaseAllowance { spender, increment } => {
                ledger::increase_allowance(storage, env, &spender, increment)
            }
            Call::DecreaseAllowance { spender, decrement } => {
                ledger::decrease_allowance(storage, env, &spender, decrement)
            }
            Call::Mint { to, value } => ledger::mint(storage, env, &to, value),
            Call::Burn { value } => ledger::burn(storage, env, value),
            Call::ConfigureMinter { minter, allowance } => {
                ledger::configure_minter(storage, env, &minter, allowance)
            }
            Call::RemoveMinter { minter } => ledger::remove_minter(storage, env, &minter),
            Call::Blacklist { account } => ledger::blacklist(storage, env, &account),
            Call::UnBlacklist { account } => ledger::unblacklist(storage, env, &account),
            Call::Pause => roles::pause(storage, env),
            Call::Unpause => roles::unpause(storage, env),
            Call::TransferWithAuthorization { auth, signature } => {
                authorization::transfer_with_authorization(storage, env, &auth, &signature)
            }
            Call::ReceiveWithAuthorization { auth, signature } => {
                authorization::receive_with_authorization(storage, env, &auth, &signature)
            }
            Call::CancelAuthorization {
                authorizer,
                nonce,
                signature,
            } => authorization::cancel_authorization(storage, env, &authorizer, &nonce, &signature),
            Call::IncreaseAllowanceWithAuthorization { auth, signature } => {
                authorization::increase_allowance_with_authorization(storage, env, &auth, &signature)
            }
            Call::DecreaseAllowanceWithAuthorization { auth, signature } => {
                authorization::decrease_allowance_with_authorization(storage, env, &auth, &signature)
            }
            Call::Permit {
                owner,
                spender,
                value,
                deadline,
                signature,
            } => authorization::permit(storage, env, &owner, &spender, value, deadline, &signature),
        }
    }

    fn initialize(
        &self,
        storage: &mut Storage,
        env: &Env,
        call: InitCall,
    ) -> Result<(), TokenError> {
        match call {
            InitCall::V1 {
                owner,
                pauser,
                blacklister,
                master_minter,
            } => initialize_v1(storage, owner, pauser, blacklister, master_minter),
            InitCall::V2 {
                accounts_to_blacklist,
            } => initialize_v2(storage, env, &accounts_to_blacklist),
        }
    }
}

fn initialize_v1(
    storage: &mut Storage,
    owner: Address,
    pauser: Address,
    blacklister: Address,
    master_minter: Address,
) -> Result<(), TokenError> {
    if storage.u64_at(&layout::initialized_version()) != 0 {
        return Err(TokenError::AlreadyInitialized);
    }
    if owner.is_zero() || pauser.is_zero() || blacklister.is_zero() || master_minter.is_zero() {
        return Err(TokenError::ZeroAddress);
    }

    storage.set_address(layout::owner(), owner);
    storage.set_address(layout::pauser(), pauser);
    storage.set_address(layout::blacklister(), blacklister);
    storage.set_address(layout::master_minter(), master_minter);
    storage.set_short_string(layout::name(), TOKEN_NAME)?;
    storage.set_short_string(layout::symbol(), TOKEN_SYMBOL)?;
    storage.set_short_string(layout::currency(), TOKEN_CURRENCY)?;
    storage.set_u64(layout::decimals(), TOKEN_DECIMALS as u64);
    storage.set_u64(layout::initialized_version(), 1);

    debug!("initialized v1, owner {}", owner);
    Ok(())
}

/// Migrate to the packed blacklist representation and wire up the
/// authorization engine's domain cache.
///
/// Each listed account must already carry the legacy flag; listing a
/// clean account aborts the whole upgrade. The legacy mapping itself is
/// left in place: its slot is deprecated and never reused. The proxy's
/// own address is blacklisted so tokens can never be locked inside it.
fn initialize_v2(
    storage: &mut Storage,
    env: &Env,
    accounts_to_blacklist: &[Address],
) -> Result<(), TokenError> {
    match storage.u64_at(&layout::initialized_version()) {
        0 => return Err(TokenError::NotInitialized),
        1 => {}
        _ => return Err(TokenError::AlreadyInitialized),
    }

    for account in accounts_to_blacklist {
        if !ledger::legacy_blacklisted(storage, account) {
            return Err(TokenError::BlacklistMigrationMismatch(*account));
        }
        ledger::set_blacklist_flag(storage, account, true)?;
    }
    ledger::set_blacklist_flag(storage, &env.contract, true)?;

    storage.set_u64(layout::cached_chain_id(), env.chain_id);
    let separator = authorization::compute_domain_separator(storage, env.chain_id, &env.contract);
    storage.set_hash(layout::cached_domain_separator(), separator);
    storage.set_u64(layout::initialized_version(), 2);

    debug!(
        "initialized v2, migrated {} blacklisted accounts",
        accounts_to_blacklist.len()
    );
    Ok(())
}
