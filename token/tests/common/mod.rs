#![allow(dead_code)]

use std::sync::Arc;

use k256::ecdsa::SigningKey;
use primitive_types::U256;
use rand::rngs::OsRng;

use usdr_common::crypto::{sign_digest, signer_address, Address, Hash};
use usdr_token::{
    authorization::SignerSignature,
    env::Env,
    logic::{Call, InitCall, StableTokenLogic},
    proxy::{Implementation, Proxy},
    storage::Storage,
};

pub const CHAIN_ID: u64 = 1;

pub const ADMIN: Address = Address::new([0xaa; 20]);
pub const OWNER: Address = Address::new([0x01; 20]);
pub const PAUSER: Address = Address::new([0x02; 20]);
pub const BLACKLISTER: Address = Address::new([0x03; 20]);
pub const MASTER_MINTER: Address = Address::new([0x04; 20]);
pub const MINTER: Address = Address::new([0x05; 20]);
pub const CONTRACT: Address = Address::new([0xcc; 20]);

pub fn implementation() -> Implementation {
    Implementation::new(Address::new([0xee; 20]), Arc::new(StableTokenLogic))
}

pub fn env(caller: Address) -> Env {
    Env::new(caller, CONTRACT, CHAIN_ID, 1_000)
}

/// Fresh proxy initialized through both versions, with one configured
/// minter.
pub fn deploy() -> Proxy {
    let mut proxy = Proxy::new(ADMIN, implementation(), Storage::new()).unwrap();
    let admin_env = env(ADMIN);

    proxy
        .upgrade_to_and_call(
            &admin_env,
            implementation(),
            InitCall::V1 {
                owner: OWNER,
                pauser: PAUSER,
                blacklister: BLACKLISTER,
                master_minter: MASTER_MINTER,
            },
        )
        .unwrap();
    proxy
        .upgrade_to_and_call(
            &admin_env,
            implementation(),
            InitCall::V2 {
                accounts_to_blacklist: vec![],
            },
        )
        .unwrap();

    proxy
        .call(
            &env(MASTER_MINTER),
            Call::ConfigureMinter {
                minter: MINTER,
                allowance: U256::from(1_000_000_000u64),
            },
        )
        .unwrap();
    proxy
}

pub fn mint(proxy: &mut Proxy, to: Address, value: u64) {
    proxy
        .call(
            &env(MINTER),
            Call::Mint {
                to,
                value: U256::from(value),
            },
        )
        .unwrap();
}

pub struct Signer {
    pub key: SigningKey,
    pub address: Address,
}

impl Signer {
    pub fn random() -> Self {
        let key = SigningKey::random(&mut OsRng);
        let address = signer_address(&key);
        Self { key, address }
    }

    pub fn sign(&self, digest: &Hash) -> SignerSignature {
        SignerSignature::Key(sign_digest(&self.key, digest).unwrap())
    }
}
