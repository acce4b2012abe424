pub mod authorization;
pub mod config;
pub mod env;
pub mod error;
pub mod ledger;
pub mod logic;
pub mod proxy;
pub mod roles;
pub mod storage;
