pub mod abi;
pub mod crypto;

pub use primitive_types::U256;
