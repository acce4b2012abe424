mod address;
mod ecdsa;
mod eip712;
mod hash;

pub use address::{Address, AddressError, ADDRESS_SIZE};
pub use ecdsa::{recover, sign_digest, signer_address, EcdsaError, Signature, SIGNATURE_SIZE};
pub use eip712::{domain_separator, struct_hash, typed_data_digest, Domain, DOMAIN_TYPEHASH};
pub use hash::{keccak256, keccak256_concat, Hash, HASH_SIZE};
