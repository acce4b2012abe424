use primitive_types::U256;

// Token metadata written at first initialization
pub const TOKEN_NAME: &str = "USD Reserve";
pub const TOKEN_SYMBOL: &str = "USDR";
pub const TOKEN_CURRENCY: &str = "USD";
pub const TOKEN_DECIMALS: u8 = 6;

// EIP-712 domain version string. Bumping it invalidates every
// outstanding off-chain authorization, so it only moves on a
// signature-schema change, never on a logic upgrade.
pub const EIP712_VERSION: &str = "2";

// ERC-1271: bytes4(keccak256("isValidSignature(bytes32,bytes)"))
pub const ERC1271_MAGIC_VALUE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

// A spender allowance of 2^256 - 1 is treated as infinite and is never
// decremented by transfer_from
pub const INFINITE_ALLOWANCE: U256 = U256::MAX;
