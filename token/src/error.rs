use thiserror::Error;

use usdr_common::crypto::Address;

/// Every failure in the ledger, authorization engine or proxy.
///
/// All failures are revert-style and all-or-nothing: the proxy discards
/// every staged storage write when an operation returns an error. Messages
/// are stable; downstream tooling and the test suites match on them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    // Guard violations
    #[error("contract is paused")]
    Paused,
    #[error("account {0} is blacklisted")]
    Blacklisted(Address),
    #[error("caller {0} is not a minter")]
    NotMinter(Address),
    #[error("caller is not the master minter")]
    NotMasterMinter,
    #[error("caller is not the pauser")]
    NotPauser,
    #[error("caller is not the blacklister")]
    NotBlacklister,
    #[error("zero address is not allowed")]
    ZeroAddress,
    #[error("amount must be greater than zero")]
    ZeroAmount,

    // Authorization violations
    #[error("invalid signature")]
    InvalidSignature,
    #[error("authorization is not yet valid")]
    AuthorizationNotYetValid,
    #[error("authorization is expired")]
    AuthorizationExpired,
    #[error("authorization is used or canceled")]
    AuthorizationUsedOrCanceled,
    #[error("permit is expired")]
    PermitExpired,
    #[error("caller must be the payee")]
    CallerMustBePayee,

    // Arithmetic violations
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error("arithmetic underflow")]
    ArithmeticUnderflow,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("insufficient allowance")]
    InsufficientAllowance,
    #[error("insufficient mint allowance")]
    InsufficientMintAllowance,
    #[error("allowance decrement exceeds allowance")]
    AllowanceUnderflow,

    // Invariant and lifecycle violations
    #[error("balance exceeds the maximum packed value")]
    BalanceOverflow,
    #[error("contract is already initialized")]
    AlreadyInitialized,
    #[error("contract is not initialized")]
    NotInitialized,
    #[error("account {0} was not blacklisted before migration")]
    BlacklistMigrationMismatch(Address),
    #[error("string does not fit in a storage word")]
    StringTooLong,

    // Proxy violations
    #[error("caller is not the proxy admin")]
    NotProxyAdmin,
    #[error("proxy admin cannot call token logic")]
    AdminCannotCallLogic,
    #[error("implementation address is zero")]
    ZeroImplementation,
}
