mod common;

use primitive_types::U256;

use common::*;
use usdr_common::crypto::Address;
use usdr_token::{config::INFINITE_ALLOWANCE, error::TokenError, logic::Call};

#[test]
fn test_mint_transfer_and_delegated_spend() {
    let mut proxy = deploy();
    let alice = Address::new([0x11; 20]);
    let bob = Address::new([0x12; 20]);
    let carol = Address::new([0x13; 20]);

    mint(&mut proxy, alice, 1_000);
    assert_eq!(proxy.total_supply(), U256::from(1_000));
    assert_eq!(proxy.balance_of(&alice), U256::from(1_000));

    proxy
        .call(
            &env(alice),
            Call::Transfer {
                to: bob,
                value: U256::from(400),
            },
        )
        .unwrap();
    assert_eq!(proxy.balance_of(&alice), U256::from(600));
    assert_eq!(proxy.balance_of(&bob), U256::from(400));

    // Bob lets carol spend 100, carol moves 60 of it to herself
    proxy
        .call(
            &env(bob),
            Call::Approve {
                spender: carol,
                value: U256::from(100),
            },
        )
        .unwrap();
    proxy
        .call(
            &env(carol),
            Call::TransferFrom {
                from: bob,
                to: carol,
                value: U256::from(60),
            },
        )
        .unwrap();
    assert_eq!(proxy.balance_of(&bob), U256::from(340));
    assert_eq!(proxy.balance_of(&carol), U256::from(60));
    assert_eq!(proxy.allowance(&bob, &carol), U256::from(40));

    // Spending past the remaining allowance fails even with balance left
    assert_eq!(
        proxy.call(
            &env(carol),
            Call::TransferFrom {
                from: bob,
                to: carol,
                value: U256::from(41),
            },
        ),
        Err(TokenError::InsufficientAllowance)
    );

    // Supply is conserved across every move
    assert_eq!(proxy.total_supply(), U256::from(1_000));
}

#[test]
fn test_infinite_allowance_is_never_decremented() {
    let mut proxy = deploy();
    let alice = Address::new([0x11; 20]);
    let bob = Address::new([0x12; 20]);
    mint(&mut proxy, alice, 500);

    proxy
        .call(
            &env(alice),
            Call::Approve {
                spender: bob,
                value: INFINITE_ALLOWANCE,
            },
        )
        .unwrap();
    proxy
        .call(
            &env(bob),
            Call::TransferFrom {
                from: alice,
                to: bob,
                value: U256::from(123),
            },
        )
        .unwrap();
    assert_eq!(proxy.allowance(&alice, &bob), INFINITE_ALLOWANCE);
}

#[test]
fn test_burn_reduces_supply_without_restoring_mint_allowance() {
    let mut proxy = deploy();
    mint(&mut proxy, MINTER, 800);
    let allowance_after_mint = proxy.minter_allowance(&MINTER);

    proxy
        .call(
            &env(MINTER),
            Call::Burn {
                value: U256::from(300),
            },
        )
        .unwrap();
    assert_eq!(proxy.total_supply(), U256::from(500));
    assert_eq!(proxy.balance_of(&MINTER), U256::from(500));
    assert_eq!(proxy.minter_allowance(&MINTER), allowance_after_mint);
}

#[test]
fn test_mint_is_bounded_by_minter_allowance() {
    let mut proxy = deploy();
    let small_minter = Address::new([0x21; 20]);
    proxy
        .call(
            &env(MASTER_MINTER),
            Call::ConfigureMinter {
                minter: small_minter,
                allowance: U256::from(100),
            },
        )
        .unwrap();

    assert_eq!(
        proxy.call(
            &env(small_minter),
            Call::Mint {
                to: small_minter,
                value: U256::from(101),
            },
        ),
        Err(TokenError::InsufficientMintAllowance)
    );

    mint_as(&mut proxy, small_minter, small_minter, 100);
    assert_eq!(proxy.minter_allowance(&small_minter), U256::zero());

    // Removal zeroes both the flag and the remaining allowance
    proxy
        .call(
            &env(MASTER_MINTER),
            Call::RemoveMinter {
                minter: small_minter,
            },
        )
        .unwrap();
    assert!(!proxy.is_minter(&small_minter));
    assert_eq!(
        proxy.call(
            &env(small_minter),
            Call::Mint {
                to: small_minter,
                value: U256::from(1),
            },
        ),
        Err(TokenError::NotMinter(small_minter))
    );
}

fn mint_as(proxy: &mut usdr_token::proxy::Proxy, minter: Address, to: Address, value: u64) {
    proxy
        .call(
            &env(minter),
            Call::Mint {
                to,
                value: U256::from(value),
            },
        )
        .unwrap();
}

#[test]
fn test_pause_freezes_movement_but_not_administration() {
    let mut proxy = deploy();
    let alice = Address::new([0x11; 20]);
    mint(&mut proxy, alice, 100);

    proxy.call(&env(PAUSER), Call::Pause).unwrap();
    assert!(proxy.paused());

    for (caller, call) in [
        (
            alice,
            Call::Transfer {
                to: Address::new([0x12; 20]),
                value: U256::from(1),
            },
        ),
        (
            MINTER,
            Call::Mint {
                to: alice,
                value: U256::from(1),
            },
        ),
        (MINTER, Call::Burn { value: U256::from(1) }),
        (
            alice,
            Call::Approve {
                spender: Address::new([0x12; 20]),
                value: U256::from(1),
            },
        ),
    ] {
        assert_eq!(proxy.call(&env(caller), call), Err(TokenError::Paused));
    }

    // Administration keeps working while paused
    let new_minter = Address::new([0x31; 20]);
    proxy
        .call(
            &env(MASTER_MINTER),
            Call::ConfigureMinter {
                minter: new_minter,
                allowance: U256::from(50),
            },
        )
        .unwrap();
    proxy
        .call(&env(BLACKLISTER), Call::Blacklist { account: alice })
        .unwrap();
    proxy
        .call(&env(BLACKLISTER), Call::UnBlacklist { account: alice })
        .unwrap();

    proxy.call(&env(PAUSER), Call::Unpause).unwrap();
    proxy
        .call(
            &env(alice),
            Call::Transfer {
                to: Address::new([0x12; 20]),
                value: U256::from(1),
            },
        )
        .unwrap();
}

#[test]
fn test_pause_role_is_exclusive() {
    let mut proxy = deploy();
    assert_eq!(
        proxy.call(&env(OWNER), Call::Pause),
        Err(TokenError::NotPauser)
    );
    assert_eq!(
        proxy.call(&env(Address::new([0x99; 20])), Call::Unpause),
        Err(TokenError::NotPauser)
    );
}

#[test]
fn test_blacklist_freezes_account_without_seizing_funds() {
    let mut proxy = deploy();
    let alice = Address::new([0x11; 20]);
    let bob = Address::new([0x12; 20]);
    mint(&mut proxy, alice, 100);
    mint(&mut proxy, bob, 100);

    proxy
        .call(&env(BLACKLISTER), Call::Blacklist { account: alice })
        .unwrap();
    assert!(proxy.is_blacklisted(&alice));
    // The balance is frozen, not seized
    assert_eq!(proxy.balance_of(&alice), U256::from(100));

    assert_eq!(
        proxy.call(
            &env(alice),
            Call::Transfer {
                to: bob,
                value: U256::from(1),
            },
        ),
        Err(TokenError::Blacklisted(alice))
    );
    assert_eq!(
        proxy.call(
            &env(bob),
            Call::Transfer {
                to: alice,
                value: U256::from(1),
            },
        ),
        Err(TokenError::Blacklisted(alice))
    );
    assert_eq!(
        proxy.call(
            &env(alice),
            Call::Approve {
                spender: bob,
                value: U256::from(1),
            },
        ),
        Err(TokenError::Blacklisted(alice))
    );

    proxy
        .call(&env(BLACKLISTER), Call::UnBlacklist { account: alice })
        .unwrap();
    proxy
        .call(
            &env(alice),
            Call::Transfer {
                to: bob,
                value: U256::from(100),
            },
        )
        .unwrap();
    assert_eq!(proxy.balance_of(&bob), U256::from(200));
}

#[test]
fn test_blacklister_role_is_exclusive() {
    let mut proxy = deploy();
    let alice = Address::new([0x11; 20]);
    assert_eq!(
        proxy.call(&env(OWNER), Call::Blacklist { account: alice }),
        Err(TokenError::NotBlacklister)
    );
}

#[test]
fn test_zero_address_and_zero_amount_guards() {
    let mut proxy = deploy();
    let alice = Address::new([0x11; 20]);
    mint(&mut proxy, alice, 100);

    assert_eq!(
        proxy.call(
            &env(alice),
            Call::Transfer {
                to: Address::zero(),
                value: U256::from(1),
            },
        ),
        Err(TokenError::ZeroAddress)
    );
    assert_eq!(
        proxy.call(
            &env(MINTER),
            Call::Mint {
                to: Address::zero(),
                value: U256::from(1),
            },
        ),
        Err(TokenError::ZeroAddress)
    );
    assert_eq!(
        proxy.call(
            &env(MINTER),
            Call::Mint {
                to: alice,
                value: U256::zero(),
            },
        ),
        Err(TokenError::ZeroAmount)
    );
    assert_eq!(
        proxy.call(&env(MINTER), Call::Burn { value: U256::zero() }),
        Err(TokenError::ZeroAmount)
    );
}

#[test]
fn test_self_transfer_is_a_no_op_on_balance() {
    let mut proxy = deploy();
    let alice = Address::new([0x11; 20]);
    mint(&mut proxy, alice, 100);

    proxy
        .call(
            &env(alice),
            Call::Transfer {
                to: alice,
                value: U256::from(60),
            },
        )
        .unwrap();
    assert_eq!(proxy.balance_of(&alice), U256::from(100));
    assert_eq!(proxy.total_supply(), U256::from(100));
}

#[test]
fn test_decrease_allowance_cannot_underflow() {
    let mut proxy = deploy();
    let alice = Address::new([0x11; 20]);
    let bob = Address::new([0x12; 20]);

    proxy
        .call(
            &env(alice),
            Call::Approve {
                spender: bob,
                value: U256::from(10),
            },
        )
        .unwrap();
    assert_eq!(
        proxy.call(
            &env(alice),
            Call::DecreaseAllowance {
                spender: bob,
                decrement: U256::from(11),
            },
        ),
        Err(TokenError::AllowanceUnderflow)
    );

    proxy
        .call(
            &env(alice),
            Call::IncreaseAllowance {
                spender: bob,
                increment: U256::from(5),
            },
        )
        .unwrap();
    assert_eq!(proxy.allowance(&alice, &bob), U256::from(15));
}

#[test]
fn test_token_identity() {
    let proxy = deploy();
    assert_eq!(proxy.name(), "USD Reserve");
    assert_eq!(proxy.symbol(), "USDR");
    assert_eq!(proxy.currency(), "USD");
    assert_eq!(proxy.decimals(), 6);
    assert_eq!(proxy.version(), 2);
}
