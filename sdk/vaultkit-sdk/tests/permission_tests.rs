use solana_sdk::pubkey::Pubkey;
use vaultkit_sdk::{AccountResolver, PermissionPlanner, SmartAccount, VaultKitConfig};

mod common;
use common::{genesis, test_config, MockChainClient, NOW, SALT};

fn setup() -> (std::sync::Arc<MockChainClient>, VaultKitConfig, SmartAccount, PermissionPlanner) {
    let client = MockChainClient::shared();
    let config = test_config();
    let account = AccountResolver::new(client.clone(), config.wallet_program_id).derive(
        &Pubkey::new_unique(),
        genesis(),
        SALT,
    );
    let planner = PermissionPlanner::new(client.clone(), config.permit_program_id);
    (client, config, account, planner)
}

#[tokio::test]
async fn no_allowance_is_not_granted() -> anyhow::Result<()> {
    let (_client, config, account, planner) = setup();

    let state = planner
        .check_permission(&account.owner, &config.asset_mint, &account.address, 1)
        .await?;
    assert!(!state.granted);
    assert_eq!(state.amount, 0);
    assert_eq!(state.expiry, 0);
    Ok(())
}

#[tokio::test]
async fn sufficient_live_allowance_is_granted() -> anyhow::Result<()> {
    let (client, config, account, planner) = setup();
    client.grant_allowance(&config, &account, 100, NOW + 60);

    let state = planner
        .check_permission(&account.owner, &config.asset_mint, &account.address, 100)
        .await?;
    assert!(state.granted);
    assert_eq!(state.amount, 100);
    assert_eq!(state.expiry, NOW + 60);
    Ok(())
}

#[tokio::test]
async fn insufficient_allowance_is_not_granted() -> anyhow::Result<()> {
    let (client, config, account, planner) = setup();
    client.grant_allowance(&config, &account, 99, NOW + 60);

    let state = planner
        .check_permission(&account.owner, &config.asset_mint, &account.address, 100)
        .await?;
    assert!(!state.granted);
    assert_eq!(state.amount, 99);
    Ok(())
}

#[tokio::test]
async fn expired_allowance_is_not_granted() -> anyhow::Result<()> {
    let (client, config, account, planner) = setup();
    client.grant_allowance(&config, &account, 1_000, NOW);

    let state = planner
        .check_permission(&account.owner, &config.asset_mint, &account.address, 10)
        .await?;
    assert!(!state.granted);

    // Still live one second earlier
    client.set_now(NOW - 1);
    let state = planner
        .check_permission(&account.owner, &config.asset_mint, &account.address, 10)
        .await?;
    assert!(state.granted);
    Ok(())
}

#[tokio::test]
async fn allowance_is_read_on_every_check() -> anyhow::Result<()> {
    let (client, config, account, planner) = setup();
    client.grant_allowance(&config, &account, 500, NOW + 60);

    let first = planner
        .check_permission(&account.owner, &config.asset_mint, &account.address, 500)
        .await?;
    assert!(first.granted);

    // Spent elsewhere between two checks
    client.grant_allowance(&config, &account, 0, NOW + 60);
    let second = planner
        .check_permission(&account.owner, &config.asset_mint, &account.address, 500)
        .await?;
    assert!(!second.granted);
    Ok(())
}

#[tokio::test]
async fn allowance_for_another_spender_does_not_count() -> anyhow::Result<()> {
    let (client, config, account, planner) = setup();
    client.grant_allowance(&config, &account, 500, NOW + 60);

    let state = planner
        .check_permission(
            &account.owner,
            &config.asset_mint,
            &Pubkey::new_unique(),
            500,
        )
        .await?;
    assert!(!state.granted);
    Ok(())
}
