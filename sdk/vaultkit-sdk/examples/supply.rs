// Example: Supplying wrapped SOL to a vault through a smart account
//
// This example demonstrates how to:
// 1. Load a vault configuration
// 2. Resolve the owner's smart account
// 3. Inspect the plan for a supply
// 4. Sign and submit it as one batch (deploying the account if needed)

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use std::sync::Arc;
use vaultkit_sdk::{ChainClient, Intent, RpcChainClient, SaltNonce, VaultKitConfig, VaultSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Vault configuration; usually VaultKitConfig::from_file("vaultkit.json")
    let config = VaultKitConfig::new(
        Pubkey::new_unique(), // Replace with the vault state account
        spl_token::native_mint::id(),
        Pubkey::new_unique(), // Replace with the vault share mint
        9,
    )
    .with_fee(25, Pubkey::new_unique());

    let client = Arc::new(RpcChainClient::new("https://api.devnet.solana.com"));
    let network = client.get_genesis_hash().await.map_err(|e| e.to_string())?;

    // 2. Keep the salt for the whole session, the account address depends on it
    let owner = Keypair::new();
    let session = VaultSession::new(client, config, SaltNonce::random())?;
    let account = session.connect(Some(owner.pubkey()), network).await?;

    println!("Smart account:");
    println!("  Owner: {}", account.owner);
    println!("  Address: {}", account.address);
    println!("  Deployed: {}", account.is_deployed);

    // 3. Plan only, nothing is sent
    let intent = Intent::Supply {
        amount: 1_000_000,
        wrap_native: true,
    };
    let plan = session.plan(&intent).await?;
    println!("Supply plan ({} steps):", plan.len());
    for call in plan.calls() {
        println!("  {:?} -> {}", call.kind(), call.target());
    }

    // 4. In a real application, with a funded owner:
    // let handle = session.submit(intent, &owner).await?;
    // println!("Confirmed: {}", handle.signature);

    Ok(())
}
