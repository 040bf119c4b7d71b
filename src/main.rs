use std::sync::Arc;
use std::time::Duration;

use stealth_vault::{
    Address, Config, FheGateway, RelayerFheProvider, RpcLedgerTransport, StaticWallet, VaultClient,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let timeout = Duration::from_millis(config.request_timeout_ms);
    let contract = Address::new(config.contract_address.clone());

    let provider = Arc::new(RelayerFheProvider::new(
        config.fhe_relayer_url.clone(),
        timeout,
    ));
    let gateway = Arc::new(FheGateway::new(provider));

    let transport = Arc::new(RpcLedgerTransport::new(
        config.ledger_rpc_url.clone(),
        contract.clone(),
        timeout,
    ));

    let wallet = Arc::new(match &config.wallet_address {
        Some(addr) => StaticWallet::connected(Address::new(addr.clone())),
        None => StaticWallet::disconnected(),
    });

    let client = VaultClient::new(gateway, transport, wallet, contract);

    // Read path smoke check: position count and ids for the configured
    // wallet (defaults when no wallet is configured).
    let count = match client.get_user_position_count().await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to query position count: {}", e);
            std::process::exit(1);
        }
    };
    let ids = match client.get_user_position_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            eprintln!("Failed to query position ids: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(count = count, "user positions on ledger");
    for id in ids {
        tracing::info!(position = %id, "tracked position");
    }
}
