use std::sync::Arc;

use stealth_vault::ledger::EncryptedPortfolioRecord;
use stealth_vault::{
    Address, ContractCall, ContractQuery, FheBackend, FheGateway, FheProvider, MockFheBackend,
    MockFheProvider, MockLedgerTransport, Position, PositionId, PositionInput, StaticWallet,
    TransportError, VaultClient, VaultError, WalletSession,
};

fn contract() -> Address {
    Address::new("0xc0ffee".to_string())
}

fn user() -> Address {
    Address::new("0xa11ce".to_string())
}

fn client_with(
    transport: MockLedgerTransport,
    wallet: StaticWallet,
) -> (VaultClient, Arc<MockLedgerTransport>) {
    let provider: Arc<dyn FheProvider> = Arc::new(MockFheProvider::default());
    let gateway = Arc::new(FheGateway::new(provider));
    let transport = Arc::new(transport);
    let wallet: Arc<dyn WalletSession> = Arc::new(wallet);
    let client = VaultClient::new(gateway, transport.clone(), wallet, contract());
    (client, transport)
}

fn connected_client(transport: MockLedgerTransport) -> (VaultClient, Arc<MockLedgerTransport>) {
    client_with(transport, StaticWallet::connected(user()))
}

fn disconnected_client(transport: MockLedgerTransport) -> (VaultClient, Arc<MockLedgerTransport>) {
    client_with(transport, StaticWallet::disconnected())
}

#[tokio::test]
async fn test_create_position_without_wallet_makes_no_network_call() {
    let (client, transport) = disconnected_client(MockLedgerTransport::new());

    let err = client.create_position(10.0, 5.0, 100.0).await.unwrap_err();
    assert!(matches!(err, VaultError::NoWallet));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_writes_without_wallet_all_short_circuit() {
    let (client, transport) = disconnected_client(MockLedgerTransport::new());

    assert!(matches!(
        client.update_position(PositionId::new(1), 1.0, 1.0).await,
        Err(VaultError::NoWallet)
    ));
    assert!(matches!(
        client.update_portfolio_metrics(600, 30, 20, 80).await,
        Err(VaultError::NoWallet)
    ));
    assert!(matches!(
        client.request_analytics().await,
        Err(VaultError::NoWallet)
    ));
    assert!(matches!(
        client.clear_private_data().await,
        Err(VaultError::NoWallet)
    ));
    assert!(matches!(
        client.clear_position_data(PositionId::new(1)).await,
        Err(VaultError::NoWallet)
    ));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_create_position_submits_amount_proof() {
    let (client, transport) = connected_client(MockLedgerTransport::new());

    client.create_position(10.0, 5.0, 100.0).await.unwrap();

    let calls = transport.submitted();
    assert_eq!(calls.len(), 1);
    let ContractCall::CreatePosition {
        amount,
        shares,
        entry_price,
        proof,
    } = &calls[0]
    else {
        panic!("expected createPosition, got {:?}", calls[0]);
    };

    // The mock backend is deterministic, so the expected ciphertexts and
    // the amount-scoped proof can be recomputed independently.
    let reference = MockFheBackend::new();
    assert_eq!(amount, &reference.encrypt(10).await.unwrap());
    assert_eq!(shares, &reference.encrypt(5).await.unwrap());
    assert_eq!(entry_price, &reference.encrypt(100).await.unwrap());
    let expected_proof = reference
        .prove(&contract(), &user(), amount)
        .await
        .unwrap();
    assert_eq!(proof, &expected_proof);
}

#[tokio::test]
async fn test_update_position_transmits_two_ciphertexts() {
    let (client, transport) = connected_client(MockLedgerTransport::new());

    client
        .update_position(PositionId::new(3), 20.0, 8.0)
        .await
        .unwrap();

    let calls = transport.submitted();
    let ContractCall::UpdatePosition {
        position_id,
        new_amount,
        new_shares,
        ..
    } = &calls[0]
    else {
        panic!("expected updatePosition, got {:?}", calls[0]);
    };
    assert_eq!(*position_id, PositionId::new(3));

    let reference = MockFheBackend::new();
    assert_eq!(new_amount, &reference.encrypt(20).await.unwrap());
    assert_eq!(new_shares, &reference.encrypt(8).await.unwrap());
}

#[tokio::test]
async fn test_update_cleared_position_is_rejected() {
    let transport = MockLedgerTransport::new().with_cleared_position(PositionId::new(9));
    let (client, _) = connected_client(transport);

    let err = client
        .update_position(PositionId::new(9), 1.0, 1.0)
        .await
        .unwrap_err();
    match err {
        VaultError::Transaction(TransportError::Rejected { method, .. }) => {
            assert_eq!(method, "updatePosition");
        }
        other => panic!("expected contract rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_clear_position_twice_is_idempotent() {
    let (client, transport) = connected_client(MockLedgerTransport::new());

    client.clear_position_data(PositionId::new(2)).await.unwrap();
    client.clear_position_data(PositionId::new(2)).await.unwrap();
    assert_eq!(transport.submitted().len(), 2);
}

#[tokio::test]
async fn test_network_failure_propagates_unmodified() {
    let transport = MockLedgerTransport::new().with_network_failure("connection reset");
    let (client, _) = connected_client(transport);

    let err = client.request_analytics().await.unwrap_err();
    match err {
        VaultError::Transaction(TransportError::Network(msg)) => {
            assert_eq!(msg, "connection reset");
        }
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reads_default_without_wallet() {
    let transport = MockLedgerTransport::new()
        .with_position_count(7)
        .with_position_ids(vec![PositionId::new(1)]);
    let (client, transport) = disconnected_client(transport);

    assert_eq!(client.get_user_position_count().await.unwrap(), 0);
    assert!(client.get_user_position_ids().await.unwrap().is_empty());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_reads_with_wallet_hit_the_ledger() {
    let transport = MockLedgerTransport::new()
        .with_position_count(2)
        .with_position_ids(vec![PositionId::new(4), PositionId::new(7)]);
    let (client, transport) = connected_client(transport);

    assert_eq!(client.get_user_position_count().await.unwrap(), 2);
    assert_eq!(
        client.get_user_position_ids().await.unwrap(),
        vec![PositionId::new(4), PositionId::new(7)]
    );

    let queries = transport.queried();
    assert_eq!(queries.len(), 2);
    assert!(matches!(queries[0], ContractQuery::PositionCount { .. }));
    assert!(matches!(queries[1], ContractQuery::PositionIds { .. }));
}

#[tokio::test]
async fn test_submit_portfolio_summary_composes_aggregator() {
    let (client, transport) = connected_client(MockLedgerTransport::new());

    let mut p1 = Position::open(PositionId::new(1), &PositionInput::new(10.0, 5.0, 100.0));
    p1.apply_update(10.0, 5.0, 110.0);
    let mut p2 = Position::open(PositionId::new(2), &PositionInput::new(2.0, 1.0, 100.0));
    p2.apply_update(2.0, 1.0, 105.0);

    let (summary, _tx) = client.submit_portfolio_summary(&[p1, p2]).await.unwrap();
    assert_eq!(summary.total_value, 1310);
    assert_eq!(summary.total_pnl, 110);
    assert_eq!(summary.risk_exposure, 30);
    assert_eq!(summary.diversification_score, 70);

    let calls = transport.submitted();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method(), "updatePortfolioMetrics");
}

#[tokio::test]
async fn test_portfolio_record_round_trip() {
    // Build an encrypted portfolio record with the same deterministic mock
    // backend the client's gateway uses, then decrypt it back.
    let reference = MockFheBackend::new();
    let record = EncryptedPortfolioRecord {
        total_value: reference.encrypt(600).await.unwrap(),
        total_pnl: reference.encrypt(-30).await.unwrap(),
        risk_exposure: reference.encrypt(20).await.unwrap(),
        diversification_score: reference.encrypt(80).await.unwrap(),
        is_private: reference.encrypt(1).await.unwrap(),
    };
    let transport = MockLedgerTransport::new().with_portfolio_record(record);
    let (client, _) = connected_client(transport);

    let fetched = client.get_portfolio_data().await.unwrap();
    let summary = client.decrypt_portfolio_data(&fetched).await.unwrap();
    assert_eq!(summary.total_value, 600);
    assert_eq!(summary.total_pnl, -30);
    assert_eq!(summary.risk_exposure, 20);
    assert_eq!(summary.diversification_score, 80);
    assert!(summary.is_private);
}

#[tokio::test]
async fn test_get_all_position_data_fans_out_per_id() {
    let reference = MockFheBackend::new();
    let record = stealth_vault::ledger::EncryptedPositionRecord {
        amount: reference.encrypt(10).await.unwrap(),
        shares: reference.encrypt(5).await.unwrap(),
        entry_price: reference.encrypt(100).await.unwrap(),
        current_price: reference.encrypt(130).await.unwrap(),
        is_active: reference.encrypt(1).await.unwrap(),
    };
    let transport = MockLedgerTransport::new()
        .with_position_ids(vec![PositionId::new(1), PositionId::new(2)])
        .with_position_record(record);
    let (client, transport) = connected_client(transport);

    let records = client.get_all_position_data().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0, PositionId::new(1));
    assert_eq!(records[1].0, PositionId::new(2));
    // One ids query plus one data query per id.
    assert_eq!(transport.queried().len(), 3);
}
