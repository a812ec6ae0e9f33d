use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use assert_matches::assert_matches;
use ledger_client::contract::SupplyChain;
use ledger_client::manifest::DeploymentManifest;
use ledger_client::mutation::{MutationPhase, ProductForm, SupplierForm, TransferForm};
use ledger_client::provider::{ProviderEvent, ProviderKind, ResolvedProvider};
use ledger_client::session::{SessionOptions, STATUS_READY};
use ledger_client::test_utils::{
    product, receipt, MockProvider, RecordedCall, ACCOUNT_A, ACCOUNT_B, CONTRACT_ADDRESS,
};
use ledger_client::{Error, Session, ValidationError};
use ledger_utils::{TransactionResult, TxnConfig};

async fn connect(provider: &Arc<MockProvider>) -> ledger_client::error::Result<Arc<Session>> {
    connect_with_options(provider, SessionOptions::default()).await
}

async fn connect_with_options(
    provider: &Arc<MockProvider>,
    options: SessionOptions,
) -> ledger_client::error::Result<Arc<Session>> {
    let resolved = ResolvedProvider { kind: ProviderKind::Direct, provider: provider.clone() };
    Session::connect_with(resolved, DeploymentManifest::bundled().unwrap(), options).await
}

fn product_form(name: &str, description: &str, price: &str) -> ProductForm {
    ProductForm { name: name.into(), description: description.into(), price: price.into() }
}

#[tokio::test]
async fn connect_binds_first_account_and_syncs() {
    let provider = Arc::new(
        MockProvider::new(5777)
            .with_accounts(vec![ACCOUNT_A, ACCOUNT_B])
            .with_products(vec![product(1, "Widget"), product(2, "Gadget")]),
    );

    let session = connect(&provider).await.unwrap();

    assert_eq!(session.active_account(), Some(ACCOUNT_A));
    assert_eq!(session.descriptor().unwrap().contract_address, CONTRACT_ADDRESS);
    assert_eq!(session.status(), STATUS_READY);
    similar_asserts::assert_eq!(
        *session.current_entities(),
        vec![product(1, "Widget"), product(2, "Gadget")]
    );
}

#[tokio::test]
async fn connect_refuses_zero_accounts() {
    let provider = Arc::new(MockProvider::new(5777));
    assert_matches!(connect(&provider).await, Err(Error::NoAccounts));
}

#[tokio::test]
async fn unsupported_network_issues_no_contract_call() {
    let provider = Arc::new(MockProvider::new(1).with_accounts(vec![ACCOUNT_A]));

    let err = connect(&provider).await.unwrap_err();

    assert_matches!(err, Error::NetworkUnsupported { network_id: 1, .. });
    assert!(err.is_fatal());
    assert_eq!(provider.calls(), vec![RecordedCall::Accounts, RecordedCall::NetworkId]);
    assert_eq!(
        ledger_client::session::connection_failed_status(&err),
        "Connection failed: Contract not deployed on network 1. Available networks: 5777"
    );
}

#[tokio::test]
async fn sync_omits_failed_indices() {
    let provider = Arc::new(
        MockProvider::new(5777)
            .with_accounts(vec![ACCOUNT_A])
            .with_products(vec![product(1, "Widget"), product(2, "Gadget")])
            .fail_index(2),
    );

    let session = connect(&provider).await.unwrap();

    similar_asserts::assert_eq!(*session.current_entities(), vec![product(1, "Widget")]);
}

#[tokio::test]
async fn failed_count_read_is_reported_by_explicit_sync() {
    let provider =
        Arc::new(MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]).with_product_count(2).fail_count());

    let session = connect(&provider).await.unwrap();
    assert!(session.current_entities().is_empty());

    assert_matches!(session.sync().await, Err(Error::RpcCall { method: "productCount()", .. }));
    assert!(session.current_entities().is_empty());
}

#[tokio::test]
async fn empty_collection_syncs_to_empty_snapshot() {
    let provider = Arc::new(MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]));

    let session = connect(&provider).await.unwrap();

    assert!(session.current_entities().is_empty());
    assert_eq!(provider.call_count::<SupplyChain::productsCall>(), 0);
}

#[tokio::test(start_paused = true)]
async fn create_product_writes_once_and_resyncs_once() {
    let provider = Arc::new(MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]));
    let session = connect(&provider).await.unwrap();
    provider.clear_calls();

    let mut form = product_form("Widget", "d", "2.0");
    let outcome = session.create_product(&mut form).await.unwrap();

    let expected = SupplyChain::createProductCall {
        name: "Widget".into(),
        description: "d".into(),
        price: U256::from(2_000_000_000_000_000_000u128),
    };
    assert_eq!(
        provider.sent(),
        vec![RecordedCall::Send {
            from: ACCOUNT_A,
            to: CONTRACT_ADDRESS,
            input: expected.abi_encode().into()
        }]
    );
    assert_matches!(outcome.transaction, TransactionResult::Hash(_));
    assert_eq!(form, ProductForm::default());
    assert_eq!(session.status(), "Product created successfully!");
    assert_eq!(session.phase(), MutationPhase::ScheduledResync);

    // nothing is read before the settle delay elapsed
    tokio::time::sleep(Duration::from_millis(1999)).await;
    assert_eq!(provider.call_count::<SupplyChain::productCountCall>(), 0);
    assert!(session.current_entities().is_empty());

    outcome.resync.await.unwrap();
    assert_eq!(provider.call_count::<SupplyChain::productCountCall>(), 1);
    assert_eq!(session.current_entities().len(), 1);
    assert_eq!(session.current_entities()[0].name, "Widget");
    assert_eq!(session.current_entities()[0].owner, ACCOUNT_A);
    assert_eq!(session.phase(), MutationPhase::Idle);
    assert_eq!(session.status(), STATUS_READY);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(provider.call_count::<SupplyChain::productCountCall>(), 1);
    assert_eq!(provider.sent().len(), 1);
}

#[rstest::rstest]
#[case(product_form("", "d", "2.0"))]
#[case(product_form("Widget", "", "2.0"))]
#[case(product_form("Widget", "d", ""))]
#[tokio::test]
async fn incomplete_product_issues_no_rpc(#[case] form: ProductForm) {
    let provider = Arc::new(MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]));
    let session = connect(&provider).await.unwrap();
    provider.clear_calls();

    let mut submitted = form.clone();
    let err = session.create_product(&mut submitted).await.unwrap_err();

    assert_matches!(err, Error::Validation(ValidationError::IncompleteProduct));
    assert_eq!(err.user_message(), "Please fill in all product fields");
    assert!(provider.calls().is_empty());
    assert_eq!(submitted, form);
    assert_eq!(session.phase(), MutationPhase::Idle);
}

#[tokio::test]
async fn invalid_recipient_issues_no_rpc() {
    let provider = Arc::new(MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]));
    let session = connect(&provider).await.unwrap();
    provider.clear_calls();

    let mut form = TransferForm { product_id: "1".into(), recipient: "0x1234".into() };
    let err = session.transfer_product(&mut form).await.unwrap_err();

    assert_matches!(err, Error::Validation(ValidationError::InvalidAddress(_)));
    assert_eq!(err.user_message(), "Invalid Ethereum address format");
    assert!(provider.calls().is_empty());
    assert_eq!(form.recipient, "0x1234");
}

#[tokio::test]
async fn failed_write_surfaces_node_message_and_keeps_form() {
    let provider = Arc::new(
        MockProvider::new(5777)
            .with_accounts(vec![ACCOUNT_A])
            .fail_writes("sender account not recognized"),
    );
    let session = connect(&provider).await.unwrap();

    let mut form = product_form("Widget", "d", "2.0");
    let err = session.create_product(&mut form).await.unwrap_err();

    assert_matches!(err, Error::RpcCall { .. });
    assert_eq!(session.status(), format!("Failed to create product: {}", err.user_message()));
    assert!(session.status().contains("sender account not recognized"));
    assert_eq!(form, product_form("Widget", "d", "2.0"));
    assert_eq!(session.phase(), MutationPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn transfer_moves_ownership_after_resync() {
    let provider = Arc::new(
        MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]).with_products(vec![product(1, "Widget")]),
    );
    let session = connect(&provider).await.unwrap();

    let mut form =
        TransferForm { product_id: "1".into(), recipient: ACCOUNT_B.to_checksum(None) };
    let outcome = session.transfer_product(&mut form).await.unwrap();
    assert_eq!(session.status(), "Product transferred successfully!");
    assert_eq!(session.current_entities()[0].owner, ACCOUNT_A);

    outcome.resync.await.unwrap();

    assert_eq!(session.current_entities()[0].owner, ACCOUNT_B);
    assert_eq!(form, TransferForm::default());
}

#[tokio::test(start_paused = true)]
async fn registered_supplier_can_be_looked_up() {
    let provider = Arc::new(MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]));
    let session = connect(&provider).await.unwrap();

    let mut form = SupplierForm {
        name: "Acme".into(),
        location: "Berlin".into(),
        contact: "acme@example.com".into(),
    };
    let outcome = session.register_supplier(&mut form).await.unwrap();
    assert_eq!(session.status(), "Supplier registered successfully!");
    outcome.resync.await.unwrap();

    let supplier = session.supplier(&ACCOUNT_A.to_string()).await.unwrap();
    assert!(supplier.is_registered);
    assert_eq!(supplier.name, "Acme");

    let unknown = session.supplier(&ACCOUNT_B.to_string()).await.unwrap();
    assert!(!unknown.is_registered);

    provider.clear_calls();
    assert_matches!(
        session.supplier("0xnope").await,
        Err(Error::Validation(ValidationError::InvalidAddress(_)))
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn waits_for_receipt_when_configured() {
    let provider = Arc::new(MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]));
    let options = SessionOptions {
        txn: TxnConfig { wait: true, receipt: true },
        settle: ledger_client::mutation::SettlePolicy::new(Duration::ZERO),
        ..Default::default()
    };
    let session = connect_with_options(&provider, options).await.unwrap();

    // the mock derives transaction hashes from a counter
    let hash = alloy_primitives::TxHash::left_padding_from(&1u64.to_be_bytes());
    provider.set_receipt_after(hash, receipt(hash, true), 1);

    let outcome = session.create_product(&mut product_form("Widget", "d", "1")).await.unwrap();

    assert_matches!(outcome.transaction, TransactionResult::HashReceipt(h, _) if h == hash);
    assert!(provider.calls().contains(&RecordedCall::Receipt(hash)));
}

#[tokio::test]
async fn reverted_transaction_fails_when_waiting() {
    let provider = Arc::new(MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]));
    let options = SessionOptions { txn: TxnConfig::init_wait(), ..Default::default() };
    let session = connect_with_options(&provider, options).await.unwrap();

    let hash = alloy_primitives::TxHash::left_padding_from(&1u64.to_be_bytes());
    provider.set_receipt_after(hash, receipt(hash, false), 1);

    let err = session.create_product(&mut product_form("Widget", "d", "1")).await.unwrap_err();

    assert_matches!(err, Error::TransactionWaiting(_));
    assert!(session.status().starts_with("Failed to create product:"));
}

#[tokio::test]
async fn account_change_switches_active_account() {
    let provider = Arc::new(MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]));
    let session = connect(&provider).await.unwrap();

    session.handle_event(ProviderEvent::AccountsChanged(vec![ACCOUNT_B, ACCOUNT_A])).await.unwrap();

    assert_eq!(session.active_account(), Some(ACCOUNT_B));
}

#[tokio::test]
async fn network_change_reresolves_descriptor() {
    let provider = Arc::new(
        MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]).with_products(vec![product(1, "Widget")]),
    );
    let session = connect(&provider).await.unwrap();

    provider.set_network_id(Some(1));
    let err = session.handle_event(ProviderEvent::NetworkChanged(1)).await.unwrap_err();
    assert_matches!(err, Error::NetworkUnsupported { network_id: 1, .. });
    assert!(session.status().starts_with("Connection failed: Contract not deployed on network 1"));
    assert!(!session.is_connected());
    assert!(session.current_entities().is_empty());

    provider.set_network_id(Some(5777));
    provider.clear_calls();
    session.handle_event(ProviderEvent::NetworkChanged(5777)).await.unwrap();

    assert_eq!(provider.calls()[..2], [RecordedCall::NetworkId, RecordedCall::Code(CONTRACT_ADDRESS)]);
    assert_eq!(session.status(), STATUS_READY);
    assert_eq!(session.current_entities().len(), 1);
}

#[tokio::test]
async fn disconnected_session_issues_no_rpc() {
    let provider = Arc::new(
        MockProvider::new(5777).with_accounts(vec![ACCOUNT_A]).with_products(vec![product(1, "Widget")]),
    );
    let session = connect(&provider).await.unwrap();

    provider.set_network_id(Some(1));
    let err = session.handle_event(ProviderEvent::NetworkChanged(1)).await.unwrap_err();
    assert!(err.is_fatal());
    let status = session.status();
    provider.clear_calls();

    let mut form = product_form("Widget", "d", "2.0");
    let err = session.create_product(&mut form).await.unwrap_err();
    assert_matches!(err, Error::Disconnected(reason) if reason.starts_with("Contract not deployed on network 1"));
    assert_eq!(form, product_form("Widget", "d", "2.0"));
    assert_eq!(session.phase(), MutationPhase::Idle);

    assert_matches!(session.sync().await, Err(Error::Disconnected(_)));
    assert_matches!(session.supplier(&ACCOUNT_A.to_checksum(None)).await, Err(Error::Disconnected(_)));
    assert_matches!(session.descriptor(), Err(Error::Disconnected(_)));

    assert!(provider.calls().is_empty());
    assert!(provider.sent().is_empty());
    assert_eq!(provider.products().len(), 1);
    assert!(session.current_entities().is_empty());
    assert_eq!(session.status(), status);
}
