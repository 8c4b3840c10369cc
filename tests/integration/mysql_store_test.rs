// Ledger workflow against a real MySQL database
//
// Run with: TEST_DATABASE_URL=mysql://... cargo test --test mysql_store_test -- --ignored

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use chrono::Utc;
use commission_ledger::core::{AppError, DateParsing};
use commission_ledger::modules::commissions::models::CreateCalculationRequest;
use commission_ledger::modules::commissions::CommissionService;
use commission_ledger::modules::installments::{InstallmentService, InstallmentStatus};
use commission_ledger::storage::{LedgerStore, MySqlLedgerStore};
use helpers::*;
use rust_decimal_macros::dec;

async fn services() -> (Arc<dyn LedgerStore>, CommissionService, InstallmentService) {
    let store: Arc<dyn LedgerStore> = Arc::new(MySqlLedgerStore::new(create_test_pool().await));
    (
        store.clone(),
        CommissionService::new(store.clone(), DateParsing::Lenient),
        InstallmentService::new(store),
    )
}

/// Negotiation id unlikely to collide with rows left by earlier runs
fn fresh_negotiation() -> i64 {
    Utc::now().timestamp_micros()
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_create_persists_calculation_and_installments() {
    let (store, commissions, _) = services().await;
    let negotiation = fresh_negotiation();

    let created = commissions
        .create(negotiation, TestDataFactory::equal_installments(3, dec!(100)))
        .await
        .unwrap();

    let stored = store
        .find_calculation(&created.calculation.id)
        .await
        .unwrap()
        .expect("calculation should be stored");
    assert_eq!(stored.total_receivable, dec!(300));
    assert_eq!(stored.negotiation_id, negotiation);

    let installments = store.list_installments(&created.calculation.id).await.unwrap();
    assert_eq!(installments.len(), 3);
    assert!(installments
        .windows(2)
        .all(|pair| pair[0].due_date <= pair[1].due_date));
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_invalid_mode_leaves_no_rows() {
    let (store, commissions, _) = services().await;
    let negotiation = fresh_negotiation();
    let request = CreateCalculationRequest {
        payment_mode: "bogus".to_string(),
        ..TestDataFactory::equal_installments(3, dec!(100))
    };

    assert!(commissions.create(negotiation, request).await.is_err());
    assert!(store
        .list_calculations(negotiation, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_installment_mutations_keep_total_in_sync() {
    let (store, commissions, installments) = services().await;
    let created = commissions
        .create(fresh_negotiation(), TestDataFactory::equal_installments(3, dec!(100)))
        .await
        .unwrap();
    let calculation_id = created.calculation.id.clone();

    let paid = installments
        .update_status(&created.installments[0].id, InstallmentStatus::Paid, Utc::now())
        .await
        .unwrap();
    assert!(paid.payment_date.is_some());

    let err = installments
        .update_status(&paid.id, InstallmentStatus::Pending, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::IllegalStatusTransition { .. }));

    installments
        .delete(&created.installments[1].id, Utc::now())
        .await
        .unwrap();

    let stored = store.find_calculation(&calculation_id).await.unwrap().unwrap();
    assert_eq!(stored.total_receivable, dec!(200));
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_soft_delete_hides_calculation_and_installments() {
    let (store, commissions, _) = services().await;
    let negotiation = fresh_negotiation();
    let created = commissions
        .create(negotiation, TestDataFactory::split_in_two(dec!(10), dec!(20)))
        .await
        .unwrap();

    commissions
        .delete(negotiation, &created.calculation.id, Utc::now())
        .await
        .unwrap();

    assert!(store
        .find_calculation(&created.calculation.id)
        .await
        .unwrap()
        .is_none());
    assert!(store
        .find_installment(&created.installments[0].id)
        .await
        .unwrap()
        .is_none());
    assert!(store
        .list_calculations(negotiation, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_ping() {
    let (store, _, _) = services().await;
    store.ping().await.unwrap();
}
