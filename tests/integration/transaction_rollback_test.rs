// A storage failure part way through a unit of work leaves nothing behind:
// neither the writes that preceded it nor a stale total.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use chrono::Utc;
use commission_ledger::core::DateParsing;
use commission_ledger::modules::commissions::models::CalculationWithInstallments;
use commission_ledger::modules::commissions::CommissionService;
use commission_ledger::modules::installments::{
    InstallmentService, InstallmentStatus, NewInstallment,
};
use commission_ledger::storage::{InMemoryLedgerStore, LedgerStore};
use helpers::*;
use rust_decimal_macros::dec;

fn commissions_over(store: &InMemoryLedgerStore, fail_on: FailingWrite) -> CommissionService {
    let failing: Arc<dyn LedgerStore> = Arc::new(FailingStore::new(store.clone(), fail_on));
    CommissionService::new(failing, DateParsing::Lenient)
}

fn installments_over(store: &InMemoryLedgerStore, fail_on: FailingWrite) -> InstallmentService {
    InstallmentService::new(Arc::new(FailingStore::new(store.clone(), fail_on)))
}

async fn three_equal(ledger: &TestLedger) -> CalculationWithInstallments {
    ledger
        .commissions
        .create(1, TestDataFactory::equal_installments(3, dec!(100)))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_failing_after_calculation_insert_persists_nothing() {
    for fail_on in [FailingWrite::InsertInstallments, FailingWrite::SetCalculationTotal] {
        let ledger = TestLedger::new();
        let commissions = commissions_over(&ledger.store, fail_on);

        let err = commissions
            .create(1, TestDataFactory::equal_installments(3, dec!(100)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "storage", "failing {:?}", fail_on);

        assert!(ledger.commissions.list(1, None).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_failed_status_change_keeps_row_and_total() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let target = created.installments[0].id.clone();

    for fail_on in [FailingWrite::UpdateInstallment, FailingWrite::SetCalculationTotal] {
        let installments = installments_over(&ledger.store, fail_on);

        let err = installments
            .update_status(&target, InstallmentStatus::Paid, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "storage");

        let stored = ledger.installments.get(&target).await.unwrap();
        assert_eq!(stored.status, InstallmentStatus::Pending);
        assert!(stored.payment_date.is_none());
    }

    let calculation = ledger.commissions.get(&created.calculation.id).await.unwrap();
    assert_eq!(calculation.calculation.total_receivable, dec!(300));
}

#[tokio::test]
async fn test_failed_delete_keeps_installment_and_total() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let target = created.installments[2].id.clone();

    for fail_on in [FailingWrite::DeleteInstallment, FailingWrite::SetCalculationTotal] {
        let installments = installments_over(&ledger.store, fail_on);

        let err = installments.delete(&target, Utc::now()).await.unwrap_err();
        assert_eq!(err.kind(), "storage");
    }

    assert!(ledger.installments.get(&target).await.is_ok());
    let calculation = ledger.commissions.get(&created.calculation.id).await.unwrap();
    assert_eq!(calculation.installments.len(), 3);
    assert_eq!(calculation.calculation.total_receivable, dec!(300));
}

#[tokio::test]
async fn test_failed_installment_create_adds_nothing() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let calculation_id = created.calculation.id.clone();

    for fail_on in [FailingWrite::InsertInstallments, FailingWrite::SetCalculationTotal] {
        let installments = installments_over(&ledger.store, fail_on);

        let err = installments
            .create_for_calculation(
                &calculation_id,
                NewInstallment {
                    value: dec!(50),
                    due_date: utc(2024, 4, 1),
                    status: None,
                    attachment: None,
                    invoice: None,
                    monthly_volume: None,
                },
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "storage");
    }

    let calculation = ledger.commissions.get(&calculation_id).await.unwrap();
    assert_eq!(calculation.installments.len(), 3);
    assert_eq!(calculation.calculation.total_receivable, dec!(300));
}

#[tokio::test]
async fn test_store_is_usable_after_rollback() {
    let ledger = TestLedger::new();
    let commissions = commissions_over(&ledger.store, FailingWrite::SetCalculationTotal);
    assert!(commissions
        .create(1, TestDataFactory::equal_installments(2, dec!(10)))
        .await
        .is_err());

    let created = three_equal(&ledger).await;
    assert_eq!(created.calculation.total_receivable, dec!(300));
    assert_eq!(ledger.commissions.list(1, None).await.unwrap().len(), 1);
}
