// Installment mutations and the calculation total they keep in sync

#[path = "../helpers/mod.rs"]
mod helpers;

use chrono::{TimeZone, Utc};
use commission_ledger::core::AppError;
use commission_ledger::modules::commissions::models::CalculationWithInstallments;
use commission_ledger::modules::installments::{
    InstallmentStatus, InstallmentUpdate, NewInstallment,
};
use helpers::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn three_equal(ledger: &TestLedger) -> CalculationWithInstallments {
    ledger
        .commissions
        .create(1, TestDataFactory::equal_installments(3, dec!(100)))
        .await
        .expect("create should succeed")
}

async fn total_of(ledger: &TestLedger, calculation_id: &str) -> Decimal {
    ledger
        .commissions
        .get(calculation_id)
        .await
        .unwrap()
        .calculation
        .total_receivable
}

fn new_installment(value: Decimal) -> NewInstallment {
    NewInstallment {
        value,
        due_date: utc(2024, 4, 1),
        status: None,
        attachment: None,
        invoice: None,
        monthly_volume: None,
    }
}

#[tokio::test]
async fn test_mark_paid_stamps_payment_date_only() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let target = created.installments[1].id.clone();
    let now = Utc.with_ymd_and_hms(2024, 2, 3, 9, 0, 0).unwrap();

    let paid = ledger
        .installments
        .update_status(&target, InstallmentStatus::Paid, now)
        .await
        .unwrap();

    assert_eq!(paid.status, InstallmentStatus::Paid);
    assert_eq!(paid.payment_date, Some(now));

    let listed = ledger.installments.list(&created.calculation.id).await.unwrap();
    for installment in listed.iter().filter(|i| i.id != target) {
        assert_eq!(installment.status, InstallmentStatus::Pending);
        assert!(installment.payment_date.is_none());
    }
    assert_eq!(total_of(&ledger, &created.calculation.id).await, dec!(300));
}

#[tokio::test]
async fn test_paid_cannot_go_back_to_pending() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let target = created.installments[0].id.clone();
    let paid_at = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();

    ledger
        .installments
        .update_status(&target, InstallmentStatus::Paid, paid_at)
        .await
        .unwrap();

    let err = ledger
        .installments
        .update_status(&target, InstallmentStatus::Pending, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::IllegalStatusTransition { ref from, ref to } if from == "Pago" && to == "Pendente"
    ));

    let stored = ledger.installments.get(&target).await.unwrap();
    assert_eq!(stored.status, InstallmentStatus::Paid);
    assert_eq!(stored.payment_date, Some(paid_at));
}

#[tokio::test]
async fn test_paid_cannot_be_canceled_or_replaced_as_pending() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let target = created.installments[0].id.clone();

    ledger
        .installments
        .update_status(&target, InstallmentStatus::Paid, Utc::now())
        .await
        .unwrap();

    assert!(ledger
        .installments
        .update_status(&target, InstallmentStatus::Canceled, Utc::now())
        .await
        .is_err());

    let update = InstallmentUpdate {
        value: dec!(1),
        due_date: utc(2024, 1, 1),
        status: InstallmentStatus::Pending,
        attachment: None,
        invoice: None,
        monthly_volume: None,
    };
    let err = ledger
        .installments
        .update(&target, update, Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "illegal_status_transition");
    assert_eq!(total_of(&ledger, &created.calculation.id).await, dec!(300));
}

#[tokio::test]
async fn test_non_paid_statuses_move_freely() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let target = created.installments[2].id.clone();

    for status in [
        InstallmentStatus::NfSent,
        InstallmentStatus::Canceled,
        InstallmentStatus::Pending,
        InstallmentStatus::NfSent,
    ] {
        let updated = ledger
            .installments
            .update_status(&target, status, Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.status, status);
        assert!(updated.payment_date.is_none());
    }
}

#[tokio::test]
async fn test_delete_recomputes_total() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let target = created.installments[0].id.clone();

    ledger.installments.delete(&target, Utc::now()).await.unwrap();

    assert_eq!(total_of(&ledger, &created.calculation.id).await, dec!(200));
    assert_eq!(
        ledger
            .installments
            .list(&created.calculation.id)
            .await
            .unwrap()
            .len(),
        2
    );
    assert!(matches!(
        ledger.installments.get(&target).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_last_installment_gives_zero_total() {
    let ledger = TestLedger::new();
    let created = ledger
        .commissions
        .create(1, TestDataFactory::equal_installments(1, dec!(75)))
        .await
        .unwrap();

    ledger
        .installments
        .delete(&created.installments[0].id, Utc::now())
        .await
        .unwrap();

    assert_eq!(total_of(&ledger, &created.calculation.id).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_delete_missing_installment_is_not_found() {
    let ledger = TestLedger::new();

    let err = ledger
        .installments
        .delete("missing", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_create_installment_adds_to_total() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let now = Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap();

    let added = ledger
        .installments
        .create_for_calculation(&created.calculation.id, new_installment(dec!(45.5)), now)
        .await
        .unwrap();

    assert_eq!(added.calculation_id, created.calculation.id);
    assert_eq!(added.status, InstallmentStatus::Pending);
    assert_eq!(total_of(&ledger, &created.calculation.id).await, dec!(345.5));
}

#[tokio::test]
async fn test_create_installment_as_paid_is_stamped() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let now = Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap();

    let added = ledger
        .installments
        .create_for_calculation(
            &created.calculation.id,
            NewInstallment {
                status: Some(InstallmentStatus::Paid),
                ..new_installment(dec!(10))
            },
            now,
        )
        .await
        .unwrap();

    assert_eq!(added.payment_date, Some(now));
}

#[tokio::test]
async fn test_create_installment_for_missing_calculation() {
    let ledger = TestLedger::new();

    let err = ledger
        .installments
        .create_for_calculation("missing", new_installment(dec!(10)), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert!(matches!(
        ledger.installments.list("missing").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_full_update_recomputes_total_and_keeps_payment_date() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let target = created.installments[0].id.clone();
    let paid_at = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();

    ledger
        .installments
        .update_status(&target, InstallmentStatus::Paid, paid_at)
        .await
        .unwrap();

    let updated = ledger
        .installments
        .update(
            &target,
            InstallmentUpdate {
                value: dec!(150),
                due_date: utc(2024, 1, 10),
                status: InstallmentStatus::Paid,
                attachment: Some("comprovante.pdf".to_string()),
                invoice: Some(String::new()),
                monthly_volume: Some(dec!(12.5)),
            },
            Utc::now(),
        )
        .await
        .unwrap();

    assert_eq!(updated.value, dec!(150));
    assert_eq!(updated.payment_date, Some(paid_at));
    assert_eq!(updated.attachment.as_deref(), Some("comprovante.pdf"));
    assert!(updated.invoice.is_none());
    assert_eq!(total_of(&ledger, &created.calculation.id).await, dec!(350));
}

#[tokio::test]
async fn test_installment_mutation_overrides_manual_total() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;

    ledger
        .commissions
        .update_status(
            1,
            &created.calculation.id,
            commission_ledger::modules::commissions::models::CalculationStatusUpdate {
                status: "Aprovado".to_string(),
                total_receivable: Some(dec!(1)),
            },
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(total_of(&ledger, &created.calculation.id).await, dec!(1));

    ledger
        .installments
        .set_attachment(
            &created.installments[0].id,
            Some("nf.pdf".to_string()),
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(total_of(&ledger, &created.calculation.id).await, dec!(300));
}

#[tokio::test]
async fn test_attachment_and_invoice_set_and_clear() {
    let ledger = TestLedger::new();
    let created = three_equal(&ledger).await;
    let target = created.installments[0].id.clone();

    let with_attachment = ledger
        .installments
        .set_attachment(&target, Some("s3://bucket/a.pdf".to_string()), Utc::now())
        .await
        .unwrap();
    assert_eq!(with_attachment.attachment.as_deref(), Some("s3://bucket/a.pdf"));

    let with_invoice = ledger
        .installments
        .set_invoice(&target, Some("NF-123".to_string()), Utc::now())
        .await
        .unwrap();
    assert_eq!(with_invoice.invoice.as_deref(), Some("NF-123"));
    assert_eq!(with_invoice.attachment.as_deref(), Some("s3://bucket/a.pdf"));

    let cleared = ledger
        .installments
        .set_attachment(&target, None, Utc::now())
        .await
        .unwrap();
    assert!(cleared.attachment.is_none());

    let cleared = ledger
        .installments
        .set_invoice(&target, Some(String::new()), Utc::now())
        .await
        .unwrap();
    assert!(cleared.invoice.is_none());
}

#[tokio::test]
async fn test_list_by_consultant_orders_by_due_date() {
    let ledger = TestLedger::new();
    ledger.store.register_negotiation(1, 42).await;
    ledger.store.register_negotiation(2, 42).await;

    ledger
        .commissions
        .create(1, TestDataFactory::equal_installments(2, dec!(10)))
        .await
        .unwrap();
    ledger
        .commissions
        .create(2, TestDataFactory::split_in_two(dec!(5), dec!(5)))
        .await
        .unwrap();

    let installments = ledger.installments.list_by_consultant(42).await.unwrap();
    assert_eq!(installments.len(), 4);
    assert!(installments
        .windows(2)
        .all(|pair| pair[0].due_date <= pair[1].due_date));
}

#[derive(Debug, Clone)]
enum Step {
    Add(i64),
    Delete(usize),
    Revalue(usize, i64),
    Pay(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0i64..100_000).prop_map(Step::Add),
        (0usize..16).prop_map(Step::Delete),
        (0usize..16, 0i64..100_000).prop_map(|(i, v)| Step::Revalue(i, v)),
        (0usize..16).prop_map(Step::Pay),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// After any sequence of installment mutations the stored total is the
    /// sum of the live installments
    #[test]
    fn prop_total_tracks_live_installments(steps in proptest::collection::vec(step(), 1..12)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let ledger = TestLedger::new();
            let created = three_equal(&ledger).await;
            let calculation_id = created.calculation.id.clone();

            for step in steps {
                let live = ledger.installments.list(&calculation_id).await.unwrap();
                match step {
                    Step::Add(cents) => {
                        ledger
                            .installments
                            .create_for_calculation(
                                &calculation_id,
                                new_installment(Decimal::new(cents, 2)),
                                Utc::now(),
                            )
                            .await
                            .unwrap();
                    }
                    Step::Delete(index) if !live.is_empty() => {
                        let id = &live[index % live.len()].id;
                        ledger.installments.delete(id, Utc::now()).await.unwrap();
                    }
                    Step::Revalue(index, cents) if !live.is_empty() => {
                        let current = &live[index % live.len()];
                        let update = InstallmentUpdate {
                            value: Decimal::new(cents, 2),
                            due_date: current.due_date,
                            status: current.status,
                            attachment: current.attachment.clone(),
                            invoice: current.invoice.clone(),
                            monthly_volume: current.monthly_volume,
                        };
                        ledger
                            .installments
                            .update(&current.id, update, Utc::now())
                            .await
                            .unwrap();
                    }
                    Step::Pay(index) if !live.is_empty() => {
                        let id = &live[index % live.len()].id;
                        ledger
                            .installments
                            .update_status(id, InstallmentStatus::Paid, Utc::now())
                            .await
                            .unwrap();
                    }
                    _ => {}
                }

                let expected: Decimal = ledger
                    .installments
                    .list(&calculation_id)
                    .await
                    .unwrap()
                    .iter()
                    .map(|i| i.value)
                    .sum();
                assert_eq!(total_of(&ledger, &calculation_id).await, expected);
            }
        });
    }
}
