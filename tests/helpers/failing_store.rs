// Store wrapper that fails one transactional write
//
// Reads and every other write go to the wrapped in-memory store, so a failure
// can be injected after earlier writes of the same unit of work succeeded.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use commission_ledger::core::{AppError, Result};
use commission_ledger::modules::commissions::models::CommissionCalculation;
use commission_ledger::modules::contracts::models::{Contract, InstallmentCommissionTotals};
use commission_ledger::modules::installments::models::Installment;
use commission_ledger::storage::{InMemoryLedgerStore, LedgerStore, LedgerTransaction};

/// Transactional write that returns a storage error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailingWrite {
    InsertInstallments,
    UpdateInstallment,
    DeleteInstallment,
    SetCalculationTotal,
}

fn storage_failure() -> AppError {
    AppError::Database(sqlx::Error::PoolTimedOut)
}

pub struct FailingStore {
    inner: InMemoryLedgerStore,
    fail_on: FailingWrite,
}

impl FailingStore {
    pub fn new(inner: InMemoryLedgerStore, fail_on: FailingWrite) -> Self {
        Self { inner, fail_on }
    }
}

#[async_trait]
impl LedgerStore for FailingStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>> {
        Ok(Box::new(FailingTransaction {
            inner: self.inner.begin().await?,
            fail_on: self.fail_on,
        }))
    }

    async fn find_calculation(&self, id: &str) -> Result<Option<CommissionCalculation>> {
        self.inner.find_calculation(id).await
    }

    async fn list_calculations(
        &self,
        negotiation_id: i64,
        status: Option<&str>,
    ) -> Result<Vec<CommissionCalculation>> {
        self.inner.list_calculations(negotiation_id, status).await
    }

    async fn list_calculations_by_consultant(
        &self,
        consultant_id: i64,
    ) -> Result<Vec<CommissionCalculation>> {
        self.inner.list_calculations_by_consultant(consultant_id).await
    }

    async fn find_installment(&self, id: &str) -> Result<Option<Installment>> {
        self.inner.find_installment(id).await
    }

    async fn list_installments(&self, calculation_id: &str) -> Result<Vec<Installment>> {
        self.inner.list_installments(calculation_id).await
    }

    async fn list_installments_by_consultant(&self, consultant_id: i64) -> Result<Vec<Installment>> {
        self.inner.list_installments_by_consultant(consultant_id).await
    }

    async fn list_contracts_by_consultant(&self, consultant_id: i64) -> Result<Vec<Contract>> {
        self.inner.list_contracts_by_consultant(consultant_id).await
    }

    async fn installment_commission_by_status(
        &self,
        consultant_id: i64,
    ) -> Result<Vec<InstallmentCommissionTotals>> {
        self.inner.installment_commission_by_status(consultant_id).await
    }

    async fn ping(&self) -> Result<()> {
        self.inner.ping().await
    }
}

struct FailingTransaction {
    inner: Box<dyn LedgerTransaction>,
    fail_on: FailingWrite,
}

impl FailingTransaction {
    fn check(&self, write: FailingWrite) -> Result<()> {
        if self.fail_on == write {
            return Err(storage_failure());
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerTransaction for FailingTransaction {
    async fn find_calculation(&mut self, id: &str) -> Result<Option<CommissionCalculation>> {
        self.inner.find_calculation(id).await
    }

    async fn insert_calculation(&mut self, calculation: &CommissionCalculation) -> Result<()> {
        self.inner.insert_calculation(calculation).await
    }

    async fn update_calculation(&mut self, calculation: &CommissionCalculation) -> Result<()> {
        self.inner.update_calculation(calculation).await
    }

    async fn soft_delete_calculation(&mut self, id: &str, deleted_at: DateTime<Utc>) -> Result<()> {
        self.inner.soft_delete_calculation(id, deleted_at).await
    }

    async fn find_installment(&mut self, id: &str) -> Result<Option<Installment>> {
        self.inner.find_installment(id).await
    }

    async fn insert_installments(&mut self, installments: &[Installment]) -> Result<()> {
        self.check(FailingWrite::InsertInstallments)?;
        self.inner.insert_installments(installments).await
    }

    async fn update_installment(&mut self, installment: &Installment) -> Result<()> {
        // The write lands before the failure is reported
        self.inner.update_installment(installment).await?;
        self.check(FailingWrite::UpdateInstallment)
    }

    async fn delete_installment(&mut self, id: &str) -> Result<()> {
        self.inner.delete_installment(id).await?;
        self.check(FailingWrite::DeleteInstallment)
    }

    async fn sum_installment_values(&mut self, calculation_id: &str) -> Result<Decimal> {
        self.inner.sum_installment_values(calculation_id).await
    }

    async fn set_calculation_total(
        &mut self,
        calculation_id: &str,
        total: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.check(FailingWrite::SetCalculationTotal)?;
        self.inner
            .set_calculation_total(calculation_id, total, updated_at)
            .await
    }

    async fn commit(&mut self) -> Result<()> {
        self.inner.commit().await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.inner.rollback().await
    }
}
