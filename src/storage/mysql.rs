use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlConnection, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::commissions::models::CommissionCalculation;
use crate::modules::commissions::repositories::CalculationRepository;
use crate::modules::contracts::models::{Contract, InstallmentCommissionTotals};
use crate::modules::contracts::repositories::ContractRepository;
use crate::modules::installments::models::Installment;
use crate::modules::installments::repositories::InstallmentRepository;
use crate::storage::{LedgerStore, LedgerTransaction, CLOSED_NEGOTIATION_STATUS};

/// Ledger storage backed by a MySQL pool
#[derive(Clone)]
pub struct MySqlLedgerStore {
    pool: MySqlPool,
}

impl MySqlLedgerStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for MySqlLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(MySqlLedgerTransaction { tx: Some(tx) }))
    }

    async fn find_calculation(&self, id: &str) -> Result<Option<CommissionCalculation>> {
        let mut conn = self.pool.acquire().await?;
        CalculationRepository::find_by_id(&mut conn, id).await
    }

    async fn list_calculations(
        &self,
        negotiation_id: i64,
        status: Option<&str>,
    ) -> Result<Vec<CommissionCalculation>> {
        let mut conn = self.pool.acquire().await?;
        CalculationRepository::find_by_negotiation(&mut conn, negotiation_id, status).await
    }

    async fn list_calculations_by_consultant(
        &self,
        consultant_id: i64,
    ) -> Result<Vec<CommissionCalculation>> {
        let mut conn = self.pool.acquire().await?;
        CalculationRepository::find_by_consultant(&mut conn, consultant_id).await
    }

    async fn find_installment(&self, id: &str) -> Result<Option<Installment>> {
        let mut conn = self.pool.acquire().await?;
        InstallmentRepository::find_by_id(&mut conn, id).await
    }

    async fn list_installments(&self, calculation_id: &str) -> Result<Vec<Installment>> {
        let mut conn = self.pool.acquire().await?;
        InstallmentRepository::find_by_calculation(&mut conn, calculation_id).await
    }

    async fn list_installments_by_consultant(&self, consultant_id: i64) -> Result<Vec<Installment>> {
        let mut conn = self.pool.acquire().await?;
        InstallmentRepository::find_by_consultant(&mut conn, consultant_id).await
    }

    async fn list_contracts_by_consultant(&self, consultant_id: i64) -> Result<Vec<Contract>> {
        let mut conn = self.pool.acquire().await?;
        ContractRepository::find_by_consultant(&mut conn, consultant_id).await
    }

    async fn installment_commission_by_status(
        &self,
        consultant_id: i64,
    ) -> Result<Vec<InstallmentCommissionTotals>> {
        let mut conn = self.pool.acquire().await?;
        InstallmentRepository::commission_totals_by_status(
            &mut conn,
            consultant_id,
            CLOSED_NEGOTIATION_STATUS,
        )
        .await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Open MySQL transaction; `None` once committed or rolled back
pub struct MySqlLedgerTransaction {
    tx: Option<Transaction<'static, MySql>>,
}

impl MySqlLedgerTransaction {
    fn conn(&mut self) -> Result<&mut MySqlConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| AppError::internal("Transaction already finished"))
    }
}

#[async_trait]
impl LedgerTransaction for MySqlLedgerTransaction {
    async fn find_calculation(&mut self, id: &str) -> Result<Option<CommissionCalculation>> {
        CalculationRepository::find_by_id(self.conn()?, id).await
    }

    async fn insert_calculation(&mut self, calculation: &CommissionCalculation) -> Result<()> {
        CalculationRepository::insert(self.conn()?, calculation).await
    }

    async fn update_calculation(&mut self, calculation: &CommissionCalculation) -> Result<()> {
        CalculationRepository::update(self.conn()?, calculation).await
    }

    async fn soft_delete_calculation(&mut self, id: &str, deleted_at: DateTime<Utc>) -> Result<()> {
        CalculationRepository::soft_delete(self.conn()?, id, deleted_at).await
    }

    async fn find_installment(&mut self, id: &str) -> Result<Option<Installment>> {
        InstallmentRepository::find_by_id(self.conn()?, id).await
    }

    async fn insert_installments(&mut self, installments: &[Installment]) -> Result<()> {
        InstallmentRepository::insert_batch(self.conn()?, installments).await
    }

    async fn update_installment(&mut self, installment: &Installment) -> Result<()> {
        InstallmentRepository::update(self.conn()?, installment).await
    }

    async fn delete_installment(&mut self, id: &str) -> Result<()> {
        InstallmentRepository::delete(self.conn()?, id).await
    }

    async fn sum_installment_values(&mut self, calculation_id: &str) -> Result<Decimal> {
        InstallmentRepository::sum_values(self.conn()?, calculation_id).await
    }

    async fn set_calculation_total(
        &mut self,
        calculation_id: &str,
        total: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        CalculationRepository::set_total(self.conn()?, calculation_id, total, updated_at).await
    }

    async fn commit(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(AppError::internal("Transaction already finished")),
        }
    }

    async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}
