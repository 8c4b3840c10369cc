//! Storage seam for the commission ledger
//!
//! Services receive an `Arc<dyn LedgerStore>` at construction time. Every
//! mutation touching a calculation and its installments runs inside one
//! `LedgerTransaction`, which is committed or rolled back as a unit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::core::Result;
use crate::modules::commissions::models::CommissionCalculation;
use crate::modules::contracts::models::{Contract, InstallmentCommissionTotals};
use crate::modules::installments::models::Installment;

pub mod memory;
pub mod mysql;

pub use memory::InMemoryLedgerStore;
pub use mysql::MySqlLedgerStore;

/// Negotiation status whose installments feed the installment commission summary
pub const CLOSED_NEGOTIATION_STATUS: &str = "Fechada";

/// Read access and transaction factory for ledger data
///
/// Read methods never return tombstoned rows.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a new unit of work
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>>;

    async fn find_calculation(&self, id: &str) -> Result<Option<CommissionCalculation>>;

    /// Calculations of a negotiation, optionally restricted to an exact status
    async fn list_calculations(
        &self,
        negotiation_id: i64,
        status: Option<&str>,
    ) -> Result<Vec<CommissionCalculation>>;

    /// Calculations of every negotiation owned by a consultant
    async fn list_calculations_by_consultant(
        &self,
        consultant_id: i64,
    ) -> Result<Vec<CommissionCalculation>>;

    async fn find_installment(&self, id: &str) -> Result<Option<Installment>>;

    /// Installments of a calculation ordered by due date ascending
    async fn list_installments(&self, calculation_id: &str) -> Result<Vec<Installment>>;

    /// Installments of every calculation owned by a consultant, by due date
    async fn list_installments_by_consultant(&self, consultant_id: i64) -> Result<Vec<Installment>>;

    /// Contracts reached through the consultant's negotiations
    async fn list_contracts_by_consultant(&self, consultant_id: i64) -> Result<Vec<Contract>>;

    /// Live installments of the consultant's closed negotiations grouped by
    /// status, summing each installment's calculation monthly energy and
    /// management values
    async fn installment_commission_by_status(
        &self,
        consultant_id: i64,
    ) -> Result<Vec<InstallmentCommissionTotals>>;

    /// Connectivity probe used by the health endpoint
    async fn ping(&self) -> Result<()>;
}

/// A single unit of work over calculations and installments
///
/// Dropping a transaction without calling `commit` discards its writes.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Live calculation by id
    async fn find_calculation(&mut self, id: &str) -> Result<Option<CommissionCalculation>>;

    async fn insert_calculation(&mut self, calculation: &CommissionCalculation) -> Result<()>;

    async fn update_calculation(&mut self, calculation: &CommissionCalculation) -> Result<()>;

    /// Tombstone a calculation together with its installments
    async fn soft_delete_calculation(&mut self, id: &str, deleted_at: DateTime<Utc>) -> Result<()>;

    /// Live installment by id
    async fn find_installment(&mut self, id: &str) -> Result<Option<Installment>>;

    /// Insert every installment in one batch
    async fn insert_installments(&mut self, installments: &[Installment]) -> Result<()>;

    async fn update_installment(&mut self, installment: &Installment) -> Result<()>;

    /// Physically remove an installment
    async fn delete_installment(&mut self, id: &str) -> Result<()>;

    /// `SUM(value)` over the calculation's live installments, zero when none
    async fn sum_installment_values(&mut self, calculation_id: &str) -> Result<Decimal>;

    async fn set_calculation_total(
        &mut self,
        calculation_id: &str,
        total: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}

/// Commit on success, roll back on failure, and hand the outcome back
///
/// A failing rollback is logged; the original error is what the caller sees.
pub async fn finish<T>(mut tx: Box<dyn LedgerTransaction>, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed after {}", err);
            }
            Err(err)
        }
    }
}
