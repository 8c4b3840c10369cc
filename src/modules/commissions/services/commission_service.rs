// Commission calculation workflow
//
// Creation validates the payment mode, builds the schedule, and persists the
// calculation plus its installments in one transaction whose last step is
// the total recompute.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::core::{AppError, DateParsing, Result};
use crate::modules::commissions::models::{
    CalculationStatusUpdate, CalculationUpdate, CalculationWithInstallments, CommissionCalculation,
    CreateCalculationRequest,
};
use crate::modules::commissions::services::ScheduleBuilder;
use crate::modules::installments::models::Installment;
use crate::modules::installments::services::installment_service::{commit_synced, sync_total};
use crate::modules::installments::services::TotalSynced;
use crate::storage::{self, LedgerStore, LedgerTransaction};

/// Service for commission calculation business logic
pub struct CommissionService {
    store: Arc<dyn LedgerStore>,
    date_parsing: DateParsing,
}

impl CommissionService {
    pub fn new(store: Arc<dyn LedgerStore>, date_parsing: DateParsing) -> Self {
        Self { store, date_parsing }
    }

    /// Create a calculation for a negotiation and expand its schedule
    ///
    /// # Arguments
    /// * `negotiation_id` - Positive negotiation id
    /// * `request` - Wire payload with the payment mode and its parameters
    ///
    /// # Returns
    /// * `Result<CalculationWithInstallments>` - Calculation whose total is the
    ///   sum of the generated installments
    ///
    /// # Errors
    /// `InvalidPaymentMode` before anything is written; storage failures roll
    /// back the calculation together with its installments.
    pub async fn create(
        &self,
        negotiation_id: i64,
        request: CreateCalculationRequest,
    ) -> Result<CalculationWithInstallments> {
        if negotiation_id <= 0 {
            return Err(AppError::validation("Negotiation id must be positive"));
        }

        let (terms, params) = request.into_parts(self.date_parsing)?;
        let calculation = CommissionCalculation::new(negotiation_id, terms);
        let schedule = ScheduleBuilder::build(&calculation.id, calculation.payment_mode, &params)?;

        let mut tx = self.store.begin().await?;
        let outcome = Self::create_in(tx.as_mut(), calculation, schedule, Utc::now()).await;
        let created = commit_synced(tx, outcome).await?;

        info!(
            calculation_id = created.calculation.id.as_str(),
            negotiation_id,
            payment_mode = %created.calculation.payment_mode,
            installments_created = created.installments.len(),
            total_receivable = %created.calculation.total_receivable,
            "Commission calculation created"
        );

        Ok(created)
    }

    async fn create_in(
        tx: &mut dyn LedgerTransaction,
        mut calculation: CommissionCalculation,
        mut schedule: Vec<Installment>,
        now: DateTime<Utc>,
    ) -> Result<TotalSynced<CalculationWithInstallments>> {
        tx.insert_calculation(&calculation).await?;
        tx.insert_installments(&schedule).await?;

        let id = calculation.id.clone();
        let synced = sync_total(tx, &id, (), now).await?;
        let total = synced.total();

        Ok(synced.map(|()| {
            calculation.total_receivable = total;
            calculation.updated_at = now;
            schedule.sort_by_key(|installment| installment.due_date);

            CalculationWithInstallments {
                calculation,
                installments: schedule,
            }
        }))
    }

    /// Calculations of a negotiation, optionally filtered by exact status
    pub async fn list(
        &self,
        negotiation_id: i64,
        status: Option<&str>,
    ) -> Result<Vec<CommissionCalculation>> {
        self.store.list_calculations(negotiation_id, status).await
    }

    /// A live calculation with its installments ordered by due date
    pub async fn get(&self, id: &str) -> Result<CalculationWithInstallments> {
        let calculation = self.find(id).await?;
        let installments = self.store.list_installments(id).await?;

        Ok(CalculationWithInstallments {
            calculation,
            installments,
        })
    }

    /// Like `get`, but a calculation of another negotiation is reported missing
    pub async fn get_for_negotiation(
        &self,
        negotiation_id: i64,
        id: &str,
    ) -> Result<CalculationWithInstallments> {
        let calculation = owned_by(self.find(id).await?, negotiation_id)?;
        let installments = self.store.list_installments(id).await?;

        Ok(CalculationWithInstallments {
            calculation,
            installments,
        })
    }

    /// Calculations of every negotiation owned by a consultant, each with its
    /// installments
    pub async fn list_by_consultant(
        &self,
        consultant_id: i64,
    ) -> Result<Vec<CalculationWithInstallments>> {
        let calculations = self
            .store
            .list_calculations_by_consultant(consultant_id)
            .await?;

        let mut result = Vec::with_capacity(calculations.len());
        for calculation in calculations {
            let installments = self.store.list_installments(&calculation.id).await?;
            result.push(CalculationWithInstallments {
                calculation,
                installments,
            });
        }

        Ok(result)
    }

    /// Bulk update of the editable fields
    ///
    /// A total written here holds only until the next installment mutation.
    /// A calculation of another negotiation is reported missing.
    pub async fn update(
        &self,
        negotiation_id: i64,
        id: &str,
        update: CalculationUpdate,
        now: DateTime<Utc>,
    ) -> Result<CommissionCalculation> {
        let mut tx = self.store.begin().await?;
        let outcome = async {
            let mut calculation = Self::find_in(tx.as_mut(), negotiation_id, id).await?;
            calculation.apply_update(update, now);
            tx.update_calculation(&calculation).await?;
            Ok::<_, AppError>(calculation)
        }
        .await;
        let calculation = storage::finish(tx, outcome).await?;

        info!(calculation_id = id, status = calculation.status.as_str(), "Commission calculation updated");
        Ok(calculation)
    }

    /// Set the workflow status, optionally overriding the total
    pub async fn update_status(
        &self,
        negotiation_id: i64,
        id: &str,
        update: CalculationStatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<CommissionCalculation> {
        update.validate()?;

        let mut tx = self.store.begin().await?;
        let outcome = async {
            let mut calculation = Self::find_in(tx.as_mut(), negotiation_id, id).await?;
            calculation.status = update.status;
            if let Some(total) = update.total_receivable {
                calculation.total_receivable = total;
            }
            calculation.updated_at = now;
            tx.update_calculation(&calculation).await?;
            Ok::<_, AppError>(calculation)
        }
        .await;
        let calculation = storage::finish(tx, outcome).await?;

        info!(
            calculation_id = id,
            status = calculation.status.as_str(),
            total_receivable = %calculation.total_receivable,
            "Commission calculation status updated"
        );
        Ok(calculation)
    }

    /// Tombstone a calculation together with its installments
    pub async fn delete(&self, negotiation_id: i64, id: &str, now: DateTime<Utc>) -> Result<()> {
        let mut tx = self.store.begin().await?;
        let outcome = async {
            Self::find_in(tx.as_mut(), negotiation_id, id).await?;
            tx.soft_delete_calculation(id, now).await
        }
        .await;
        storage::finish(tx, outcome).await?;

        info!(calculation_id = id, "Commission calculation deleted");
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<CommissionCalculation> {
        self.store
            .find_calculation(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Commission calculation {}", id)))
    }

    async fn find_in(
        tx: &mut dyn LedgerTransaction,
        negotiation_id: i64,
        id: &str,
    ) -> Result<CommissionCalculation> {
        let calculation = tx
            .find_calculation(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Commission calculation {}", id)))?;
        owned_by(calculation, negotiation_id)
    }
}

/// NotFound unless the calculation belongs to `negotiation_id`
fn owned_by(calculation: CommissionCalculation, negotiation_id: i64) -> Result<CommissionCalculation> {
    if calculation.negotiation_id != negotiation_id {
        return Err(AppError::not_found(format!(
            "Commission calculation {} in negotiation {}",
            calculation.id, negotiation_id
        )));
    }
    Ok(calculation)
}
