// Installment lifecycle over the ledger store
//
// Every mutation runs in one transaction and ends with a total recompute of
// the owning calculation. The recompute is what produces `TotalSynced`, and
// only `TotalSynced` outcomes can be committed through `commit_synced`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::core::{AppError, Result};
use crate::modules::installments::models::{
    Installment, InstallmentStatus, InstallmentUpdate, NewInstallment,
};
use crate::storage::{self, LedgerStore, LedgerTransaction};

/// Outcome of a mutation whose calculation total has been recomputed in the
/// same transaction
#[must_use]
#[derive(Debug)]
pub struct TotalSynced<T> {
    value: T,
    total: Decimal,
}

impl<T> TotalSynced<T> {
    /// Total written back to the calculation
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TotalSynced<U> {
        TotalSynced {
            value: f(self.value),
            total: self.total,
        }
    }
}

/// Recompute `total_receivable` as the sum of the calculation's live
/// installments and write it back inside `tx`
pub async fn sync_total<T>(
    tx: &mut dyn LedgerTransaction,
    calculation_id: &str,
    value: T,
    now: DateTime<Utc>,
) -> Result<TotalSynced<T>> {
    let total = tx.sum_installment_values(calculation_id).await?;
    tx.set_calculation_total(calculation_id, total, now).await?;

    debug!(calculation_id, total = %total, "Commission total recomputed");

    Ok(TotalSynced { value, total })
}

/// Commit a synced outcome, or roll back on error
pub async fn commit_synced<T>(
    tx: Box<dyn LedgerTransaction>,
    outcome: Result<TotalSynced<T>>,
) -> Result<T> {
    storage::finish(tx, outcome).await.map(TotalSynced::into_inner)
}

/// Service for installment business logic
pub struct InstallmentService {
    store: Arc<dyn LedgerStore>,
}

impl InstallmentService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Add one installment to an existing calculation
    ///
    /// # Arguments
    /// * `calculation_id` - Owning calculation, must be live
    /// * `request` - Installment fields; status defaults to Pending
    /// * `now` - Stamp used for a payment date when created as Paid
    ///
    /// # Returns
    /// * `Result<Installment>` - The persisted installment
    pub async fn create_for_calculation(
        &self,
        calculation_id: &str,
        request: NewInstallment,
        now: DateTime<Utc>,
    ) -> Result<Installment> {
        let mut tx = self.store.begin().await?;
        let outcome = Self::create_in(tx.as_mut(), calculation_id, request, now).await;
        let installment = commit_synced(tx, outcome).await?;

        info!(
            installment_id = installment.id.as_str(),
            calculation_id,
            status = %installment.status,
            "Installment created"
        );

        Ok(installment)
    }

    async fn create_in(
        tx: &mut dyn LedgerTransaction,
        calculation_id: &str,
        request: NewInstallment,
        now: DateTime<Utc>,
    ) -> Result<TotalSynced<Installment>> {
        if tx.find_calculation(calculation_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Commission calculation {}",
                calculation_id
            )));
        }

        let installment = Installment::from_request(calculation_id, request, now);
        tx.insert_installments(std::slice::from_ref(&installment)).await?;

        sync_total(tx, calculation_id, installment, now).await
    }

    /// Installments of a calculation ordered by due date
    pub async fn list(&self, calculation_id: &str) -> Result<Vec<Installment>> {
        if self.store.find_calculation(calculation_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Commission calculation {}",
                calculation_id
            )));
        }

        self.store.list_installments(calculation_id).await
    }

    pub async fn get(&self, id: &str) -> Result<Installment> {
        self.store
            .find_installment(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Installment {}", id)))
    }

    /// Installments across every calculation of a consultant
    pub async fn list_by_consultant(&self, consultant_id: i64) -> Result<Vec<Installment>> {
        self.store.list_installments_by_consultant(consultant_id).await
    }

    /// Move an installment to `status`
    ///
    /// # Errors
    /// `IllegalStatusTransition` when the installment is already Paid and
    /// `status` is anything else; nothing is written in that case.
    pub async fn update_status(
        &self,
        id: &str,
        status: InstallmentStatus,
        now: DateTime<Utc>,
    ) -> Result<Installment> {
        let installment = self
            .mutate(id, now, |installment| installment.transition_to(status, now))
            .await?;

        info!(installment_id = id, status = %status, "Installment status updated");
        Ok(installment)
    }

    /// Replace every editable field of an installment
    pub async fn update(
        &self,
        id: &str,
        update: InstallmentUpdate,
        now: DateTime<Utc>,
    ) -> Result<Installment> {
        let installment = self
            .mutate(id, now, |installment| installment.replace(update, now))
            .await?;

        info!(installment_id = id, value = %installment.value, "Installment updated");
        Ok(installment)
    }

    /// Set the attachment reference, or clear it with None / ""
    pub async fn set_attachment(
        &self,
        id: &str,
        attachment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Installment> {
        self.mutate(id, now, |installment| {
            installment.set_attachment(attachment, now);
            Ok(())
        })
        .await
    }

    /// Set the invoice reference, or clear it with None / ""
    pub async fn set_invoice(
        &self,
        id: &str,
        invoice: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Installment> {
        self.mutate(id, now, |installment| {
            installment.set_invoice(invoice, now);
            Ok(())
        })
        .await
    }

    /// Hard delete an installment and recompute its former parent's total
    pub async fn delete(&self, id: &str, now: DateTime<Utc>) -> Result<()> {
        let mut tx = self.store.begin().await?;
        let outcome = Self::delete_in(tx.as_mut(), id, now).await;
        let calculation_id = commit_synced(tx, outcome).await?;

        info!(installment_id = id, calculation_id = calculation_id.as_str(), "Installment deleted");
        Ok(())
    }

    async fn delete_in(
        tx: &mut dyn LedgerTransaction,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<TotalSynced<String>> {
        let installment = tx
            .find_installment(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Installment {}", id)))?;

        tx.delete_installment(id).await?;

        let calculation_id = installment.calculation_id;
        let synced = sync_total(tx, &calculation_id, (), now).await?;
        Ok(synced.map(|()| calculation_id))
    }

    async fn mutate<F>(&self, id: &str, now: DateTime<Utc>, apply: F) -> Result<Installment>
    where
        F: FnOnce(&mut Installment) -> Result<()>,
    {
        let mut tx = self.store.begin().await?;
        let outcome = Self::mutate_in(tx.as_mut(), id, now, apply).await;
        commit_synced(tx, outcome).await
    }

    async fn mutate_in<F>(
        tx: &mut dyn LedgerTransaction,
        id: &str,
        now: DateTime<Utc>,
        apply: F,
    ) -> Result<TotalSynced<Installment>>
    where
        F: FnOnce(&mut Installment) -> Result<()>,
    {
        let mut installment = tx
            .find_installment(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Installment {}", id)))?;

        apply(&mut installment)?;
        tx.update_installment(&installment).await?;

        let calculation_id = installment.calculation_id.clone();
        sync_total(tx, &calculation_id, installment, now).await
    }
}
