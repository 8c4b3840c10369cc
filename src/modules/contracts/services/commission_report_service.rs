use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::Result;
use crate::modules::contracts::models::{
    CommissionSplit, CommissionSummary, InstallmentCommissionSummary,
};
use crate::modules::contracts::services::{ContractProrator, FeeStrategy};
use crate::storage::LedgerStore;

/// Read-time commission reporting over a consultant's contracts
///
/// Nothing here writes; figures are recomputed against `now` on every call.
pub struct CommissionReportService {
    store: Arc<dyn LedgerStore>,
    prorator: ContractProrator,
}

impl CommissionReportService {
    pub fn new(store: Arc<dyn LedgerStore>, fee_strategy: FeeStrategy) -> Self {
        Self {
            store,
            prorator: ContractProrator::new(fee_strategy),
        }
    }

    /// Received vs receivable across every contract of a consultant
    pub async fn totals(&self, consultant_id: i64, now: DateTime<Utc>) -> Result<CommissionSplit> {
        let contracts = self.store.list_contracts_by_consultant(consultant_id).await?;
        let totals = self.prorator.aggregate(&contracts, now).total();

        debug!(
            consultant_id,
            contracts = contracts.len(),
            received = %totals.received,
            receivable = %totals.receivable,
            "Commission totals computed"
        );

        Ok(totals)
    }

    /// Commission dashboard for a consultant
    ///
    /// # Returns
    /// * `Result<CommissionSummary>` - Contract count, component proration and
    ///   the full-value settlement split
    pub async fn summary(&self, consultant_id: i64, now: DateTime<Utc>) -> Result<CommissionSummary> {
        let contracts = self.store.list_contracts_by_consultant(consultant_id).await?;

        let breakdown = self.prorator.aggregate(&contracts, now);
        let settlement: CommissionSplit = contracts
            .iter()
            .map(|contract| ContractProrator::settlement_split(contract, now))
            .sum();

        Ok(CommissionSummary {
            consultant_id,
            contract_count: contracts.len(),
            totals: breakdown.total(),
            breakdown,
            settled: settlement.received,
            outstanding: settlement.receivable,
        })
    }

    /// Energy and management commission of a consultant's closed negotiations,
    /// split by installment status
    pub async fn installment_summary(&self, consultant_id: i64) -> Result<InstallmentCommissionSummary> {
        let totals = self
            .store
            .installment_commission_by_status(consultant_id)
            .await?;
        let summary = InstallmentCommissionSummary::from_status_totals(&totals);

        debug!(
            consultant_id,
            received_energy = %summary.received.energy,
            receivable_energy = %summary.receivable.energy,
            "Installment commission summary computed"
        );

        Ok(summary)
    }
}
