use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::{AppError, Result};
use crate::modules::commissions::models::CommissionCalculation;
use crate::modules::contracts::models::{Contract, InstallmentCommissionTotals};
use crate::modules::installments::models::Installment;
use crate::storage::{LedgerStore, LedgerTransaction, CLOSED_NEGOTIATION_STATUS};

#[derive(Debug, Clone)]
struct StoredInstallment {
    installment: Installment,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct NegotiationLink {
    consultant_id: i64,
    status: String,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    calculations: Vec<CommissionCalculation>,
    installments: Vec<StoredInstallment>,
    negotiations: HashMap<i64, NegotiationLink>,
    contracts: Vec<Contract>,
}

impl LedgerState {
    fn live_calculation(&self, id: &str) -> Option<&CommissionCalculation> {
        self.calculations.iter().find(|c| c.id == id && !c.is_deleted())
    }

    fn live_calculation_mut(&mut self, id: &str) -> Option<&mut CommissionCalculation> {
        self.calculations.iter_mut().find(|c| c.id == id && !c.is_deleted())
    }

    fn live_installments(&self) -> impl Iterator<Item = &Installment> {
        self.installments
            .iter()
            .filter(|stored| stored.deleted_at.is_none())
            .map(|stored| &stored.installment)
    }

    fn live_installment_mut(&mut self, id: &str) -> Option<&mut Installment> {
        self.installments
            .iter_mut()
            .filter(|stored| stored.deleted_at.is_none())
            .map(|stored| &mut stored.installment)
            .find(|installment| installment.id == id)
    }

    fn negotiations_of(&self, consultant_id: i64) -> Vec<i64> {
        self.negotiations
            .iter()
            .filter(|(_, link)| link.consultant_id == consultant_id)
            .map(|(negotiation, _)| *negotiation)
            .collect()
    }

    fn is_closed(&self, negotiation_id: i64) -> bool {
        self.negotiations
            .get(&negotiation_id)
            .map_or(false, |link| link.status == CLOSED_NEGOTIATION_STATUS)
    }

    fn calculations_of(&self, consultant_id: i64) -> Vec<CommissionCalculation> {
        let negotiations = self.negotiations_of(consultant_id);
        self.calculations
            .iter()
            .filter(|c| !c.is_deleted() && negotiations.contains(&c.negotiation_id))
            .cloned()
            .collect()
    }
}

fn by_due_date(mut installments: Vec<Installment>) -> Vec<Installment> {
    installments.sort_by_key(|installment| installment.due_date);
    installments
}

/// Process-local ledger storage
///
/// A transaction holds the state lock from `begin` until it finishes and
/// works on a private copy, so uncommitted writes are never visible and a
/// dropped transaction leaves the state untouched.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record which consultant owns a negotiation, registered as closed
    pub async fn register_negotiation(&self, negotiation_id: i64, consultant_id: i64) {
        self.register_negotiation_with_status(negotiation_id, consultant_id, CLOSED_NEGOTIATION_STATUS)
            .await;
    }

    pub async fn register_negotiation_with_status(
        &self,
        negotiation_id: i64,
        consultant_id: i64,
        status: &str,
    ) {
        self.state.lock().await.negotiations.insert(
            negotiation_id,
            NegotiationLink {
                consultant_id,
                status: status.to_string(),
            },
        );
    }

    /// Make a contract visible to proration reads
    pub async fn insert_contract(&self, contract: Contract) {
        self.state.lock().await.contracts.push(contract);
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();

        Ok(Box::new(InMemoryLedgerTransaction {
            guard: Some(guard),
            working,
        }))
    }

    async fn find_calculation(&self, id: &str) -> Result<Option<CommissionCalculation>> {
        Ok(self.state.lock().await.live_calculation(id).cloned())
    }

    async fn list_calculations(
        &self,
        negotiation_id: i64,
        status: Option<&str>,
    ) -> Result<Vec<CommissionCalculation>> {
        let state = self.state.lock().await;

        Ok(state
            .calculations
            .iter()
            .filter(|c| !c.is_deleted() && c.negotiation_id == negotiation_id)
            .filter(|c| status.map_or(true, |status| c.status == status))
            .cloned()
            .collect())
    }

    async fn list_calculations_by_consultant(
        &self,
        consultant_id: i64,
    ) -> Result<Vec<CommissionCalculation>> {
        Ok(self.state.lock().await.calculations_of(consultant_id))
    }

    async fn find_installment(&self, id: &str) -> Result<Option<Installment>> {
        let state = self.state.lock().await;
        let found = state.live_installments().find(|i| i.id == id).cloned();
        Ok(found)
    }

    async fn list_installments(&self, calculation_id: &str) -> Result<Vec<Installment>> {
        let state = self.state.lock().await;

        Ok(by_due_date(
            state
                .live_installments()
                .filter(|i| i.calculation_id == calculation_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_installments_by_consultant(&self, consultant_id: i64) -> Result<Vec<Installment>> {
        let state = self.state.lock().await;
        let calculation_ids: Vec<String> = state
            .calculations_of(consultant_id)
            .into_iter()
            .map(|c| c.id)
            .collect();

        Ok(by_due_date(
            state
                .live_installments()
                .filter(|i| calculation_ids.contains(&i.calculation_id))
                .cloned()
                .collect(),
        ))
    }

    async fn list_contracts_by_consultant(&self, consultant_id: i64) -> Result<Vec<Contract>> {
        let state = self.state.lock().await;
        let negotiations = state.negotiations_of(consultant_id);

        Ok(state
            .contracts
            .iter()
            .filter(|c| negotiations.contains(&c.negotiation_id))
            .cloned()
            .collect())
    }

    async fn installment_commission_by_status(
        &self,
        consultant_id: i64,
    ) -> Result<Vec<InstallmentCommissionTotals>> {
        let state = self.state.lock().await;
        let mut grouped: BTreeMap<&'static str, InstallmentCommissionTotals> = BTreeMap::new();

        for calculation in state
            .calculations_of(consultant_id)
            .iter()
            .filter(|c| state.is_closed(c.negotiation_id))
        {
            for installment in state
                .live_installments()
                .filter(|i| i.calculation_id == calculation.id)
            {
                let totals = grouped
                    .entry(installment.status.as_str())
                    .or_insert_with(|| InstallmentCommissionTotals {
                        status: installment.status,
                        energy: Decimal::ZERO,
                        management: Decimal::ZERO,
                    });
                totals.energy += calculation.monthly_energy_value;
                totals.management += calculation.monthly_management_value;
            }
        }

        let totals = grouped.into_values().collect();
        Ok(totals)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Private working copy plus the lock that serialises writers
pub struct InMemoryLedgerTransaction {
    guard: Option<OwnedMutexGuard<LedgerState>>,
    working: LedgerState,
}

impl InMemoryLedgerTransaction {
    fn state(&mut self) -> Result<&mut LedgerState> {
        if self.guard.is_none() {
            return Err(AppError::internal("Transaction already finished"));
        }
        Ok(&mut self.working)
    }
}

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    async fn find_calculation(&mut self, id: &str) -> Result<Option<CommissionCalculation>> {
        Ok(self.state()?.live_calculation(id).cloned())
    }

    async fn insert_calculation(&mut self, calculation: &CommissionCalculation) -> Result<()> {
        let state = self.state()?;
        if state.calculations.iter().any(|c| c.id == calculation.id) {
            return Err(AppError::internal(format!(
                "Duplicate commission calculation id {}",
                calculation.id
            )));
        }
        state.calculations.push(calculation.clone());
        Ok(())
    }

    async fn update_calculation(&mut self, calculation: &CommissionCalculation) -> Result<()> {
        let stored = self
            .state()?
            .live_calculation_mut(&calculation.id)
            .ok_or_else(|| AppError::not_found(format!("Commission calculation {}", calculation.id)))?;
        *stored = calculation.clone();
        Ok(())
    }

    async fn soft_delete_calculation(&mut self, id: &str, deleted_at: DateTime<Utc>) -> Result<()> {
        let state = self.state()?;
        let calculation = state
            .live_calculation_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Commission calculation {}", id)))?;
        calculation.deleted_at = Some(deleted_at);

        for stored in state
            .installments
            .iter_mut()
            .filter(|s| s.installment.calculation_id == id && s.deleted_at.is_none())
        {
            stored.deleted_at = Some(deleted_at);
        }
        Ok(())
    }

    async fn find_installment(&mut self, id: &str) -> Result<Option<Installment>> {
        Ok(self.state()?.live_installments().find(|i| i.id == id).cloned())
    }

    async fn insert_installments(&mut self, installments: &[Installment]) -> Result<()> {
        let state = self.state()?;
        state
            .installments
            .extend(installments.iter().cloned().map(|installment| StoredInstallment {
                installment,
                deleted_at: None,
            }));
        Ok(())
    }

    async fn update_installment(&mut self, installment: &Installment) -> Result<()> {
        let stored = self
            .state()?
            .live_installment_mut(&installment.id)
            .ok_or_else(|| AppError::not_found(format!("Installment {}", installment.id)))?;
        *stored = installment.clone();
        Ok(())
    }

    async fn delete_installment(&mut self, id: &str) -> Result<()> {
        let state = self.state()?;
        let before = state.installments.len();
        state.installments.retain(|s| s.installment.id != id);

        if state.installments.len() == before {
            return Err(AppError::not_found(format!("Installment {}", id)));
        }
        Ok(())
    }

    async fn sum_installment_values(&mut self, calculation_id: &str) -> Result<Decimal> {
        Ok(self
            .state()?
            .live_installments()
            .filter(|i| i.calculation_id == calculation_id)
            .map(|i| i.value)
            .sum())
    }

    async fn set_calculation_total(
        &mut self,
        calculation_id: &str,
        total: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let calculation = self
            .state()?
            .live_calculation_mut(calculation_id)
            .ok_or_else(|| AppError::not_found(format!("Commission calculation {}", calculation_id)))?;
        calculation.total_receivable = total;
        calculation.updated_at = updated_at;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let mut guard = self
            .guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already finished"))?;
        *guard = std::mem::take(&mut self.working);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.guard = None;
        self.working = LedgerState::default();
        Ok(())
    }
}
