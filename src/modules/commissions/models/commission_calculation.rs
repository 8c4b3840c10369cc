use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::dates::{parse_wire_date, zero_date};
use crate::core::{AppError, DateParsing, Result};
use crate::modules::commissions::models::{PaymentMode, ScheduleParams};
use crate::modules::installments::models::Installment;

/// Workflow status given to every new calculation
pub const DEFAULT_CALCULATION_STATUS: &str = "Pendente";

/// Commission terms agreed for a negotiation
///
/// `total_receivable` mirrors the sum of the calculation's live installments
/// and is rewritten after every installment mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionCalculation {
    pub id: String,
    #[serde(rename = "negociacaoId")]
    pub negotiation_id: i64,
    /// Free-text workflow label, unrelated to installment statuses
    pub status: String,
    #[serde(rename = "modalidadeRecebimento")]
    pub receipt_modality: String,
    /// Fee fraction
    pub fee: Decimal,
    /// Energy volume
    pub volume: Decimal,
    #[serde(rename = "valorGestaoMensal")]
    pub monthly_management_value: Decimal,
    #[serde(rename = "energiaMensal")]
    pub monthly_energy_value: Decimal,
    #[serde(rename = "possuiComissaoGestao")]
    pub has_management_commission: bool,
    #[serde(rename = "totalReceber")]
    pub total_receivable: Decimal,
    #[serde(rename = "inicioContrato")]
    pub contract_start: DateTime<Utc>,
    #[serde(rename = "terminioContrato")]
    pub contract_end: DateTime<Utc>,
    #[serde(rename = "modoPagamento")]
    pub payment_mode: PaymentMode,
    #[serde(rename = "qtdParcelas")]
    pub installment_count: u32,
    #[serde(rename = "dataGeracao")]
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deletedAt", skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Business fields fixed when a calculation is created
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationTerms {
    pub receipt_modality: String,
    pub fee: Decimal,
    pub volume: Decimal,
    pub monthly_management_value: Decimal,
    pub monthly_energy_value: Decimal,
    pub has_management_commission: bool,
    pub contract_start: DateTime<Utc>,
    pub contract_end: DateTime<Utc>,
    pub payment_mode: PaymentMode,
    pub installment_count: u32,
    pub generated_at: DateTime<Utc>,
}

impl CommissionCalculation {
    /// Create a calculation with a zero total; the total is derived once
    /// installments exist
    pub fn new(negotiation_id: i64, terms: CalculationTerms) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            negotiation_id,
            status: DEFAULT_CALCULATION_STATUS.to_string(),
            receipt_modality: terms.receipt_modality,
            fee: terms.fee,
            volume: terms.volume,
            monthly_management_value: terms.monthly_management_value,
            monthly_energy_value: terms.monthly_energy_value,
            has_management_commission: terms.has_management_commission,
            total_receivable: Decimal::ZERO,
            contract_start: terms.contract_start,
            contract_end: terms.contract_end,
            payment_mode: terms.payment_mode,
            installment_count: terms.installment_count,
            generated_at: terms.generated_at,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Apply a bulk update. The total written here only lasts until the next
    /// installment mutation.
    pub fn apply_update(&mut self, update: CalculationUpdate, now: DateTime<Utc>) {
        self.status = update.status;
        self.receipt_modality = update.receipt_modality;
        self.fee = update.fee;
        self.contract_start = update.contract_start;
        self.contract_end = update.contract_end;
        self.volume = update.volume;
        self.has_management_commission = update.has_management_commission;
        self.total_receivable = update.total_receivable;
        self.monthly_management_value = update.monthly_management_value;
        self.monthly_energy_value = update.monthly_energy_value;
        self.updated_at = now;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Calculation creation payload as received on the wire
///
/// Missing fields decode to zero values, matching the existing clients.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateCalculationRequest {
    #[serde(rename = "modalidadeRecebimento")]
    pub receipt_modality: String,
    pub fee: Decimal,
    pub volume: Decimal,
    #[serde(rename = "valorGestaoMensal")]
    pub monthly_management_value: Decimal,
    #[serde(rename = "energiaMensal")]
    pub monthly_energy_value: Decimal,
    #[serde(rename = "possuiComissaoGestao")]
    pub has_management_commission: bool,
    /// Accepted for compatibility and ignored; the total always comes from
    /// the generated installments
    #[serde(rename = "totalReceber")]
    pub total_receivable: Option<Decimal>,

    #[serde(rename = "modoPagamento")]
    pub payment_mode: String,
    #[serde(rename = "valorPagamentoInicial")]
    pub initial_payment_value: Decimal,
    #[serde(rename = "dataPagamentoInicial")]
    pub initial_payment_date: String,
    #[serde(rename = "valorPagamentoFinal")]
    pub final_payment_value: Decimal,
    #[serde(rename = "dataPagamentoFinal")]
    pub final_payment_date: String,
    #[serde(rename = "valorPrimeiraParcela")]
    pub first_installment_value: Decimal,
    #[serde(rename = "dataVencimentoPrimeiraParcela")]
    pub first_installment_due_date: String,
    #[serde(rename = "valorParcelaMensal")]
    pub monthly_installment_value: Decimal,
    #[serde(rename = "dataInicioParcelas")]
    pub installments_start_date: String,
    #[serde(rename = "qtdParcelas")]
    pub installment_count: u32,

    #[serde(rename = "inicioContrato")]
    pub contract_start: String,
    #[serde(rename = "terminioContrato")]
    pub contract_end: String,
    #[serde(rename = "dataGeracao")]
    pub generated_at: String,
}

impl CreateCalculationRequest {
    /// Validate the payment mode and parse every wire date
    ///
    /// # Errors
    /// `InvalidPaymentMode` for an unrecognised mode; `Validation` for an
    /// installment count above `MAX_INSTALLMENTS` or a malformed non-empty
    /// date under the strict policy
    pub fn into_parts(self, policy: DateParsing) -> Result<(CalculationTerms, ScheduleParams)> {
        let payment_mode: PaymentMode = self.payment_mode.parse()?;
        let date = |field: &str, raw: &str| parse_wire_date(field, raw, policy);

        let terms = CalculationTerms {
            receipt_modality: self.receipt_modality,
            fee: self.fee,
            volume: self.volume,
            monthly_management_value: self.monthly_management_value,
            monthly_energy_value: self.monthly_energy_value,
            has_management_commission: self.has_management_commission,
            contract_start: date("inicioContrato", &self.contract_start)?,
            contract_end: date("terminioContrato", &self.contract_end)?,
            payment_mode,
            installment_count: self.installment_count,
            generated_at: date("dataGeracao", &self.generated_at)?,
        };

        let params = ScheduleParams {
            initial_payment_value: self.initial_payment_value,
            initial_payment_date: date("dataPagamentoInicial", &self.initial_payment_date)?,
            final_payment_value: self.final_payment_value,
            final_payment_date: date("dataPagamentoFinal", &self.final_payment_date)?,
            first_installment_value: self.first_installment_value,
            first_installment_due_date: date(
                "dataVencimentoPrimeiraParcela",
                &self.first_installment_due_date,
            )?,
            monthly_installment_value: self.monthly_installment_value,
            installments_start_date: date("dataInicioParcelas", &self.installments_start_date)?,
            installment_count: self.installment_count,
        };
        params.validate()?;

        Ok((terms, params))
    }
}

/// Bulk update of a calculation's editable fields
#[derive(Debug, Clone, Deserialize)]
pub struct CalculationUpdate {
    #[serde(default)]
    pub status: String,
    #[serde(rename = "modalidadeRecebimento", default)]
    pub receipt_modality: String,
    #[serde(default)]
    pub fee: Decimal,
    #[serde(rename = "inicioContrato", default = "zero_date")]
    pub contract_start: DateTime<Utc>,
    #[serde(rename = "terminioContrato", default = "zero_date")]
    pub contract_end: DateTime<Utc>,
    #[serde(default)]
    pub volume: Decimal,
    #[serde(rename = "possuiComissaoGestao", default)]
    pub has_management_commission: bool,
    #[serde(rename = "totalReceber", default)]
    pub total_receivable: Decimal,
    #[serde(rename = "valorGestaoMensal", default)]
    pub monthly_management_value: Decimal,
    #[serde(rename = "energiaMensal", default)]
    pub monthly_energy_value: Decimal,
}

/// Workflow status change, optionally overriding the total
#[derive(Debug, Clone, Deserialize)]
pub struct CalculationStatusUpdate {
    #[serde(default)]
    pub status: String,
    #[serde(rename = "totalReceber", default)]
    pub total_receivable: Option<Decimal>,
}

impl CalculationStatusUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.status.trim().is_empty() {
            return Err(AppError::validation("Field 'status' is required"));
        }
        Ok(())
    }
}

/// A calculation together with its installments, ordered by due date
#[derive(Debug, Clone, Serialize)]
pub struct CalculationWithInstallments {
    #[serde(flatten)]
    pub calculation: CommissionCalculation,
    #[serde(rename = "parcelas")]
    pub installments: Vec<Installment>,
}
