use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Result};

/// One scheduled payable unit ("parcela") of a commission calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: String,
    /// Owning calculation, never changes after creation
    #[serde(rename = "calculoComissaoId")]
    pub calculation_id: String,
    #[serde(rename = "valor")]
    pub value: Decimal,
    /// Informational monthly volume figure
    #[serde(rename = "volumeMensal")]
    pub monthly_volume: Option<Decimal>,
    #[serde(rename = "anexo")]
    pub attachment: Option<String>,
    #[serde(rename = "notaFiscal")]
    pub invoice: Option<String>,
    #[serde(rename = "dataVencimento")]
    pub due_date: DateTime<Utc>,
    pub status: InstallmentStatus,
    /// Present exactly when status is Paid
    #[serde(rename = "dataPagamento")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Installment lifecycle status
///
/// Pending -> NF Sent -> Paid, with Canceled reachable from any non-paid
/// state. Paid is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "NF Enviada")]
    NfSent,
    #[serde(rename = "Pago")]
    Paid,
    #[serde(rename = "Cancelada")]
    Canceled,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::NfSent => "NF Enviada",
            Self::Paid => "Pago",
            Self::Canceled => "Cancelada",
        }
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InstallmentStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "Pendente" => Ok(Self::Pending),
            "NF Enviada" => Ok(Self::NfSent),
            "Pago" => Ok(Self::Paid),
            "Cancelada" => Ok(Self::Canceled),
            "" => Err(AppError::validation("Field 'status' is required")),
            other => Err(AppError::validation(format!(
                "Invalid installment status '{}'. Use 'Pendente', 'NF Enviada', 'Pago' or 'Cancelada'",
                other
            ))),
        }
    }
}

/// Payload for creating a single installment on an existing calculation
#[derive(Debug, Clone, Deserialize)]
pub struct NewInstallment {
    #[serde(rename = "valor")]
    pub value: Decimal,
    #[serde(rename = "dataVencimento")]
    pub due_date: DateTime<Utc>,
    /// Defaults to Pending
    #[serde(default)]
    pub status: Option<InstallmentStatus>,
    #[serde(rename = "anexo", default)]
    pub attachment: Option<String>,
    #[serde(rename = "notaFiscal", default)]
    pub invoice: Option<String>,
    #[serde(rename = "volumeMensal", default)]
    pub monthly_volume: Option<Decimal>,
}

/// Full replacement of an installment's editable fields
#[derive(Debug, Clone, Deserialize)]
pub struct InstallmentUpdate {
    #[serde(rename = "valor")]
    pub value: Decimal,
    #[serde(rename = "dataVencimento")]
    pub due_date: DateTime<Utc>,
    pub status: InstallmentStatus,
    #[serde(rename = "anexo", default)]
    pub attachment: Option<String>,
    #[serde(rename = "notaFiscal", default)]
    pub invoice: Option<String>,
    #[serde(rename = "volumeMensal", default)]
    pub monthly_volume: Option<Decimal>,
}

impl Installment {
    /// Create a pending installment for a calculation
    pub fn new(calculation_id: impl Into<String>, value: Decimal, due_date: DateTime<Utc>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            calculation_id: calculation_id.into(),
            value,
            monthly_volume: None,
            attachment: None,
            invoice: None,
            due_date,
            status: InstallmentStatus::Pending,
            payment_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build an installment from a creation payload.
    ///
    /// An installment created directly as Paid is stamped with `now`.
    pub fn from_request(calculation_id: impl Into<String>, request: NewInstallment, now: DateTime<Utc>) -> Self {
        let mut installment = Self::new(calculation_id, request.value, request.due_date);
        let status = request.status.unwrap_or(InstallmentStatus::Pending);

        installment.status = status;
        installment.payment_date = (status == InstallmentStatus::Paid).then_some(now);
        installment.attachment = non_empty(request.attachment);
        installment.invoice = non_empty(request.invoice);
        installment.monthly_volume = request.monthly_volume;
        installment
    }

    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }

    /// Move to `status`, keeping the payment date coupled to Paid
    ///
    /// # Errors
    /// `IllegalStatusTransition` when leaving Paid. Nothing is modified in that case.
    pub fn transition_to(&mut self, status: InstallmentStatus, now: DateTime<Utc>) -> Result<()> {
        self.ensure_can_become(status)?;

        self.status = status;
        self.payment_date = match status {
            InstallmentStatus::Paid => Some(now),
            _ => None,
        };
        self.updated_at = now;

        Ok(())
    }

    /// Replace every editable field.
    ///
    /// A payment date already on record survives a Paid -> Paid replacement;
    /// otherwise Paid stamps `now` and any other status clears it.
    pub fn replace(&mut self, update: InstallmentUpdate, now: DateTime<Utc>) -> Result<()> {
        self.ensure_can_become(update.status)?;

        self.value = update.value;
        self.due_date = update.due_date;
        self.status = update.status;
        self.attachment = non_empty(update.attachment);
        self.invoice = non_empty(update.invoice);
        self.monthly_volume = update.monthly_volume;
        self.payment_date = match update.status {
            InstallmentStatus::Paid => self.payment_date.or(Some(now)),
            _ => None,
        };
        self.updated_at = now;

        Ok(())
    }

    /// Set or clear (None / empty string) the attachment reference
    pub fn set_attachment(&mut self, attachment: Option<String>, now: DateTime<Utc>) {
        self.attachment = non_empty(attachment);
        self.updated_at = now;
    }

    /// Set or clear (None / empty string) the invoice reference
    pub fn set_invoice(&mut self, invoice: Option<String>, now: DateTime<Utc>) {
        self.invoice = non_empty(invoice);
        self.updated_at = now;
    }

    fn ensure_can_become(&self, status: InstallmentStatus) -> Result<()> {
        if self.is_paid() && status != InstallmentStatus::Paid {
            return Err(AppError::illegal_transition(self.status.as_str(), status.as_str()));
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
