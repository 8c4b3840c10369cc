use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Strategy used to expand a calculation into installments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Initial and final payment, two installments
    #[serde(rename = "dividirInicialEmDuas")]
    SplitInitialInTwo,
    /// Optional first installment followed by equal monthly installments
    #[serde(rename = "pagamentoInicialEParcelas")]
    InitialPaymentAndInstallments,
    /// Equal monthly installments only
    #[serde(rename = "parcelasIguais")]
    EqualInstallments,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SplitInitialInTwo => "dividirInicialEmDuas",
            Self::InitialPaymentAndInstallments => "pagamentoInicialEParcelas",
            Self::EqualInstallments => "parcelasIguais",
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "dividirInicialEmDuas" => Ok(Self::SplitInitialInTwo),
            "pagamentoInicialEParcelas" => Ok(Self::InitialPaymentAndInstallments),
            "parcelasIguais" => Ok(Self::EqualInstallments),
            other => Err(AppError::InvalidPaymentMode(other.to_string())),
        }
    }
}

/// Upper bound on `qtdParcelas`, thirty years of monthly installments
pub const MAX_INSTALLMENTS: u32 = 360;

/// Mode-specific schedule parameters, already parsed
///
/// Each mode reads only the fields it needs; the rest are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleParams {
    pub initial_payment_value: Decimal,
    pub initial_payment_date: DateTime<Utc>,
    pub final_payment_value: Decimal,
    pub final_payment_date: DateTime<Utc>,
    pub first_installment_value: Decimal,
    pub first_installment_due_date: DateTime<Utc>,
    pub monthly_installment_value: Decimal,
    pub installments_start_date: DateTime<Utc>,
    pub installment_count: u32,
}

impl ScheduleParams {
    /// Reject installment counts above `MAX_INSTALLMENTS`
    pub fn validate(&self) -> Result<()> {
        if self.installment_count > MAX_INSTALLMENTS {
            return Err(AppError::validation(format!(
                "Field 'qtdParcelas' must be at most {}, got {}",
                MAX_INSTALLMENTS, self.installment_count
            )));
        }
        Ok(())
    }
}
