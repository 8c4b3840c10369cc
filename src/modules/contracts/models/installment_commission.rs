use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::modules::installments::models::InstallmentStatus;

/// Monthly energy and management values summed over the installments of one
/// status; each installment contributes its calculation's monthly figures
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentCommissionTotals {
    pub status: InstallmentStatus,
    pub energy: Decimal,
    pub management: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedCommission {
    #[serde(rename = "energiaRecebida")]
    pub energy: Decimal,
    #[serde(rename = "gestaoRecebida")]
    pub management: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivableCommission {
    #[serde(rename = "energiaAReceber")]
    pub energy: Decimal,
    #[serde(rename = "gestaoAReceber")]
    pub management: Decimal,
}

/// Energy and management commission split by installment status
///
/// Paid installments count as received and pending ones as receivable.
/// Installments with an invoice sent or canceled are left out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentCommissionSummary {
    #[serde(rename = "comissoesRecebidas")]
    pub received: ReceivedCommission,
    #[serde(rename = "comissoesAReceber")]
    pub receivable: ReceivableCommission,
}

impl InstallmentCommissionSummary {
    /// Fold per-status totals into the received and receivable sides
    pub fn from_status_totals(totals: &[InstallmentCommissionTotals]) -> Self {
        let mut summary = Self::default();

        for line in totals {
            match line.status {
                InstallmentStatus::Paid => {
                    summary.received.energy += line.energy;
                    summary.received.management += line.management;
                }
                InstallmentStatus::Pending => {
                    summary.receivable.energy += line.energy;
                    summary.receivable.management += line.management;
                }
                InstallmentStatus::NfSent | InstallmentStatus::Canceled => {}
            }
        }

        summary
    }
}
