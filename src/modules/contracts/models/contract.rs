use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supply contract as consumed by commission proration
///
/// Contracts are owned elsewhere; the ledger only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    #[serde(rename = "negociacaoId")]
    pub negotiation_id: i64,
    #[serde(rename = "valor")]
    pub value: Decimal,
    #[serde(rename = "inicioSuprimento")]
    pub supply_start: DateTime<Utc>,
    #[serde(rename = "fimSuprimento")]
    pub supply_end: DateTime<Utc>,
    /// Commission settled in full at supply start instead of at supply end
    #[serde(rename = "valorIntegral")]
    pub full_value: bool,
    pub fee: bool,
    #[serde(rename = "feePercent")]
    pub fee_fraction: Decimal,
    #[serde(rename = "unipay")]
    pub one_time_payment: bool,
    #[serde(rename = "unipayPercent")]
    pub one_time_fraction: Decimal,
    #[serde(rename = "monPay")]
    pub monthly_payment: bool,
    /// Agreed monthly amount, informational only
    #[serde(rename = "monthPay")]
    pub monthly_amount: Decimal,
}

impl Contract {
    /// Whether supply has started at `now` (inclusive)
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.supply_start
    }

    /// Whether supply has ended at `now` (inclusive)
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.supply_end
    }
}
