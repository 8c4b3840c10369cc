use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlConnection;

use crate::core::Result;
use crate::modules::contracts::models::Contract;

/// Read-only access to contracts owned by the negotiation subsystem
pub struct ContractRepository;

impl ContractRepository {
    /// Contracts reachable through a consultant's negotiations
    pub async fn find_by_consultant(conn: &mut MySqlConnection, consultant_id: i64) -> Result<Vec<Contract>> {
        let rows = sqlx::query_as::<_, ContractRow>(
            r#"
            SELECT
                c.id, c.negotiation_id, c.value, c.supply_start, c.supply_end,
                c.full_value, c.fee, c.fee_percent, c.unipay, c.unipay_percent,
                c.mon_pay, c.month_pay
            FROM contracts c
            JOIN negotiations n ON n.id = c.negotiation_id
            WHERE n.consultant_id = ? AND c.deleted_at IS NULL
            ORDER BY c.id ASC
            "#,
        )
        .bind(consultant_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(Contract::from).collect())
    }
}

#[derive(sqlx::FromRow)]
struct ContractRow {
    id: i64,
    negotiation_id: i64,
    value: Decimal,
    supply_start: DateTime<Utc>,
    supply_end: DateTime<Utc>,
    full_value: bool,
    fee: bool,
    fee_percent: Decimal,
    unipay: bool,
    unipay_percent: Decimal,
    mon_pay: bool,
    month_pay: Decimal,
}

impl From<ContractRow> for Contract {
    fn from(row: ContractRow) -> Self {
        Contract {
            id: row.id,
            negotiation_id: row.negotiation_id,
            value: row.value,
            supply_start: row.supply_start,
            supply_end: row.supply_end,
            full_value: row.full_value,
            fee: row.fee,
            fee_fraction: row.fee_percent,
            one_time_payment: row.unipay,
            one_time_fraction: row.unipay_percent,
            monthly_payment: row.mon_pay,
            monthly_amount: row.month_pay,
        }
    }
}
