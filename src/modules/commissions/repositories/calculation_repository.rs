// MySQL access for commission_calculations
//
// Every function takes a connection so callers decide whether it runs on a
// pooled connection or inside an open transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlConnection;

use crate::core::{AppError, Result};
use crate::modules::commissions::models::{CommissionCalculation, PaymentMode};

const CALCULATION_COLUMNS: &str = r#"
    c.id, c.negotiation_id, c.status, c.receipt_modality, c.fee, c.volume,
    c.monthly_management_value, c.monthly_energy_value, c.has_management_commission,
    c.total_receivable, c.contract_start, c.contract_end, c.payment_mode,
    c.installment_count, c.generated_at, c.created_at, c.updated_at, c.deleted_at
"#;

/// Repository for commission calculation rows
pub struct CalculationRepository;

impl CalculationRepository {
    /// Insert a calculation row
    pub async fn insert(conn: &mut MySqlConnection, calculation: &CommissionCalculation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO commission_calculations (
                id, negotiation_id, status, receipt_modality, fee, volume,
                monthly_management_value, monthly_energy_value, has_management_commission,
                total_receivable, contract_start, contract_end, payment_mode,
                installment_count, generated_at, created_at, updated_at, deleted_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&calculation.id)
        .bind(calculation.negotiation_id)
        .bind(&calculation.status)
        .bind(&calculation.receipt_modality)
        .bind(calculation.fee)
        .bind(calculation.volume)
        .bind(calculation.monthly_management_value)
        .bind(calculation.monthly_energy_value)
        .bind(calculation.has_management_commission)
        .bind(calculation.total_receivable)
        .bind(calculation.contract_start)
        .bind(calculation.contract_end)
        .bind(calculation.payment_mode.as_str())
        .bind(calculation.installment_count)
        .bind(calculation.generated_at)
        .bind(calculation.created_at)
        .bind(calculation.updated_at)
        .bind(calculation.deleted_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Find a live calculation by id
    ///
    /// # Returns
    /// * `Result<Option<CommissionCalculation>>` - None when missing or tombstoned
    pub async fn find_by_id(conn: &mut MySqlConnection, id: &str) -> Result<Option<CommissionCalculation>> {
        let sql = format!(
            "SELECT {} FROM commission_calculations c WHERE c.id = ? AND c.deleted_at IS NULL",
            CALCULATION_COLUMNS
        );

        let row = sqlx::query_as::<_, CalculationRow>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List live calculations of a negotiation, optionally filtered by status
    pub async fn find_by_negotiation(
        conn: &mut MySqlConnection,
        negotiation_id: i64,
        status: Option<&str>,
    ) -> Result<Vec<CommissionCalculation>> {
        let sql = format!(
            r#"
            SELECT {} FROM commission_calculations c
            WHERE c.negotiation_id = ? AND c.deleted_at IS NULL
              AND (? IS NULL OR c.status = ?)
            ORDER BY c.created_at ASC
            "#,
            CALCULATION_COLUMNS
        );

        let rows = sqlx::query_as::<_, CalculationRow>(&sql)
            .bind(negotiation_id)
            .bind(status)
            .bind(status)
            .fetch_all(conn)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List live calculations across a consultant's negotiations
    pub async fn find_by_consultant(
        conn: &mut MySqlConnection,
        consultant_id: i64,
    ) -> Result<Vec<CommissionCalculation>> {
        let sql = format!(
            r#"
            SELECT {} FROM commission_calculations c
            JOIN negotiations n ON n.id = c.negotiation_id
            WHERE n.consultant_id = ? AND c.deleted_at IS NULL
            ORDER BY c.created_at ASC
            "#,
            CALCULATION_COLUMNS
        );

        let rows = sqlx::query_as::<_, CalculationRow>(&sql)
            .bind(consultant_id)
            .fetch_all(conn)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Persist every mutable field of a calculation
    pub async fn update(conn: &mut MySqlConnection, calculation: &CommissionCalculation) -> Result<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE commission_calculations
            SET
                status = ?,
                receipt_modality = ?,
                fee = ?,
                volume = ?,
                monthly_management_value = ?,
                monthly_energy_value = ?,
                has_management_commission = ?,
                total_receivable = ?,
                contract_start = ?,
                contract_end = ?,
                updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&calculation.status)
        .bind(&calculation.receipt_modality)
        .bind(calculation.fee)
        .bind(calculation.volume)
        .bind(calculation.monthly_management_value)
        .bind(calculation.monthly_energy_value)
        .bind(calculation.has_management_commission)
        .bind(calculation.total_receivable)
        .bind(calculation.contract_start)
        .bind(calculation.contract_end)
        .bind(calculation.updated_at)
        .bind(&calculation.id)
        .execute(conn)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Commission calculation {}", calculation.id)));
        }

        Ok(())
    }

    /// Overwrite the stored total
    pub async fn set_total(
        conn: &mut MySqlConnection,
        id: &str,
        total: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        // MySQL reports zero affected rows when the values are unchanged, so
        // absence is checked by the caller inside the same transaction
        sqlx::query(
            "UPDATE commission_calculations SET total_receivable = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(total)
        .bind(updated_at)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Tombstone a calculation and its installments
    pub async fn soft_delete(conn: &mut MySqlConnection, id: &str, deleted_at: DateTime<Utc>) -> Result<()> {
        let rows_affected = sqlx::query(
            "UPDATE commission_calculations SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(deleted_at)
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Commission calculation {}", id)));
        }

        sqlx::query(
            "UPDATE commission_installments SET deleted_at = ? WHERE calculation_id = ? AND deleted_at IS NULL",
        )
        .bind(deleted_at)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(())
    }
}

/// Database row representation for commission_calculations
#[derive(sqlx::FromRow)]
struct CalculationRow {
    id: String,
    negotiation_id: i64,
    status: String,
    receipt_modality: String,
    fee: Decimal,
    volume: Decimal,
    monthly_management_value: Decimal,
    monthly_energy_value: Decimal,
    has_management_commission: bool,
    total_receivable: Decimal,
    contract_start: DateTime<Utc>,
    contract_end: DateTime<Utc>,
    payment_mode: String,
    installment_count: u32,
    generated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<CalculationRow> for CommissionCalculation {
    type Error = AppError;

    fn try_from(row: CalculationRow) -> Result<Self> {
        let payment_mode: PaymentMode = row.payment_mode.parse().map_err(|_| {
            AppError::internal(format!("Invalid stored payment mode: {}", row.payment_mode))
        })?;

        Ok(CommissionCalculation {
            id: row.id,
            negotiation_id: row.negotiation_id,
            status: row.status,
            receipt_modality: row.receipt_modality,
            fee: row.fee,
            volume: row.volume,
            monthly_management_value: row.monthly_management_value,
            monthly_energy_value: row.monthly_energy_value,
            has_management_commission: row.has_management_commission,
            total_receivable: row.total_receivable,
            contract_start: row.contract_start,
            contract_end: row.contract_end,
            payment_mode,
            installment_count: row.installment_count,
            generated_at: row.generated_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}
