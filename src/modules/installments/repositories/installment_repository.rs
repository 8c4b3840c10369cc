// MySQL access for commission_installments
//
// Provides:
// - Batch insert of a generated schedule
// - Reads by id, by calculation and by consultant (due date ascending)
// - Full-row update and hard delete
// - SUM(value) over a calculation's live installments
// - Monthly energy / management commission grouped by installment status

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlConnection, QueryBuilder};

use crate::core::{AppError, Result};
use crate::modules::contracts::models::InstallmentCommissionTotals;
use crate::modules::installments::models::{Installment, InstallmentStatus};

const INSTALLMENT_COLUMNS: &str = r#"
    i.id, i.calculation_id, i.value, i.monthly_volume, i.attachment, i.invoice,
    i.due_date, i.status, i.payment_date, i.created_at, i.updated_at
"#;

/// Repository for installment rows
pub struct InstallmentRepository;

impl InstallmentRepository {
    /// Insert a batch of installments with a single statement
    ///
    /// # Arguments
    /// * `installments` - Installments to insert, possibly empty
    ///
    /// # Returns
    /// * `Result<()>` - Success or database error
    pub async fn insert_batch(conn: &mut MySqlConnection, installments: &[Installment]) -> Result<()> {
        if installments.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
            "INSERT INTO commission_installments (
                id, calculation_id, value, monthly_volume, attachment, invoice,
                due_date, status, payment_date, created_at, updated_at
            ) ",
        );

        builder.push_values(installments, |mut row, installment| {
            row.push_bind(&installment.id)
                .push_bind(&installment.calculation_id)
                .push_bind(installment.value)
                .push_bind(installment.monthly_volume)
                .push_bind(&installment.attachment)
                .push_bind(&installment.invoice)
                .push_bind(installment.due_date)
                .push_bind(installment.status.as_str())
                .push_bind(installment.payment_date)
                .push_bind(installment.created_at)
                .push_bind(installment.updated_at);
        });

        builder.build().execute(conn).await?;

        Ok(())
    }

    /// Find a live installment by id
    ///
    /// # Returns
    /// * `Result<Option<Installment>>` - None when missing or tombstoned
    pub async fn find_by_id(conn: &mut MySqlConnection, id: &str) -> Result<Option<Installment>> {
        let sql = format!(
            "SELECT {} FROM commission_installments i WHERE i.id = ? AND i.deleted_at IS NULL",
            INSTALLMENT_COLUMNS
        );

        let row = sqlx::query_as::<_, InstallmentRow>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Live installments of a calculation, ordered by due date
    pub async fn find_by_calculation(
        conn: &mut MySqlConnection,
        calculation_id: &str,
    ) -> Result<Vec<Installment>> {
        let sql = format!(
            r#"
            SELECT {} FROM commission_installments i
            WHERE i.calculation_id = ? AND i.deleted_at IS NULL
            ORDER BY i.due_date ASC
            "#,
            INSTALLMENT_COLUMNS
        );

        let rows = sqlx::query_as::<_, InstallmentRow>(&sql)
            .bind(calculation_id)
            .fetch_all(conn)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Live installments across a consultant's calculations, ordered by due date
    pub async fn find_by_consultant(conn: &mut MySqlConnection, consultant_id: i64) -> Result<Vec<Installment>> {
        let sql = format!(
            r#"
            SELECT {} FROM commission_installments i
            JOIN commission_calculations c ON c.id = i.calculation_id
            JOIN negotiations n ON n.id = c.negotiation_id
            WHERE n.consultant_id = ? AND i.deleted_at IS NULL AND c.deleted_at IS NULL
            ORDER BY i.due_date ASC
            "#,
            INSTALLMENT_COLUMNS
        );

        let rows = sqlx::query_as::<_, InstallmentRow>(&sql)
            .bind(consultant_id)
            .fetch_all(conn)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Calculation monthly energy and management values summed per status
    /// over live installments of a consultant's negotiations in `negotiation_status`
    pub async fn commission_totals_by_status(
        conn: &mut MySqlConnection,
        consultant_id: i64,
        negotiation_status: &str,
    ) -> Result<Vec<InstallmentCommissionTotals>> {
        let rows = sqlx::query_as::<_, StatusTotalsRow>(
            r#"
            SELECT
                i.status AS status,
                COALESCE(SUM(c.monthly_energy_value), 0) AS energy,
                COALESCE(SUM(c.monthly_management_value), 0) AS management
            FROM commission_installments i
            JOIN commission_calculations c ON c.id = i.calculation_id
            JOIN negotiations n ON n.id = c.negotiation_id
            WHERE n.consultant_id = ? AND n.status = ?
              AND i.deleted_at IS NULL AND c.deleted_at IS NULL
            GROUP BY i.status
            "#,
        )
        .bind(consultant_id)
        .bind(negotiation_status)
        .fetch_all(conn)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Persist every editable field of an installment
    pub async fn update(conn: &mut MySqlConnection, installment: &Installment) -> Result<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE commission_installments
            SET
                value = ?,
                monthly_volume = ?,
                attachment = ?,
                invoice = ?,
                due_date = ?,
                status = ?,
                payment_date = ?,
                updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(installment.value)
        .bind(installment.monthly_volume)
        .bind(&installment.attachment)
        .bind(&installment.invoice)
        .bind(installment.due_date)
        .bind(installment.status.as_str())
        .bind(installment.payment_date)
        .bind(installment.updated_at)
        .bind(&installment.id)
        .execute(conn)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Installment {}", installment.id)));
        }

        Ok(())
    }

    /// Physically delete an installment row
    pub async fn delete(conn: &mut MySqlConnection, id: &str) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM commission_installments WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Installment {}", id)));
        }

        Ok(())
    }

    /// Sum of values over a calculation's live installments
    pub async fn sum_values(conn: &mut MySqlConnection, calculation_id: &str) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(value), 0)
            FROM commission_installments
            WHERE calculation_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(calculation_id)
        .fetch_one(conn)
        .await?;

        Ok(total)
    }
}

/// Database row representation for commission_installments
#[derive(sqlx::FromRow)]
struct InstallmentRow {
    id: String,
    calculation_id: String,
    value: Decimal,
    monthly_volume: Option<Decimal>,
    attachment: Option<String>,
    invoice: Option<String>,
    due_date: DateTime<Utc>,
    status: String,
    payment_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InstallmentRow> for Installment {
    type Error = AppError;

    fn try_from(row: InstallmentRow) -> Result<Self> {
        let status: InstallmentStatus = row
            .status
            .parse()
            .map_err(|_| AppError::internal(format!("Invalid stored installment status: {}", row.status)))?;

        Ok(Installment {
            id: row.id,
            calculation_id: row.calculation_id,
            value: row.value,
            monthly_volume: row.monthly_volume,
            attachment: row.attachment,
            invoice: row.invoice,
            due_date: row.due_date,
            status,
            payment_date: row.payment_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatusTotalsRow {
    status: String,
    energy: Decimal,
    management: Decimal,
}

impl TryFrom<StatusTotalsRow> for InstallmentCommissionTotals {
    type Error = AppError;

    fn try_from(row: StatusTotalsRow) -> Result<Self> {
        let status: InstallmentStatus = row
            .status
            .parse()
            .map_err(|_| AppError::internal(format!("Invalid stored installment status: {}", row.status)))?;

        Ok(InstallmentCommissionTotals {
            status,
            energy: row.energy,
            management: row.management,
        })
    }
}
