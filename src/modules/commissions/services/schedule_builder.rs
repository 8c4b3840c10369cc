use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core::dates::add_months;
use crate::core::Result;
use crate::modules::commissions::models::{PaymentMode, ScheduleParams};
use crate::modules::installments::models::Installment;

/// Expands a payment mode into its installment schedule
///
/// The output depends only on the mode and its parameters; ids and creation
/// timestamps are the only fields that differ between two builds.
pub struct ScheduleBuilder;

impl ScheduleBuilder {
    /// Build the pending installments for a calculation
    ///
    /// # Arguments
    /// * `calculation_id` - Owner of every generated installment
    /// * `mode` - Payment mode selected for the calculation
    /// * `params` - Parsed mode parameters; fields the mode does not use are ignored
    ///
    /// # Returns
    /// * `Result<Vec<Installment>>` - Installments in due order as generated,
    ///   or a validation error when the count exceeds `MAX_INSTALLMENTS`
    ///
    /// # Rules
    /// - `dividirInicialEmDuas`: initial and final payment, always two
    /// - `pagamentoInicialEParcelas`: first installment only when its value is
    ///   positive, then `installment_count` monthly installments
    /// - `parcelasIguais`: `installment_count` monthly installments
    pub fn build(
        calculation_id: &str,
        mode: PaymentMode,
        params: &ScheduleParams,
    ) -> Result<Vec<Installment>> {
        params.validate()?;

        match mode {
            PaymentMode::SplitInitialInTwo => Ok(vec![
                Installment::new(
                    calculation_id,
                    params.initial_payment_value,
                    params.initial_payment_date,
                ),
                Installment::new(
                    calculation_id,
                    params.final_payment_value,
                    params.final_payment_date,
                ),
            ]),
            PaymentMode::InitialPaymentAndInstallments => {
                let mut installments = Vec::new();

                if params.first_installment_value > Decimal::ZERO {
                    installments.push(Installment::new(
                        calculation_id,
                        params.first_installment_value,
                        params.first_installment_due_date,
                    ));
                }

                installments.extend(Self::monthly_series(
                    calculation_id,
                    params.monthly_installment_value,
                    params.installments_start_date,
                    params.installment_count,
                )?);

                Ok(installments)
            }
            PaymentMode::EqualInstallments => Self::monthly_series(
                calculation_id,
                params.monthly_installment_value,
                params.installments_start_date,
                params.installment_count,
            ),
        }
    }

    /// `count` installments of `value`, the i-th due `start + i` months
    fn monthly_series(
        calculation_id: &str,
        value: Decimal,
        start: DateTime<Utc>,
        count: u32,
    ) -> Result<Vec<Installment>> {
        (0..count)
            .map(|month| Ok(Installment::new(calculation_id, value, add_months(start, month)?)))
            .collect()
    }
}
