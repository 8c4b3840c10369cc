pub mod commission_calculation;
pub mod payment_mode;

pub use commission_calculation::{
    CalculationStatusUpdate, CalculationTerms, CalculationUpdate, CalculationWithInstallments,
    CommissionCalculation, CreateCalculationRequest, DEFAULT_CALCULATION_STATUS,
};
pub use payment_mode::{PaymentMode, ScheduleParams, MAX_INSTALLMENTS};
