pub mod installment_service;

pub use installment_service::{InstallmentService, TotalSynced};
