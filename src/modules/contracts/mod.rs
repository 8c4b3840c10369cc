pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{
    CommissionBreakdown, CommissionSplit, CommissionSummary, Contract, InstallmentCommissionSummary,
};
pub use services::{CommissionReportService, ContractProrator, FeeStrategy};
