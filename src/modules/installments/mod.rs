pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Installment, InstallmentStatus, InstallmentUpdate, NewInstallment};
pub use repositories::InstallmentRepository;
pub use services::{InstallmentService, TotalSynced};
