pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{CommissionCalculation, PaymentMode};
pub use services::{CommissionService, ScheduleBuilder};
