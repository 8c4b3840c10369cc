//! Commission Ledger
//!
//! Commission calculations for energy-sales negotiations, their installment
//! schedules, and time-based proration of contract commission.

pub mod app;
pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;
pub mod storage;

// Re-export commonly used types
pub use modules::commissions;
pub use modules::contracts;
pub use modules::installments;
