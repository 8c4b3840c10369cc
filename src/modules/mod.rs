pub mod commissions;
pub mod contracts;
pub mod health;
pub mod installments;
