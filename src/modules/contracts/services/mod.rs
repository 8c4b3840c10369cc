pub mod commission_report_service;
pub mod proration;

pub use commission_report_service::CommissionReportService;
pub use proration::{ContractProrator, FeeStrategy};
