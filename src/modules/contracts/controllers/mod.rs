pub mod commission_report_controller;

pub use commission_report_controller::configure;
