pub mod commission_service;
pub mod schedule_builder;

pub use commission_service::CommissionService;
pub use schedule_builder::ScheduleBuilder;
