pub mod commission_controller;

pub use commission_controller::configure;
