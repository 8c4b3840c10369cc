pub mod calculation_repository;

pub use calculation_repository::CalculationRepository;
