pub mod dates;
pub mod error;

pub use dates::DateParsing;
pub use error::{AppError, Result};
