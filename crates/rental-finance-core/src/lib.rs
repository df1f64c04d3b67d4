pub mod config;
pub mod dates;
pub mod entities;
pub mod error;
pub mod types;

#[cfg(feature = "tax")]
pub mod tax;

#[cfg(feature = "delinquency")]
pub mod delinquency;

#[cfg(feature = "apportionment")]
pub mod apportionment;

#[cfg(feature = "occupancy")]
pub mod occupancy;

#[cfg(feature = "cash_flow")]
pub mod cash_flow;

pub use config::EngineConfig;
pub use entities::*;
pub use error::RentalFinanceError;
pub use types::*;

/// Standard result type for all rental-finance operations
pub type RentalFinanceResult<T> = Result<T, RentalFinanceError>;
