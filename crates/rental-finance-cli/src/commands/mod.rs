pub mod billing;
pub mod portfolio;
pub mod tax;
