pub mod vacancy;
pub mod yields;
