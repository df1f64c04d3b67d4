//! Progressive income tax on rental receipts.

pub mod liability;
