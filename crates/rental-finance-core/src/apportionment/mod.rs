//! Shared expense splitting across units.

pub mod split;
