//! Domain layer - pool records, new-pool tracking and signal evaluation

pub mod pool;
pub mod signal;
