//! Shared components - configuration, errors and logging

pub mod config;
pub mod errors;
pub mod logging;
