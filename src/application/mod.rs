//! Application layer - monitor loop, reports and CLI commands

pub mod commands;
pub mod pool_monitor;
pub mod report;

pub use commands::{Cli, CommandExecutor, Commands};
pub use pool_monitor::{MonitorStats, PoolMonitor, PoolMonitorConfig, TickOutcome, TickSummary};
pub use report::SignalReport;
