//! Infrastructure layer - registry transport and retry handling

pub mod raydium;
pub mod retry;
