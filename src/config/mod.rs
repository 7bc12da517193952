//! Configuration and shared types
//!
//! Tool locations, default budgets, and the error/result types every check uses.

pub mod config;
pub mod types;
