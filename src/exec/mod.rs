//! Execution control
//!
//! Command description and the spawn/wait/kill primitive every check uses.

pub mod command;
pub mod runner;
