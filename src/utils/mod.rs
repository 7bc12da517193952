//! Utilities
//!
//! Output decoding and marker extraction.

pub mod markers;
pub mod output;
