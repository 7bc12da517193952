//! Verdict classification
//!
//! Derives pass/fail as a pure function of how a process ended and who wrote it.

pub mod verdict;
