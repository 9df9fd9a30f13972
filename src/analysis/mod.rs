//! Analysis history.
//!
//! Summaries and statistics derived from a session log.

pub mod history;

pub use history::*;
