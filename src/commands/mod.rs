//! Command implementations
//!
//! The binary has a single command; its steps live in `backup`.

pub mod backup;

pub use backup::{run, run_with};
