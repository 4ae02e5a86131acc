//! Utility modules for common functionality.
//!
//! Logging setup and the terminal restore guard.

pub mod guard;
pub mod logger;
