//! Utility functions and helpers.

pub mod sanitize;

// Re-export commonly used types
pub use sanitize::{sanitize_driver, sanitize_entry, sanitize_field};
