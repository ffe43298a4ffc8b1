//! Utility functions for date formatting and string manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_date, query_date, truncate_string};
