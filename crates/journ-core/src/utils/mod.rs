//! Utility functions for date parsing and string formatting.

pub mod format;

pub use format::{format_date, parse_server_date, preview, truncate_string};
