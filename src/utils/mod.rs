//! Utility functions

pub mod decimal;
pub mod fs;

pub use decimal::{DecimalParseError, format_decimal, parse_decimal};
pub use fs::{is_hidden, list_visible_entries};
