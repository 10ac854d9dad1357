//! Reporting utilities: number formatting and terminal report text.
//!
//! We keep formatting code in one place so:
//! - the aggregation/forecast code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;
