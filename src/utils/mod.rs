//! Utility functions for formatting and outbound links.

pub mod format;

pub use format::{dial_link, format_date, share_link, truncate};
