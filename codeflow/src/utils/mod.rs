//! Utility functions for timestamp handling.

pub mod timestamps;

pub use timestamps::{format_timestamp, now_utc, parse_timestamp, Timestamp, TimestampError};
