//! Observability utilities.
//!
//! Library code only emits `tracing` events; binaries install a subscriber
//! with [`init_tracing`].

mod logging;

pub use logging::{init_tracing, LogFormat, DEFAULT_FILTER};
