//! Testing utilities for publish pipelines.
//!
//! This module provides:
//! - A scripted, recording HTTP transport
//! - An in-memory flow store
//! - Fixture records and response bodies

mod fixtures;
mod mocks;

pub use fixtures::{sample_flow, sample_target, upload_accepted, upload_rejected};
pub use mocks::{InMemoryFlowStore, MockTransport};
