//! Publishing flows to the production target.
//!
//! This module provides:
//! - [`RemoteUploader`]: one authenticated upload, envelope decoding included
//! - [`LocalStateSync`]: best-effort local mirror of a confirmed publish
//! - [`PublishOrchestrator`]: sequential batches with per-flow outcomes
//! - [`fetch_full_flows`]: the selection step that loads code bodies

#[cfg(test)]
mod integration_tests;
mod observer;
mod orchestrator;
mod selection;
mod sync;
mod uploader;

pub use observer::{fetch_progress, publish_progress, NoOpObserver, PublishObserver};
pub use orchestrator::PublishOrchestrator;
pub use selection::fetch_full_flows;
pub use sync::LocalStateSync;
pub use uploader::{upload_request, RemoteUploader, ACCESS_SECRET_HEADER, NETWORK_FALLBACK};
