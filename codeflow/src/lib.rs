//! # Codeflow
//!
//! Publish pipeline for code flows managed by the admin tool.
//!
//! A flow is pushed to the production target with one authenticated upload.
//! The target answers with a two-layer envelope, and a confirmed publish is
//! mirrored into the local record on a best-effort basis. Batches run
//! strictly in sequence and always report every flow:
//!
//! - **Configuration**: the target and the build-mode gate, resolved once
//! - **Uploads**: envelope decoding with failures folded into outcomes
//! - **Local sync**: mark-published patches that never fail the publish
//! - **Batches**: ordered, no early abort, aggregate report
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use codeflow::prelude::*;
//! use std::sync::Arc;
//!
//! let resolver = ConfigResolver::from_source(&ProcessEnv::with_dotenv());
//! let transport = Arc::new(ReqwestTransport::new(resolver.http())?);
//! let admin = Arc::new(AdminClient::new(transport.clone(), resolver.admin().clone()));
//! let uploader = RemoteUploader::new(transport, LocalStateSync::new(admin.clone()));
//!
//! let orchestrator = PublishOrchestrator::from_config(&resolver, uploader)?;
//! let report = orchestrator.publish_selected(admin.as_ref(), &keys).await?;
//! println!("{}", report.summary());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod admin;
pub mod config;
pub mod core;
pub mod envelope;
pub mod errors;
pub mod observability;
pub mod publish;
pub mod testing;
pub mod transport;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::admin::{AdminClient, FlowStore};
    pub use crate::config::{
        AdminSettings, BuildMode, ConfigResolver, DeploymentTarget, EnvSource, HttpSettings,
        MapEnv, ProcessEnv,
    };
    pub use crate::core::{
        BatchPublishReport, CreateFlow, Flow, FlowStatus, PublishOutcome, PublishStatus,
        UpdateFlow,
    };
    pub use crate::errors::CodeflowError;
    pub use crate::publish::{
        LocalStateSync, NoOpObserver, PublishObserver, PublishOrchestrator, RemoteUploader,
    };
    #[cfg(feature = "http")]
    pub use crate::transport::ReqwestTransport;
    pub use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
}
