//! Core domain model types.
//!
//! - Flow records and request bodies for the admin backend
//! - Publish state derived from a record
//! - Per-flow outcomes and batch reports

mod flow;
mod outcome;
mod status;

pub use flow::{CreateFlow, Flow, FlowExecution, FlowParams, FlowStatus, UpdateFlow};
pub use outcome::{BatchPublishReport, PublishOutcome};
pub use status::PublishStatus;
