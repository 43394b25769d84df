//! The admin tool's own backend.

mod client;
mod store;

pub use client::AdminClient;
#[cfg(test)]
pub use store::MockFlowStore;
pub use store::FlowStore;
