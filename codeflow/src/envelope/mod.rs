//! Response envelope decoding.
//!
//! - [`remote`]: the production target's transport-plus-business envelope
//! - [`admin`]: the admin backend's single `{code, message, data}` wrapper

pub mod admin;
pub mod remote;

pub use admin::decode_admin_response;
pub use remote::{
    decode_publish_response, unwrap_business, unwrap_transport, BusinessEnvelope,
    EnvelopeResult, PublishReceipt, TransportEnvelope,
};

/// Treats empty strings as absent.
pub(crate) fn non_blank(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}
