//! Transport layer: wire-format details (serialization/deserialization).

mod auth;
mod send_message;

pub use auth::decode_authentication_json_response;
pub use send_message::{encode_send_message_body, extract_fault_report, response_status_code};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}
