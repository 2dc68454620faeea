//! Typed Rust client for the SMSPortal REST API.
//!
//! The design is layered: a domain layer of strong types, a transport layer
//! for wire-format details, and a small client layer that resolves a bearer
//! token in order (memory, then an optional external store, then a live
//! authentication call) and dispatches authenticated requests.
//!
//! ```rust,no_run
//! use smsportal::{ClientId, ClientSecret, Destination, MessageText, SendMessage, SmsPortalClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smsportal::SmsPortalError> {
//!     let client = SmsPortalClient::new(ClientId::new("...")?, ClientSecret::new("...")?)?;
//!     let request = SendMessage::single(
//!         Destination::new("+27000000000")?,
//!         MessageText::new("hello")?,
//!     );
//!     let _resp = client.send_message(request).await?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, MemoryTokenStore, SmsPortalClient,
    SmsPortalClientBuilder, SmsPortalError, TOKEN_STORE_KEY, TokenStore,
};
pub use domain::{
    ApiToken, ClientId, ClientSecret, Destination, Message, MessageText, PhoneNumber, SendMessage,
    SendOptions, SenderId, UnixTimestamp, ValidationError,
};
