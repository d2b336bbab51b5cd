//! Cross-window callback message type and filtering
//!
//! The discriminator distinguishes the handshake message from unrelated
//! cross-window traffic (analytics beacons, extensions) that may also
//! target the host window. Anything without it is expected noise;
//! anything with it is held to the full validation path.

use sb_types::{AppError, AppResult};
use serde::Deserialize;
use serde_json::Value;

/// Discriminator value carried by the callback message's `type` field.
pub const CALLBACK_MESSAGE_TYPE: &str = "mosf-callback";

/// An inbound cross-window message, as delivered by the host
#[derive(Debug, Clone)]
pub struct WindowMessage {
    /// Origin (scheme + host + port) of the sending window.
    pub origin: String,

    /// Raw message payload.
    pub data: Value,
}

impl WindowMessage {
    /// Wrap an inbound message.
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }
}

/// The message the login page posts back once authentication completes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum CallbackMessage {
    /// Token delivery: `{ "type": "mosf-callback", "token": "<opaque>" }`.
    #[serde(rename = "mosf-callback")]
    Callback {
        /// Opaque token, handed to the widget model as-is.
        token: String,
    },
}

/// True when the payload carries the handshake discriminator.
pub fn is_callback(data: &Value) -> bool {
    data.get("type").and_then(Value::as_str) == Some(CALLBACK_MESSAGE_TYPE)
}

/// Parse a payload that carries the discriminator.
///
/// A payload that matched [`is_callback`] but does not deserialize (a
/// missing or non-string token) is malformed, not noise.
pub fn parse(data: &Value) -> AppResult<CallbackMessage> {
    serde_json::from_value(data.clone()).map_err(|e| AppError::MalformedCallback(e.to_string()))
}
