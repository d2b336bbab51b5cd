//! Popup login handshake for host-embedded widgets
//!
//! Implements the browser-popup login flow for a widget bound to host-owned
//! state: a login trigger opens the external login page in a detached
//! window, and a callback listener waits for the cross-window message the
//! login page posts back, validates its origin against an allow-list, and
//! commits the token into the widget model exactly once.
//!
//! # Features
//! - Fail-fast configuration validation before any window opens
//! - Exact, case-sensitive origin allow-list checks
//! - Tagged callback message type (`"mosf-callback"` discriminator)
//! - Listener teardown on both the success and failure paths
//! - Completion signal over a oneshot channel plus pollable attempt status
//!
//! # Usage Example
//! ```no_run
//! use std::sync::Arc;
//! use sb_auth::{LoginFlowManager, SystemBrowserLauncher, WindowMessage};
//! use sb_model::{keys, MemoryModel};
//!
//! # fn main() -> sb_types::AppResult<()> {
//! let model = Arc::new(
//!     MemoryModel::new()
//!         .with_value(keys::LOGIN_URL, "https://idp.example/auth".into())
//!         .with_value(keys::ALLOWED_ORIGINS, serde_json::json!(["https://cb.example"])),
//! );
//! let manager = LoginFlowManager::new(model, Arc::new(SystemBrowserLauncher));
//!
//! let start = manager.start_login()?;
//! // The host forwards every inbound cross-window message:
//! //     manager.deliver(&WindowMessage::new(origin, payload))?;
//! // and observes completion on `start.done` or via poll_status().
//! # Ok(())
//! # }
//! ```

mod config;
mod flow_manager;
mod listener;
mod message;
mod origin;
mod popup;
mod state;

pub use config::LoginConfig;
pub use flow_manager::{AttemptId, AttemptStatus, LoginFlowManager, LoginStart};
pub use listener::{HandshakeOutcome, MessageOutcome};
pub use message::{CallbackMessage, WindowMessage, CALLBACK_MESSAGE_TYPE};
pub use origin::{Origin, OriginAllowList};
pub use popup::{
    MockLauncher, OpenedWindow, PopupHandle, PopupLauncher, SystemBrowserLauncher, WindowFeatures,
};
pub use state::commit_token;
