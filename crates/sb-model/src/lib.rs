//! Widget model storage module
//!
//! Provides the host-owned key-value model contract the login handshake
//! reads configuration from and commits results to, plus in-memory and
//! file-backed implementations for tests and standalone hosting.

pub mod model_trait;

pub use model_trait::{FileModel, MemoryModel, WidgetModel};

/// Keys of the shared widget state.
pub mod keys {
    /// True once a token has been accepted for this widget.
    pub const CONNECTED: &str = "connected";

    /// Display label for the login control.
    pub const LABEL: &str = "label";

    /// Display alias of the connected org.
    pub const ALIAS: &str = "alias";

    /// Absolute URL of the external login page.
    pub const LOGIN_URL: &str = "login_url";

    /// Exact origins allowed to post the callback message.
    pub const ALLOWED_ORIGINS: &str = "allowed_origins";

    /// Most recently accepted token, opaque to the core.
    pub const TOKEN: &str = "token";
}
