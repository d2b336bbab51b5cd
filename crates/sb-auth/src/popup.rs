//! Popup window launching
//!
//! The handshake never owns a browser window; it asks the host to open the
//! login page through this seam. The system implementation hands the URL to
//! the default browser. The viewport size is a hint; hosts without popup
//! control are free to ignore it.

use parking_lot::Mutex;
use sb_types::{AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Viewport hint for the login window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFeatures {
    /// Requested width in CSS pixels.
    pub width: u32,

    /// Requested height in CSS pixels.
    pub height: u32,
}

impl Default for WindowFeatures {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
        }
    }
}

/// Handle to an opened login window
///
/// Transient: the core does not observe closure or navigation of the
/// window beyond the open call.
#[derive(Debug, Clone)]
pub struct PopupHandle {
    /// Target name the window was opened under.
    pub target: String,
}

/// Trait for opening the login page in a new browsing context
pub trait PopupLauncher: Send + Sync {
    /// Open a new top-level browsing context at `url` under `target`.
    ///
    /// A blocked or failed open must surface as `AppError::PopupBlocked`
    /// rather than a handle to nothing.
    fn open(&self, url: &str, target: &str, features: &WindowFeatures) -> AppResult<PopupHandle>;
}

/// Launcher that opens the login page in the system default browser
///
/// For native hosts. The viewport hint cannot be honored here; the browser
/// decides window placement.
pub struct SystemBrowserLauncher;

impl PopupLauncher for SystemBrowserLauncher {
    fn open(&self, url: &str, target: &str, _features: &WindowFeatures) -> AppResult<PopupHandle> {
        info!("Opening login page in system browser: {}", url);
        open::that(url)
            .map_err(|e| AppError::PopupBlocked(format!("Failed to open browser: {}", e)))?;
        Ok(PopupHandle {
            target: target.to_string(),
        })
    }
}

/// Record of a window opened through [`MockLauncher`]
#[derive(Debug, Clone)]
pub struct OpenedWindow {
    /// URL the window was opened at.
    pub url: String,

    /// Target name the window was opened under.
    pub target: String,

    /// Viewport hint passed by the caller.
    pub features: WindowFeatures,
}

/// Mock launcher recording opens, with a switch to simulate blocked popups
#[derive(Clone, Default)]
pub struct MockLauncher {
    inner: Arc<Mutex<MockLauncherInner>>,
}

#[derive(Default)]
struct MockLauncherInner {
    opened: Vec<OpenedWindow>,
    blocked: bool,
}

impl MockLauncher {
    /// Create a mock launcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent opens fail like a browser popup blocker.
    pub fn block_popups(&self) {
        self.inner.lock().blocked = true;
    }

    /// Windows opened so far.
    pub fn opened(&self) -> Vec<OpenedWindow> {
        self.inner.lock().opened.clone()
    }
}

impl PopupLauncher for MockLauncher {
    fn open(&self, url: &str, target: &str, features: &WindowFeatures) -> AppResult<PopupHandle> {
        let mut inner = self.inner.lock();
        if inner.blocked {
            debug!("MockLauncher: refusing to open {} (popups blocked)", url);
            return Err(AppError::PopupBlocked("popups are blocked".to_string()));
        }

        inner.opened.push(OpenedWindow {
            url: url.to_string(),
            target: target.to_string(),
            features: *features,
        });
        Ok(PopupHandle {
            target: target.to_string(),
        })
    }
}
