//! Login flow manager - orchestrates popup login handshakes

use crate::config::LoginConfig;
use crate::listener::{CallbackListener, HandshakeOutcome, MessageOutcome};
use crate::message::{self, WindowMessage};
use crate::popup::{PopupLauncher, WindowFeatures};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use sb_model::WidgetModel;
use sb_types::{AppError, AppResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// How long terminal attempts are retained for polling (1 hour)
const ATTEMPT_RETENTION_HOURS: i64 = 1;

/// Identifier of one login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(Uuid);

impl AttemptId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Status of a login attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptStatus {
    /// Waiting for the callback message.
    Listening,

    /// Token accepted and committed.
    Committed,

    /// Terminated by a validation or persistence failure.
    Rejected {
        /// Why the attempt was rejected.
        message: String,
    },

    /// Cancelled explicitly or superseded by a newer attempt.
    Cancelled,
}

/// Result of starting a login attempt
#[derive(Debug)]
pub struct LoginStart {
    /// Attempt identifier, for polling and cancellation.
    pub attempt_id: AttemptId,

    /// The login page URL the window was opened at.
    pub login_url: String,

    /// Target name the window was opened under.
    pub window_target: String,

    /// Resolves once the attempt reaches a terminal state.
    pub done: oneshot::Receiver<HandshakeOutcome>,
}

/// State of one tracked attempt
struct AttemptState {
    /// Present exactly while the attempt is `Listening`.
    listener: Option<CallbackListener>,
    status: AttemptStatus,
    started_at: DateTime<Utc>,
}

/// Login flow manager
///
/// Orchestrates the popup login handshake: reads configuration from the
/// widget model, opens the login page in a detached window, installs the
/// callback listener, and routes inbound cross-window messages to it. At
/// most one attempt is listening at a time; starting a new attempt
/// supersedes the previous one.
pub struct LoginFlowManager {
    model: Arc<dyn WidgetModel>,
    launcher: Arc<dyn PopupLauncher>,
    attempts: RwLock<HashMap<AttemptId, AttemptState>>,
}

impl LoginFlowManager {
    /// Create a new login flow manager.
    pub fn new(model: Arc<dyn WidgetModel>, launcher: Arc<dyn PopupLauncher>) -> Self {
        Self {
            model,
            launcher,
            attempts: RwLock::new(HashMap::new()),
        }
    }

    /// Start a login attempt
    ///
    /// Validates configuration, opens the login page in a new browsing
    /// context with a per-attempt target name, and installs the callback
    /// listener. Returns immediately; completion arrives on
    /// [`LoginStart::done`] or via [`poll_status`](Self::poll_status).
    ///
    /// # Errors
    /// * `AppError::Config` - missing or invalid `login_url` /
    ///   `allowed_origins`, raised before any window opens
    /// * `AppError::PopupBlocked` - the window failed to open; no listener
    ///   is installed
    pub fn start_login(&self) -> AppResult<LoginStart> {
        // Fail fast on configuration before any window opens
        let config = LoginConfig::from_model(self.model.as_ref())?;

        let attempt_id = AttemptId::new();
        let window_target = format!("login-{}", attempt_id);

        info!(
            "Starting login attempt {} at {}",
            attempt_id, config.login_url
        );

        // A blocked popup surfaces here and leaves no listener behind
        self.launcher
            .open(&config.login_url, &window_target, &WindowFeatures::default())?;

        let (done_tx, done_rx) = oneshot::channel();
        let listener = CallbackListener::new(
            config.allowed_origins,
            Arc::clone(&self.model),
            done_tx,
        );

        let mut attempts = self.attempts.write();

        // At most one listener: supersede whatever is still listening
        for (id, attempt) in attempts.iter_mut() {
            if attempt.status == AttemptStatus::Listening {
                warn!("Superseding login attempt {}", id);
                if let Some(mut old) = attempt.listener.take() {
                    old.cancel("superseded by a newer login attempt");
                }
                attempt.status = AttemptStatus::Cancelled;
            }
        }

        attempts.insert(
            attempt_id,
            AttemptState {
                listener: Some(listener),
                status: AttemptStatus::Listening,
                started_at: Utc::now(),
            },
        );

        debug!("Login attempt {} is listening", attempt_id);

        Ok(LoginStart {
            attempt_id,
            login_url: config.login_url,
            window_target,
            done: done_rx,
        })
    }

    /// Deliver an inbound cross-window message
    ///
    /// Unrelated messages leave the listener installed. A handshake message
    /// terminates the listening attempt: on success the token is committed
    /// and `Ok(MessageOutcome::Committed)` is returned; on origin mismatch,
    /// malformed payload, or persistence failure the error propagates and
    /// the listener is uninstalled all the same.
    ///
    /// With no listening attempt, every message is dropped without side
    /// effects; handshake-tagged ones are logged at warn level.
    pub fn deliver(&self, msg: &WindowMessage) -> AppResult<MessageOutcome> {
        let mut attempts = self.attempts.write();

        let Some((id, attempt)) = attempts
            .iter_mut()
            .find(|(_, attempt)| attempt.status == AttemptStatus::Listening)
        else {
            if message::is_callback(&msg.data) {
                warn!(
                    "Dropping callback message from {} with no listening attempt",
                    msg.origin
                );
            } else {
                trace!("Dropping message from {} with no listening attempt", msg.origin);
            }
            return Ok(MessageOutcome::Ignored);
        };

        let Some(listener) = attempt.listener.as_mut() else {
            return Ok(MessageOutcome::Ignored);
        };

        match listener.handle_message(msg) {
            Ok(MessageOutcome::Ignored) => Ok(MessageOutcome::Ignored),
            Ok(MessageOutcome::Committed) => {
                debug!("Login attempt {} committed", id);
                attempt.status = AttemptStatus::Committed;
                attempt.listener = None;
                Ok(MessageOutcome::Committed)
            }
            Err(err) => {
                // Teardown happens on the failure path too
                attempt.status = AttemptStatus::Rejected {
                    message: err.to_string(),
                };
                attempt.listener = None;
                Err(err)
            }
        }
    }

    /// Poll attempt status.
    pub fn poll_status(&self, attempt_id: AttemptId) -> AppResult<AttemptStatus> {
        let attempts = self.attempts.read();
        let attempt = attempts
            .get(&attempt_id)
            .ok_or_else(|| AppError::Internal(format!("Attempt {} not found", attempt_id)))?;
        Ok(attempt.status.clone())
    }

    /// Cancel an attempt, disposing its listener.
    pub fn cancel_attempt(&self, attempt_id: AttemptId) -> AppResult<()> {
        let mut attempts = self.attempts.write();
        let attempt = attempts
            .get_mut(&attempt_id)
            .ok_or_else(|| AppError::Internal(format!("Attempt {} not found", attempt_id)))?;

        if attempt.status == AttemptStatus::Listening {
            info!("Cancelling login attempt {}", attempt_id);
            if let Some(mut listener) = attempt.listener.take() {
                listener.cancel("cancelled");
            }
            attempt.status = AttemptStatus::Cancelled;
        }

        Ok(())
    }

    /// Remove terminal attempts older than the retention window.
    pub fn cleanup_attempts(&self) {
        let cutoff = Utc::now() - Duration::hours(ATTEMPT_RETENTION_HOURS);
        let mut attempts = self.attempts.write();

        let before = attempts.len();
        attempts.retain(|_, attempt| {
            attempt.status == AttemptStatus::Listening || attempt.started_at > cutoff
        });

        let removed = before - attempts.len();
        if removed > 0 {
            debug!("Cleaned up {} old login attempts", removed);
        }
    }

    /// Number of attempts currently tracked.
    pub fn attempt_count(&self) -> usize {
        self.attempts.read().len()
    }
}
