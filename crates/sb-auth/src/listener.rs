//! Callback listener state machine
//!
//! One listener exists per login attempt. It filters inbound cross-window
//! messages by discriminator, validates the sender origin, and commits the
//! token exactly once. Every terminal transition leaves the listener dead,
//! including the rejection paths.

use crate::message::{self, CallbackMessage, WindowMessage};
use crate::origin::OriginAllowList;
use crate::state;
use sb_model::WidgetModel;
use sb_types::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info, trace};

/// Terminal result of one login attempt, delivered on the completion channel
#[derive(Debug, Clone, PartialEq)]
pub enum HandshakeOutcome {
    /// Token accepted and committed.
    Committed {
        /// The committed token.
        token: String,
    },

    /// Attempt terminated by a validation or persistence failure.
    Rejected {
        /// Why the attempt was rejected.
        message: String,
    },

    /// Attempt cancelled explicitly or superseded by a newer one.
    Cancelled {
        /// Why the attempt was cancelled.
        message: String,
    },
}

/// What delivering a message did to the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Unrelated traffic; the listener is still installed.
    Ignored,

    /// Handshake complete; the listener is gone.
    Committed,
}

/// Listener installed for the duration of one login attempt
pub(crate) struct CallbackListener {
    allowed_origins: OriginAllowList,
    model: Arc<dyn WidgetModel>,
    done_tx: Option<oneshot::Sender<HandshakeOutcome>>,
}

impl CallbackListener {
    pub(crate) fn new(
        allowed_origins: OriginAllowList,
        model: Arc<dyn WidgetModel>,
        done_tx: oneshot::Sender<HandshakeOutcome>,
    ) -> Self {
        Self {
            allowed_origins,
            model,
            done_tx: Some(done_tx),
        }
    }

    /// Handle one inbound message.
    ///
    /// `Ok(Ignored)` means the message was unrelated noise and the listener
    /// stays installed. `Ok(Committed)` and every `Err` are terminal: the
    /// caller must uninstall the listener.
    pub(crate) fn handle_message(&mut self, msg: &WindowMessage) -> AppResult<MessageOutcome> {
        if !message::is_callback(&msg.data) {
            trace!("Ignoring unrelated cross-window message from {}", msg.origin);
            return Ok(MessageOutcome::Ignored);
        }

        if !self.allowed_origins.is_allowed(&msg.origin) {
            let err = AppError::OriginNotAllowed(msg.origin.clone());
            error!("Rejected callback message: {}", err);
            self.finish(HandshakeOutcome::Rejected {
                message: err.to_string(),
            });
            return Err(err);
        }

        let CallbackMessage::Callback { token } = match message::parse(&msg.data) {
            Ok(parsed) => parsed,
            Err(err) => {
                error!("Malformed callback message from {}: {}", msg.origin, err);
                self.finish(HandshakeOutcome::Rejected {
                    message: err.to_string(),
                });
                return Err(err);
            }
        };

        if let Err(err) = state::commit_token(self.model.as_ref(), &token) {
            error!("Failed to persist accepted token: {}", err);
            self.finish(HandshakeOutcome::Rejected {
                message: err.to_string(),
            });
            return Err(err);
        }

        info!("Login handshake complete, token accepted from {}", msg.origin);
        self.finish(HandshakeOutcome::Committed { token });
        Ok(MessageOutcome::Committed)
    }

    /// Terminate without a token, signaling `reason` to the completion
    /// channel.
    pub(crate) fn cancel(&mut self, reason: &str) {
        self.finish(HandshakeOutcome::Cancelled {
            message: reason.to_string(),
        });
    }

    fn finish(&mut self, outcome: HandshakeOutcome) {
        // The receiver may already be dropped; that is the host's choice.
        if let Some(tx) = self.done_tx.take() {
            let _ = tx.send(outcome);
        }
    }
}
