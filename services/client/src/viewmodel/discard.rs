//! services/client/src/viewmodel/discard.rs
//!
//! Cancel-with-confirmation dialog, reachable from any mid-session screen.
//! The screen closes whether or not the discard call succeeds.

use crate::error::ClientError;
use crate::viewmodel::state::{AppContext, InFlight, ScreenScope};
use std::sync::Arc;
use storybook_core::{CallSite, SessionId};
use tokio::sync::watch;
use tracing::{info, warn};

pub const DISCARD_SUCCESS_MESSAGE: &str = "The session was discarded.";
pub const DISCARD_FAILURE_MESSAGE: &str = "The session could not be discarded.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardOutcome {
    pub discarded: bool,
    pub message: String,
}

pub struct DiscardDialog {
    ctx: Arc<AppContext>,
    session_id: SessionId,
    scope: ScreenScope,
    in_flight: InFlight,
    closed: watch::Sender<bool>,
}

impl DiscardDialog {
    pub fn new(ctx: Arc<AppContext>, session_id: SessionId) -> Self {
        Self {
            ctx,
            session_id,
            scope: ScreenScope::new(),
            in_flight: InFlight::new(),
            closed: watch::channel(false).0,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    pub fn closed(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Returns `None` when a confirmation is already in flight.
    pub async fn confirm(&self) -> Result<Option<DiscardOutcome>, ClientError> {
        let Some(_guard) = self.in_flight.try_begin() else {
            return Ok(None);
        };

        let outcome = match self
            .scope
            .run(self.ctx.sessions.discard(&self.session_id))
            .await?
        {
            Ok(()) => {
                info!(session_id = %self.session_id, "Session discarded by user");
                DiscardOutcome {
                    discarded: true,
                    message: DISCARD_SUCCESS_MESSAGE.to_string(),
                }
            }
            Err(e) => {
                warn!(session_id = %self.session_id, "Discard failed: {}", e);
                DiscardOutcome {
                    discarded: false,
                    message: DISCARD_FAILURE_MESSAGE.to_string(),
                }
            }
        };

        // A failed discard still closes the screen unless its policy blocks on failure.
        if outcome.discarded || self.ctx.policy(CallSite::ConfirmDiscard).continues_after_failure() {
            self.closed.send_replace(true);
        }
        Ok(Some(outcome))
    }
}
