//! services/client/src/viewmodel/decide_save.rs
//!
//! The keep-or-discard choice after a session has been ended.

use crate::viewmodel::state::{AppContext, InFlight, ScreenScope};
use std::sync::Arc;
use storybook_core::{CallSite, SessionId};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    Save,
    Discard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecideOutcome {
    Ignored,
    Saved,
    Discarded,
    /// The discard failed; the choice is back to unselected.
    Failed(String),
    /// The screen was closed before the discard finished.
    Cancelled,
}

pub struct DecideSaveViewModel {
    ctx: Arc<AppContext>,
    session_id: SessionId,
    scope: ScreenScope,
    in_flight: InFlight,
    choice: watch::Sender<Option<SaveChoice>>,
    message: watch::Sender<Option<String>>,
}

impl DecideSaveViewModel {
    pub fn new(ctx: Arc<AppContext>, session_id: SessionId) -> Self {
        Self {
            ctx,
            session_id,
            scope: ScreenScope::new(),
            in_flight: InFlight::new(),
            choice: watch::channel(None).0,
            message: watch::channel(None).0,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    pub fn choice(&self) -> watch::Receiver<Option<SaveChoice>> {
        self.choice.subscribe()
    }

    pub fn message(&self) -> watch::Receiver<Option<String>> {
        self.message.subscribe()
    }

    pub async fn decide(&self, choice: SaveChoice) -> DecideOutcome {
        let Some(_guard) = self.in_flight.try_begin() else {
            return DecideOutcome::Ignored;
        };
        self.choice.send_replace(Some(choice));
        self.message.send_replace(None);

        match choice {
            // The session was already ended on the finish screen.
            SaveChoice::Save => {
                info!(session_id = %self.session_id, "Session kept");
                DecideOutcome::Saved
            }
            SaveChoice::Discard => {
                let discarded = match self
                    .scope
                    .run(self.ctx.sessions.discard(&self.session_id))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => {
                        self.choice.send_replace(None);
                        return DecideOutcome::Cancelled;
                    }
                };
                match discarded {
                    Ok(()) => DecideOutcome::Discarded,
                    Err(e) => {
                        warn!(session_id = %self.session_id, "Discard failed: {}", e);
                        let message = e.to_string();
                        if !self.ctx.policy(CallSite::DecideDiscard).continues_after_failure() {
                            self.choice.send_replace(None);
                        }
                        self.message.send_replace(Some(message.clone()));
                        DecideOutcome::Failed(message)
                    }
                }
            }
        }
    }
}
