//! services/client/src/viewmodel/voice.rs
//!
//! Voice selection. The local preview plays right away; the "next" control is
//! only enabled once the backend has confirmed the choice.

use crate::viewmodel::state::{AppContext, InFlight, ScreenScope};
use std::sync::Arc;
use storybook_core::{CallSite, Session, SessionId, Voice};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// Another selection was still in flight.
    Ignored,
    Confirmed(Session),
    /// The backend call failed; the message is shown and the user may pick again.
    Failed(String),
    /// The screen was closed before the backend answered.
    Cancelled,
}

pub struct VoiceSelectViewModel {
    ctx: Arc<AppContext>,
    session_id: SessionId,
    scope: ScreenScope,
    in_flight: InFlight,
    next_enabled: watch::Sender<bool>,
    message: watch::Sender<Option<String>>,
}

impl VoiceSelectViewModel {
    pub fn new(ctx: Arc<AppContext>, session_id: SessionId) -> Self {
        Self {
            ctx,
            session_id,
            scope: ScreenScope::new(),
            in_flight: InFlight::new(),
            next_enabled: watch::channel(false).0,
            message: watch::channel(None).0,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    pub fn next_enabled(&self) -> watch::Receiver<bool> {
        self.next_enabled.subscribe()
    }

    pub fn message(&self) -> watch::Receiver<Option<String>> {
        self.message.subscribe()
    }

    pub fn is_next_enabled(&self) -> bool {
        *self.next_enabled.borrow()
    }

    pub async fn select(&self, voice: Voice) -> SelectOutcome {
        let Some(_guard) = self.in_flight.try_begin() else {
            return SelectOutcome::Ignored;
        };

        // Optimistic: the preview does not wait for the backend.
        self.ctx.preview.play(voice);
        if let Err(e) = self
            .ctx
            .write_settings(move |settings| settings.set_voice(voice))
            .await
        {
            warn!("Could not store voice preference: {}", e);
        }

        let selected = match self
            .scope
            .run(self.ctx.sessions.select_voice(&self.session_id, voice))
            .await
        {
            Ok(result) => result,
            Err(_) => return SelectOutcome::Cancelled,
        };

        match selected {
            Ok(session) => {
                info!(session_id = %self.session_id, voice = %voice, "Voice confirmed");
                self.message.send_replace(None);
                self.enable_next();
                SelectOutcome::Confirmed(session)
            }
            Err(e) if self.ctx.policy(CallSite::SelectVoice).continues_after_failure() => {
                warn!(session_id = %self.session_id, "Voice selection failed, continuing: {}", e);
                self.enable_next();
                SelectOutcome::Failed(e.to_string())
            }
            Err(e) => {
                warn!(session_id = %self.session_id, "Voice selection failed: {}", e);
                let message = e.to_string();
                self.message.send_replace(Some(message.clone()));
                SelectOutcome::Failed(message)
            }
        }
    }

    fn enable_next(&self) {
        self.next_enabled.send_if_modified(|enabled| {
            if *enabled {
                false
            } else {
                *enabled = true;
                true
            }
        });
    }
}
